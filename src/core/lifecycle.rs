//! Document lifecycle: the legal status transitions.
//!
//! ```text
//! CREATED --generate_xml--> XML_GENERATED --sign--> SIGNED --send--> SENT
//! SENT --accept--> ACCEPTED          SENT --reject--> REJECTED
//! any non-terminal --annul--> ANULADA
//! ```
//!
//! The table is the same on both sides of the wire: the pipeline uses it to
//! refuse an action before calling the service, and the in-memory service
//! uses it to refuse a call whose status moved underneath the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{ComprobanteError, Result};
use super::types::DocumentStatus;

/// Every status-changing event a document can undergo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    GenerateXml,
    Sign,
    Send,
    /// Tax authority accepted the document.
    Accept,
    /// Tax authority rejected the document.
    Reject,
    Annul,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GenerateXml => "generate XML for",
            Self::Sign => "sign",
            Self::Send => "send",
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Annul => "annul",
        })
    }
}

impl DocumentStatus {
    /// Status after `transition`, or `IllegalTransition` if the current
    /// status does not allow it.
    pub fn apply(self, transition: Transition) -> Result<DocumentStatus> {
        use DocumentStatus::*;
        use Transition::*;

        match (self, transition) {
            (Created, GenerateXml) => Ok(XmlGenerated),
            (XmlGenerated, Sign) => Ok(Signed),
            (Signed, Send) => Ok(Sent),
            (Sent, Accept) => Ok(Accepted),
            (Sent, Reject) => Ok(Rejected),
            (status, Annul) if !status.is_terminal() => Ok(Annulled),
            (status, action) => Err(ComprobanteError::IllegalTransition { action, status }),
        }
    }

    pub fn permits(self, transition: Transition) -> bool {
        self.apply(transition).is_ok()
    }
}

/// The three operator-triggered pipeline actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    GenerateXml,
    Sign,
    Send,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [Self::GenerateXml, Self::Sign, Self::Send];

    pub fn transition(&self) -> Transition {
        match self {
            Self::GenerateXml => Transition::GenerateXml,
            Self::Sign => Transition::Sign,
            Self::Send => Transition::Send,
        }
    }

    /// The only status this action may start from.
    pub fn required_status(&self) -> DocumentStatus {
        match self {
            Self::GenerateXml => DocumentStatus::Created,
            Self::Sign => DocumentStatus::XmlGenerated,
            Self::Send => DocumentStatus::Signed,
        }
    }

    /// Status a successful action leads to.
    pub fn target_status(&self) -> DocumentStatus {
        match self {
            Self::GenerateXml => DocumentStatus::XmlGenerated,
            Self::Sign => DocumentStatus::Signed,
            Self::Send => DocumentStatus::Sent,
        }
    }

    /// Stable machine name, used in logs and audit records.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GenerateXml => "generate_xml",
            Self::Sign => "sign",
            Self::Send => "send",
        }
    }

    /// Operator-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::GenerateXml => "Generar XML",
            Self::Sign => "Firmar",
            Self::Send => "Enviar a SUNAT",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DocumentStatus::*;

    const ALL_STATUSES: [DocumentStatus; 7] =
        [Created, XmlGenerated, Signed, Sent, Accepted, Rejected, Annulled];

    #[test]
    fn forward_chain() {
        let status = Created
            .apply(Transition::GenerateXml)
            .and_then(|s| s.apply(Transition::Sign))
            .and_then(|s| s.apply(Transition::Send))
            .unwrap();
        assert_eq!(status, Sent);
        assert_eq!(status.apply(Transition::Accept).unwrap(), Accepted);
        assert_eq!(status.apply(Transition::Reject).unwrap(), Rejected);
    }

    #[test]
    fn sent_cannot_be_signed() {
        let err = Sent.apply(Transition::Sign).unwrap_err();
        assert!(matches!(
            err,
            ComprobanteError::IllegalTransition {
                action: Transition::Sign,
                status: Sent
            }
        ));
        assert_eq!(err.to_string(), "cannot sign a document in status SENT");
    }

    #[test]
    fn terminal_states_are_final() {
        for status in [Accepted, Rejected, Annulled] {
            for t in [
                Transition::GenerateXml,
                Transition::Sign,
                Transition::Send,
                Transition::Accept,
                Transition::Reject,
                Transition::Annul,
            ] {
                assert!(!status.permits(t), "{status} must not permit {t:?}");
            }
        }
    }

    #[test]
    fn annul_from_any_open_state() {
        for status in [Created, XmlGenerated, Signed, Sent] {
            assert_eq!(status.apply(Transition::Annul).unwrap(), Annulled);
        }
    }

    #[test]
    fn each_action_has_exactly_one_source() {
        for action in ActionKind::ALL {
            let sources: Vec<_> = ALL_STATUSES
                .iter()
                .filter(|s| s.permits(action.transition()))
                .collect();
            assert_eq!(sources, vec![&action.required_status()]);
            assert_eq!(
                action.required_status().apply(action.transition()).unwrap(),
                action.target_status()
            );
        }
    }

    #[test]
    fn authority_verdict_only_after_send() {
        for status in [Created, XmlGenerated, Signed] {
            assert!(!status.permits(Transition::Accept));
            assert!(!status.permits(Transition::Reject));
        }
    }
}
