use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::ComprobanteError;

pub type XmlResult = Result<String, ComprobanteError>;

fn xml_io(e: std::io::Error) -> ComprobanteError {
    ComprobanteError::Xml(format!("write error: {e}"))
}

/// Indented UBL writer that keeps track of the open elements, so a
/// mismatched or missing end tag is an error instead of broken output.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
    open: Vec<String>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, ComprobanteError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self {
            writer,
            open: Vec::new(),
        })
    }

    /// Finish the document. Fails if any element is still open.
    pub fn into_string(self) -> XmlResult {
        if let Some(name) = self.open.last() {
            return Err(ComprobanteError::Xml(format!("element <{name}> never closed")));
        }
        String::from_utf8(self.writer.into_inner().into_inner())
            .map_err(|e| ComprobanteError::Xml(format!("UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, ComprobanteError> {
        self.start_element_with_attrs(name, &[])
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, ComprobanteError> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(elem)).map_err(xml_io)?;
        self.open.push(name.to_string());
        Ok(self)
    }

    /// Close `name`, which must be the innermost open element.
    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, ComprobanteError> {
        match self.open.pop() {
            Some(open) if open == name => {}
            Some(open) => {
                return Err(ComprobanteError::Xml(format!(
                    "cannot close <{name}> while <{open}> is open"
                )));
            }
            None => {
                return Err(ComprobanteError::Xml(format!(
                    "cannot close <{name}>: no element is open"
                )));
            }
        }
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, ComprobanteError> {
        self.text_element_with_attrs(name, text, &[])
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, ComprobanteError> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Monetary amount with `currencyID`, always two decimals.
    pub fn amount_element(
        &mut self,
        name: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<&mut Self, ComprobanteError> {
        self.text_element_with_attrs(name, &format_amount(amount), &[("currencyID", currency)])
    }

    /// Quantity with `unitCode` and the catalog 03 list attributes.
    pub fn quantity_element(
        &mut self,
        name: &str,
        qty: Decimal,
        unit: &str,
    ) -> Result<&mut Self, ComprobanteError> {
        self.text_element_with_attrs(
            name,
            &format_decimal(qty),
            &[
                ("unitCode", unit),
                ("unitCodeListID", "UN/ECE rec 20"),
                ("unitCodeListAgencyName", "United Nations Economic Commission for Europe"),
            ],
        )
    }
}

/// Amounts are printed with exactly two decimals.
pub fn format_amount(d: Decimal) -> String {
    format!("{:.2}", crate::core::round_half_up(d))
}

/// Format a Decimal for XML output: at least 2 decimal places, trailing
/// zeros beyond that stripped.
pub fn format_decimal(d: Decimal) -> String {
    let s = d.normalize().to_string();
    if let Some(dot_pos) = s.find('.') {
        let decimals = s.len() - dot_pos - 1;
        if decimals < 2 {
            format!("{s}{}", "0".repeat(2 - decimals))
        } else {
            s
        }
    } else {
        format!("{s}.00")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn format_decimal_cases() {
        assert_eq!(format_decimal(dec!(100)), "100.00");
        assert_eq!(format_decimal(dec!(1500.0)), "1500.00");
        assert_eq!(format_decimal(dec!(2.5)), "2.50");
        assert_eq!(format_decimal(dec!(0.125)), "0.125");
    }

    #[test]
    fn mismatched_close_is_an_error() {
        let mut w = XmlWriter::new().unwrap();
        w.start_element("cac:Party").unwrap();
        w.start_element("cac:PartyName").unwrap();
        assert!(matches!(
            w.end_element("cac:Party"),
            Err(ComprobanteError::Xml(_))
        ));
    }

    #[test]
    fn unclosed_element_is_an_error() {
        let mut w = XmlWriter::new().unwrap();
        w.start_element("Invoice").unwrap();
        w.text_element("cbc:ID", "F001-00000001").unwrap();
        assert!(w.into_string().is_err());
    }

    #[test]
    fn escapes_text_and_attributes() {
        let mut w = XmlWriter::new().unwrap();
        w.text_element_with_attrs("cbc:Name", "A & B <S.A.C.>", &[("languageID", "es\"")])
            .unwrap();
        let out = w.into_string().unwrap();
        assert!(out.contains("A &amp; B &lt;S.A.C.&gt;"));
        assert!(out.contains("languageID=\"es&quot;\""));
    }

    #[test]
    fn format_amount_cases() {
        assert_eq!(format_amount(dec!(118)), "118.00");
        assert_eq!(format_amount(dec!(160.0)), "160.00");
        assert_eq!(format_amount(dec!(0.045)), "0.05");
    }
}
