use super::error::ComprobanteError;

/// Width of the correlative part of a document number.
pub const DOCUMENT_NUMBER_WIDTH: usize = 8;

/// Largest correlative a series can reach (eight digits).
pub const MAX_DOCUMENT_NUMBER: u64 = 99_999_999;

/// Format a series/number pair as printed on the document, e.g. "F001-00000042".
pub fn format_document_number(series: &str, number: u64) -> String {
    format!("{series}-{number:0>width$}", width = DOCUMENT_NUMBER_WIDTH)
}

/// Gapless correlative sequence for one series.
///
/// Every series (F001, E001, ...) numbers its documents from 1 without gaps.
/// This struct tracks the next correlative and refuses to run past eight
/// digits.
#[derive(Debug, Clone)]
pub struct SeriesSequence {
    series: String,
    next_number: u64,
}

impl SeriesSequence {
    /// Create a new sequence starting at 1.
    pub fn new(series: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            next_number: 1,
        }
    }

    /// Create a sequence continuing from a given number.
    pub fn starting_at(series: impl Into<String>, next_number: u64) -> Self {
        Self {
            series: series.into(),
            next_number,
        }
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    /// Consume and return the next correlative.
    pub fn next_number(&mut self) -> Result<u64, ComprobanteError> {
        let num = self.next_number;
        if num == 0 || num > MAX_DOCUMENT_NUMBER {
            return Err(ComprobanteError::Numbering(format!(
                "series {} cannot issue correlative {num} (valid range 1..={MAX_DOCUMENT_NUMBER})",
                self.series
            )));
        }
        self.next_number += 1;
        Ok(num)
    }

    /// Preview the next formatted number without consuming it.
    pub fn peek(&self) -> String {
        format_document_number(&self.series, self.next_number)
    }

    /// Get the next correlative that will be issued (without formatting).
    pub fn next_raw(&self) -> u64 {
        self.next_number
    }
}
