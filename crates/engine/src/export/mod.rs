//! Report exports of the visible statement.
//!
//! Exporters take the rows exactly as the filter shows them at call time and
//! never look at the unfiltered store.

use crate::{Currency, Filter, ResultEngine, TransactionRecord};

mod csv;
mod pdf;

pub use pdf::{ReportLayout, ReportRow};

/// Fixed locale display form for dates in every export.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }

    /// `statement_YYYY_MM.<ext>` for the filter's period.
    pub fn file_name(self, filter: &Filter) -> String {
        format!(
            "statement_{}_{:02}.{}",
            filter.year(),
            filter.month(),
            self.extension()
        )
    }
}

/// A rendered export, ready to be written or sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ReportExporter {
    currency: Currency,
}

impl ReportExporter {
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn csv(&self, rows: &[&TransactionRecord], filter: &Filter) -> ResultEngine<ExportFile> {
        let mut bytes = Vec::new();
        csv::write(&mut bytes, rows)?;
        Ok(ExportFile {
            file_name: ExportFormat::Csv.file_name(filter),
            bytes,
        })
    }

    pub fn pdf(&self, rows: &[&TransactionRecord], filter: &Filter) -> ResultEngine<ExportFile> {
        let layout = ReportLayout::build(filter, rows, self.currency);
        Ok(ExportFile {
            file_name: ExportFormat::Pdf.file_name(filter),
            bytes: pdf::render(&layout)?,
        })
    }
}

/// Collapses embedded line breaks so one record stays on one line.
pub(crate) fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_encode_zero_padded_period() {
        let filter = Filter::new(3, 2025).unwrap();
        assert_eq!(ExportFormat::Csv.file_name(&filter), "statement_2025_03.csv");
        assert_eq!(ExportFormat::Pdf.file_name(&filter), "statement_2025_03.pdf");
    }

    #[test]
    fn single_line_collapses_breaks() {
        assert_eq!(single_line("a\nb\r\nc\rd"), "a b c d");
        assert_eq!(single_line("plain"), "plain");
    }
}
