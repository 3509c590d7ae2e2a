use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;

use crate::{ResultEngine, TransactionRecord};

use super::{DISPLAY_DATE_FORMAT, single_line};

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Kind")]
    kind: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
}

/// Writes `Date;Description;Kind;Amount` plus one row per record. Every field
/// is quoted and inner quotes are doubled.
pub(super) fn write<W: Write>(out: W, rows: &[&TransactionRecord]) -> ResultEngine<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .quote_style(QuoteStyle::Always)
        .from_writer(out);

    for record in rows {
        writer.serialize(CsvRow {
            date: record.date.format(DISPLAY_DATE_FORMAT).to_string(),
            description: single_line(&record.description),
            kind: record.kind.as_str(),
            amount: record.amount.to_plain_string(),
        })?;
    }

    if rows.is_empty() {
        writer.write_record(["Date", "Description", "Kind", "Amount"])?;
    }

    writer
        .flush()
        .map_err(|err| crate::EngineError::Export(err.to_string()))?;
    Ok(())
}
