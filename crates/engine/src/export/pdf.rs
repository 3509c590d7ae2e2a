//! Paginated tabular statement rendered to PDF.
//!
//! Layout is computed first as plain data ([`ReportLayout`]) so pagination can
//! be checked without parsing a PDF.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};

use crate::{Currency, EngineError, Filter, ResultEngine, TransactionKind, TransactionRecord};

use super::{DISPLAY_DATE_FORMAT, single_line};

// A4 portrait, millimetres.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 14.0;
const TITLE_BASELINE: f32 = 15.0;
const FIRST_TABLE_TOP: f32 = 25.0;
const ROW_HEIGHT: f32 = 8.0;
const TEXT_INSET: f32 = 2.5;
const DESCRIPTION_MAX_CHARS: usize = 48;

const HEADER: [&str; 4] = ["Date", "Description", "Kind", "Amount"];
const COLUMNS: [f32; 4] = [MARGIN + 2.0, 42.0, 130.0, 160.0];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub date: String,
    pub description: String,
    pub kind: TransactionKind,
    pub amount: String,
}

impl ReportRow {
    fn cells(&self) -> [&str; 4] {
        [
            self.date.as_str(),
            self.description.as_str(),
            kind_label(self.kind),
            self.amount.as_str(),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportLayout {
    pub title: String,
    /// Rows per page; the first page also carries the title.
    pub pages: Vec<Vec<ReportRow>>,
}

impl ReportLayout {
    pub fn build(filter: &Filter, records: &[&TransactionRecord], currency: Currency) -> Self {
        let title = format!("Statement {:02}/{}", filter.month(), filter.year());
        let mut rows = records.iter().map(|record| ReportRow {
            date: record.date.format(DISPLAY_DATE_FORMAT).to_string(),
            description: truncate(&single_line(&record.description), DESCRIPTION_MAX_CHARS),
            kind: record.kind,
            amount: currency.format(record.amount),
        });

        let mut pages = Vec::new();
        let mut capacity = rows_per_page(true);
        loop {
            let page: Vec<ReportRow> = rows.by_ref().take(capacity).collect();
            let done = page.len() < capacity;
            if page.is_empty() && !pages.is_empty() {
                break;
            }
            pages.push(page);
            if done {
                break;
            }
            capacity = rows_per_page(false);
        }

        Self { title, pages }
    }

    pub fn row_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }
}

fn table_top(first_page: bool) -> f32 {
    if first_page {
        PAGE_HEIGHT - FIRST_TABLE_TOP
    } else {
        PAGE_HEIGHT - MARGIN
    }
}

/// Data rows that fit under the header band before the bottom margin.
fn rows_per_page(first_page: bool) -> usize {
    let usable = table_top(first_page) - ROW_HEIGHT - MARGIN;
    (usable / ROW_HEIGHT).floor() as usize
}

fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Inflow => "Inflow",
        TransactionKind::Outflow => "Outflow",
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn export_error(err: impl std::fmt::Display) -> EngineError {
    EngineError::Export(err.to_string())
}

pub(super) fn render(layout: &ReportLayout) -> ResultEngine<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Page 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(export_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(export_error)?;

    for (index, rows) in layout.pages.iter().enumerate() {
        let first = index == 0;
        let layer = if first {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(
                Mm(PAGE_WIDTH),
                Mm(PAGE_HEIGHT),
                format!("Page {}", index + 1),
            );
            doc.get_page(page).get_layer(layer)
        };

        if first {
            layer.set_fill_color(rgb(0.0, 0.0, 0.0));
            layer.use_text(
                layout.title.as_str(),
                14.0,
                Mm(MARGIN),
                Mm(PAGE_HEIGHT - TITLE_BASELINE),
                &bold,
            );
        }

        let top = table_top(first);
        draw_header(&layer, top, &bold);
        draw_rows(&layer, top - ROW_HEIGHT, rows, &regular);
    }

    doc.save_to_bytes().map_err(export_error)
}

fn draw_header(layer: &PdfLayerReference, top: f32, font: &IndirectFontRef) {
    layer.set_fill_color(rgb(0.16, 0.50, 0.73));
    layer.add_rect(Rect::new(
        Mm(MARGIN),
        Mm(top - ROW_HEIGHT),
        Mm(PAGE_WIDTH - MARGIN),
        Mm(top),
    ));

    layer.set_fill_color(rgb(1.0, 1.0, 1.0));
    for (label, x) in HEADER.iter().zip(COLUMNS) {
        layer.use_text(*label, 10.0, Mm(x), Mm(top - ROW_HEIGHT + TEXT_INSET), font);
    }
}

fn draw_rows(layer: &PdfLayerReference, top: f32, rows: &[ReportRow], font: &IndirectFontRef) {
    for (index, row) in rows.iter().enumerate() {
        let baseline = top - ROW_HEIGHT * (index as f32 + 1.0) + TEXT_INSET;
        for (column, (cell, x)) in row.cells().into_iter().zip(COLUMNS).enumerate() {
            let color = match (column, row.kind) {
                (3, TransactionKind::Inflow) => rgb(0.0, 0.5, 0.0),
                (3, TransactionKind::Outflow) => rgb(0.75, 0.0, 0.0),
                _ => rgb(0.0, 0.0, 0.0),
            };
            layer.set_fill_color(color);
            layer.use_text(cell, 9.0, Mm(x), Mm(baseline), font);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{Money, RecordId};

    fn records(count: usize) -> Vec<TransactionRecord> {
        (0..count)
            .map(|i| TransactionRecord {
                id: RecordId(i as i64),
                description: format!("entry {i}"),
                amount: Money::new(1_000),
                kind: TransactionKind::Outflow,
                date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            })
            .collect()
    }

    fn layout(count: usize) -> ReportLayout {
        let records = records(count);
        let refs: Vec<&TransactionRecord> = records.iter().collect();
        ReportLayout::build(&Filter::new(1, 2025).unwrap(), &refs, Currency::Brl)
    }

    #[test]
    fn page_capacities() {
        assert_eq!(rows_per_page(true), 31);
        assert_eq!(rows_per_page(false), 32);
    }

    #[test]
    fn empty_view_has_one_page() {
        let layout = layout(0);
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(layout.row_count(), 0);
        assert_eq!(layout.title, "Statement 01/2025");
    }

    #[test]
    fn overflow_starts_new_pages() {
        assert_eq!(layout(31).pages.len(), 1);
        assert_eq!(layout(32).pages.len(), 2);
        let big = layout(31 + 32 + 1);
        assert_eq!(big.pages.len(), 3);
        assert_eq!(big.pages[2].len(), 1);
        assert_eq!(big.row_count(), 64);
    }

    #[test]
    fn rows_use_locale_currency_and_dates() {
        let layout = layout(1);
        let row = &layout.pages[0][0];
        assert_eq!(row.amount, "R$ 10,00");
        assert_eq!(row.date, "01/01/2025");
        assert_eq!(row.cells()[2], "Outflow");
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let long = "x".repeat(60);
        let cut = truncate(&long, DESCRIPTION_MAX_CHARS);
        assert_eq!(cut.chars().count(), DESCRIPTION_MAX_CHARS);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn renders_pdf_bytes() {
        let bytes = render(&layout(40)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
