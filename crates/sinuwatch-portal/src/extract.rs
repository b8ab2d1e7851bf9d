//! Grade-table extraction from the rendered records page
//!
//! The records page contains several layout tables; the data table is the
//! one carrying the `table` marker class. A row is decoded only when it has
//! exactly six direct `<td>` children AND its nearest `<table>` ancestor
//! carries that class; the dual condition is the sole filter separating
//! grade rows from every other `<tr>` on the page.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use sinuwatch_core::record::{GradeRecord, normalize_subject};

/// Class the portal puts on the grade data table (and nothing else)
const DATA_TABLE_CLASS: &str = "table";

static TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());

/// Decode every qualifying row of the document, in page order
///
/// Never fails: rows with the wrong cell count are skipped, an empty or
/// unrecognizable document yields an empty vector (with a warn diagnostic,
/// since a renamed marker class would land here too).
pub fn extract_records(html: &str) -> Vec<GradeRecord> {
    let document = Html::parse_document(html);

    let mut records = Vec::new();
    for row in document.select(&TR) {
        if !in_marked_table(row) {
            continue;
        }

        let cells: Vec<ElementRef> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .collect();
        // Exactly six direct cells: year, semester, subject, type, date, grade
        let [year, semester, subject, kind, date, grade] = cells.as_slice() else {
            continue;
        };

        records.push(GradeRecord {
            year: cell_text(*year),
            semester: cell_text(*semester),
            subject: normalize_subject(&subject.text().collect::<String>()),
            kind: cell_text(*kind),
            date: cell_text(*date),
            grade: cell_text(*grade),
        });
    }

    if records.is_empty() {
        warn!("no grade rows extracted, page shape may have changed");
    }

    records
}

/// True when the row's nearest `<table>` ancestor carries the marker class
fn in_marked_table(row: ElementRef) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
        .is_some_and(|table| table.value().classes().any(|c| c == DATA_TABLE_CLASS))
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
