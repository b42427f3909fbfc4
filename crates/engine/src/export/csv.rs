//! Delimited-text rendering.
//!
//! Output contract: UTF-8 with a leading BOM (so spreadsheet tools detect
//! the encoding), CRLF record terminators, fields quoted only when they
//! contain a comma, quote, CR or LF, embedded quotes doubled.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::ExportTable;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Renders a table to CSV bytes.
#[must_use]
pub fn to_csv(table: &ExportTable) -> Vec<u8> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    // The writer only fails on I/O; a Vec sink cannot.
    let _ = writer.write_record(&table.headers);
    for row in &table.rows {
        let _ = writer.write_record(row);
    }

    let body = writer.into_inner().unwrap_or_default();
    let mut out = Vec::with_capacity(UTF8_BOM.len() + body.len());
    out.extend_from_slice(UTF8_BOM);
    out.extend_from_slice(&body);
    out
}
