//! Single-table PDF rendering.
//!
//! A deliberately small PDF 1.4 writer: one table, Helvetica, fixed A4
//! layout, uncompressed content streams, no metadata and no timestamps.
//! Keeping the writer this bare is what makes the output byte-for-byte
//! reproducible from the same table.

use super::ExportTable;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 40.0;
const TITLE_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 9.0;
const ROW_HEIGHT: f32 = 14.0;
const ROWS_PER_PAGE: usize = 50;

/// Renders a table to PDF bytes.
#[must_use]
pub fn to_pdf(table: &ExportTable) -> Vec<u8> {
    let pages = paginate(&table.rows);
    let page_count = pages.len();

    // Object numbering: 1 catalog, 2 pages, 3 font, then for page i
    // (0-based) the page object is 4 + 2i and its content stream 5 + 2i.
    let mut objects: Vec<Vec<u8>> = Vec::with_capacity(3 + 2 * page_count);

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        )
        .into_bytes(),
    );
    objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec());

    for (i, rows) in pages.iter().enumerate() {
        let content = page_content(table, rows, i == 0);
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                5 + 2 * i
            )
            .into_bytes(),
        );
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(content.as_bytes());
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    assemble(&objects)
}

fn paginate(rows: &[Vec<String>]) -> Vec<&[Vec<String>]> {
    if rows.is_empty() {
        return vec![&rows[0..0]];
    }
    rows.chunks(ROWS_PER_PAGE).collect()
}

fn page_content(table: &ExportTable, rows: &[Vec<String>], first_page: bool) -> String {
    let columns = table.headers.len().max(1);
    let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / columns as f32;
    let column_x = |i: usize| MARGIN + column_width * i as f32;

    let mut out = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    if first_page {
        text_at(&mut out, MARGIN, y - TITLE_SIZE, TITLE_SIZE, &table.title);
        y -= TITLE_SIZE + ROW_HEIGHT;
    }

    y -= ROW_HEIGHT;
    for (i, header) in table.headers.iter().enumerate() {
        text_at(&mut out, column_x(i), y, BODY_SIZE, header);
    }

    for row in rows {
        y -= ROW_HEIGHT;
        for (i, cell) in row.iter().take(columns).enumerate() {
            text_at(&mut out, column_x(i), y, BODY_SIZE, cell);
        }
    }
    out
}

fn text_at(out: &mut String, x: f32, y: f32, size: f32, text: &str) {
    out.push_str(&format!(
        "BT /F1 {size} Tf {x:.1} {y:.1} Td ({}) Tj ET\n",
        escape_text(text)
    ));
}

/// Escapes the characters PDF string literals reserve.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\r' | '\n' => escaped.push(' '),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Serializes numbered objects, the xref table and the trailer.
fn assemble(objects: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(row_count: usize) -> ExportTable {
        ExportTable {
            title: "Expenses".to_string(),
            headers: vec!["Date".to_string(), "Amount".to_string()],
            rows: (0..row_count)
                .map(|i| vec![format!("2025-06-{:02}", i % 28 + 1), format!("{i}.00")])
                .collect(),
        }
    }

    #[test]
    fn output_is_a_pdf_and_reproducible() {
        let t = table(3);
        let bytes = to_pdf(&t);
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert_eq!(bytes, to_pdf(&t));
    }

    #[test]
    fn long_tables_paginate() {
        let bytes = to_pdf(&table(ROWS_PER_PAGE + 1));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 2"));
    }

    #[test]
    fn reserved_characters_are_escaped() {
        assert_eq!(escape_text(r"a(b)c\d"), r"a\(b\)c\\d");
        assert_eq!(escape_text("two\nlines"), "two lines");
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = to_pdf(&table(1));
        let text = String::from_utf8_lossy(&bytes);
        let xref_pos = text.find("xref\n").unwrap();
        // Skip "xref", the subsection line and the free entry; entry n then
        // holds the offset of object n + 1.
        for (n, line) in text[xref_pos..].lines().skip(3).take(5).enumerate() {
            let offset: usize = line[..10].parse().unwrap();
            assert!(text[offset..].starts_with(&format!("{} 0 obj", n + 1)));
        }
    }
}
