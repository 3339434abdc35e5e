#![allow(dead_code)]

use fieldmark_core::{CharRecord, DocumentLayout, LayoutBuilder, PageLayout};

pub const POLICY_TEXT: &str = "Policy No: PN-1029\nInsured: Jane Doe\n";

pub const LETTER_WIDTH: f32 = 612.0;
pub const LETTER_HEIGHT: f32 = 792.0;

pub const LEFT_MARGIN: f32 = 50.0;
pub const TOP_MARGIN: f32 = 100.0;
pub const ADVANCE: f32 = 10.0;
pub const LINE_HEIGHT: f32 = 12.0;
pub const LINE_PITCH: f32 = 20.0;

/// Lays out `lines` on one letter page, one record per visible char, each
/// line `LINE_PITCH` below the previous one, newlines without records.
pub fn single_page_document(lines: &[&str]) -> (String, DocumentLayout) {
    let mut builder = LayoutBuilder::new();
    builder.begin_page(LETTER_WIDTH, LETTER_HEIGHT);
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            builder.push_gap('\n');
        }
        let y0 = TOP_MARGIN + i as f32 * LINE_PITCH;
        builder.push_line(line, LEFT_MARGIN, y0, y0 + LINE_HEIGHT, ADVANCE);
    }
    builder.finish()
}

pub fn policy_document() -> (String, DocumentLayout) {
    single_page_document(&["Policy No: PN-1029", "Insured: Jane Doe"])
}

pub fn record(ch: char, offset: usize, page: usize, x0: f32, y0: f32) -> CharRecord {
    CharRecord::new(ch, (x0, y0, x0 + ADVANCE, y0 + LINE_HEIGHT), page, offset)
}

pub fn layout_of(pages: Vec<Vec<CharRecord>>) -> DocumentLayout {
    DocumentLayout::new(
        pages
            .into_iter()
            .map(|chars| PageLayout {
                width: LETTER_WIDTH,
                height: LETTER_HEIGHT,
                chars,
            })
            .collect(),
    )
}
