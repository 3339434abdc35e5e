use crate::layout::{CharRecord, DocumentLayout, PageLayout};

pub const PAGE_SEPARATOR: char = '\n';

/// Assembles the full text and its layout, handing out global offsets.
///
/// Every char appended to the text consumes exactly one offset, whether it
/// gets a record (`push_char`, OCR word chars) or not (`push_gap`, the
/// space after an OCR word, the page separator).
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    text: String,
    pages: Vec<PageLayout>,
    open: bool,
    next_offset: usize,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the current page, if any, and starts a new one.
    pub fn begin_page(&mut self, width: f32, height: f32) -> &mut Self {
        self.close_page();
        self.pages.push(PageLayout::new(width, height));
        self.open = true;
        self
    }

    fn close_page(&mut self) {
        if self.open {
            self.push_text(PAGE_SEPARATOR);
            self.open = false;
        }
    }

    fn push_text(&mut self, ch: char) -> usize {
        let offset = self.next_offset;
        self.text.push(ch);
        self.next_offset += 1;
        offset
    }

    fn current_page(&mut self) -> (usize, &mut PageLayout) {
        if !self.open {
            self.begin_page(1.0, 1.0);
        }
        let index = self.pages.len() - 1;
        (index, &mut self.pages[index])
    }

    /// Appends a natively extracted character.
    pub fn push_char(&mut self, ch: char, x0: f32, y0: f32, x1: f32, y1: f32) -> &mut Self {
        let offset = self.push_text(ch);
        let (page, layout) = self.current_page();
        layout
            .chars
            .push(CharRecord::new(ch, (x0, y0, x1, y1), page, offset));
        self
    }

    /// Appends every char of `text` along one baseline, one box per char of
    /// `advance` width starting at `x`.
    pub fn push_line(&mut self, text: &str, x: f32, y0: f32, y1: f32, advance: f32) -> &mut Self {
        for (i, ch) in text.chars().enumerate() {
            let left = x + i as f32 * advance;
            self.push_char(ch, left, y0, left + advance, y1);
        }
        self
    }

    /// Appends text that has no character record.
    pub fn push_gap(&mut self, ch: char) -> &mut Self {
        if !self.open {
            self.begin_page(1.0, 1.0);
        }
        self.push_text(ch);
        self
    }

    /// Appends an OCR word: its box is split evenly across its chars and a
    /// space without a record follows it. Blank words are ignored.
    pub fn push_ocr_word(&mut self, word: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> &mut Self {
        let word = word.trim();
        let count = word.chars().count();
        if count == 0 {
            return self;
        }

        let char_width = (x1 - x0) / count as f32;
        for (i, ch) in word.chars().enumerate() {
            let left = x0 + i as f32 * char_width;
            self.push_char(ch, left, y0, left + char_width, y1);
        }
        self.push_gap(' ')
    }

    pub fn finish(mut self) -> (String, DocumentLayout) {
        self.close_page();
        (self.text, DocumentLayout::new(self.pages))
    }
}
