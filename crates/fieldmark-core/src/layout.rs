use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::logging::INPUT_OPERATIONS;
use crate::rects::LINE_JOIN_THRESHOLD;

/// A single positioned character of the reconstructed document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharRecord {
    pub char: String,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    #[serde(default)]
    pub page: usize,
    /// Codepoint offset of this character within the full document text.
    pub global_offset: usize,
}

impl CharRecord {
    pub fn new(ch: char, bbox: (f32, f32, f32, f32), page: usize, global_offset: usize) -> Self {
        Self {
            char: ch.to_string(),
            x0: bbox.0,
            y0: bbox.1,
            x1: bbox.2,
            y1: bbox.3,
            page,
            global_offset,
        }
    }

    pub fn bbox(&self) -> (f32, f32, f32, f32) {
        (self.x0, self.y0, self.x1, self.y1)
    }
}

fn default_dimension() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    #[serde(default = "default_dimension")]
    pub width: f32,
    #[serde(default = "default_dimension")]
    pub height: f32,
    #[serde(default)]
    pub chars: Vec<CharRecord>,
}

impl PageLayout {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            chars: Vec::new(),
        }
    }
}

/// Ordered pages of a document; the index in `pages` is the page number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    #[serde(default)]
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    pub fn new(pages: Vec<PageLayout>) -> Self {
        Self { pages }
    }

    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.chars.len()).sum()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse document layout")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout file {}", path.display()))?;
        let layout = Self::from_json(&raw)
            .with_context(|| format!("Invalid layout in {}", path.display()))?;

        tracing::debug!(
            target: INPUT_OPERATIONS,
            pages = layout.pages.len(),
            chars = layout.char_count(),
            "Loaded layout from {}",
            path.display()
        );
        Ok(layout)
    }

    /// Rebuilds the full document text from the character records alone.
    ///
    /// Every record's char lands on its offset. The offset right after a
    /// page's last record becomes the `'\n'` page separator. Any other offset
    /// without a record is a line break when the records on either side sit
    /// on different lines of the same page, and a space otherwise.
    ///
    /// Fails when the highest offset lies past twice the record count plus
    /// one separator per page.
    pub fn reconstruct_text(&self) -> Result<String> {
        let mut placed: BTreeMap<usize, &CharRecord> = BTreeMap::new();
        let mut page_ends = Vec::new();

        for page in &self.pages {
            for record in &page.chars {
                placed.insert(record.global_offset, record);
            }
            if let Some(end) = page.chars.iter().map(|r| r.global_offset).max() {
                page_ends.push(end);
            }
        }

        let Some(&last_end) = page_ends.iter().max() else {
            return Ok(String::new());
        };

        let limit = 2 * self.char_count() + self.pages.len();
        if last_end >= limit {
            bail!(
                "Layout offsets too sparse to rebuild text: highest offset {} for {} records",
                last_end,
                self.char_count()
            );
        }

        let last_separator = last_end + 1;
        let mut text = vec![' '; last_separator + 1];
        for offset in 1..last_separator {
            if placed.contains_key(&offset) {
                continue;
            }
            if let (Some(before), Some(after)) = (placed.get(&(offset - 1)), placed.get(&(offset + 1))) {
                if before.page == after.page
                    && (before.y0 - after.y0).abs() >= LINE_JOIN_THRESHOLD
                {
                    text[offset] = '\n';
                }
            }
        }
        for end in page_ends {
            text[end + 1] = '\n';
        }
        for (offset, record) in placed {
            if let Some(ch) = record.char.chars().next() {
                text[offset] = ch;
            }
        }
        Ok(text.into_iter().collect())
    }
}

/// Page dimensions keyed by page index, attached to every emitted rect.
#[derive(Debug, Clone, Default)]
pub struct PageSizes {
    sizes: HashMap<usize, (f32, f32)>,
}

impl PageSizes {
    pub const UNKNOWN: (f32, f32) = (1.0, 1.0);

    pub fn from_layout(layout: &DocumentLayout) -> Self {
        let sizes = layout
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| (index, (page.width, page.height)))
            .collect();
        Self { sizes }
    }

    pub fn get(&self, page: usize) -> (f32, f32) {
        self.sizes.get(&page).copied().unwrap_or(Self::UNKNOWN)
    }
}
