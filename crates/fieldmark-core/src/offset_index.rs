use crate::layout::{CharRecord, DocumentLayout};

/// Every character of a document in global offset order.
#[derive(Debug, Default)]
pub struct OffsetIndex {
    chars: Vec<CharRecord>,
}

impl OffsetIndex {
    /// Flattens all pages and sorts by `global_offset`.
    ///
    /// The sort is stable, so duplicate offsets keep page order and then
    /// their order within the page.
    pub fn build(layout: &DocumentLayout) -> Self {
        let mut chars: Vec<CharRecord> = layout
            .pages
            .iter()
            .flat_map(|page| page.chars.iter().cloned())
            .collect();
        chars.sort_by_key(|record| record.global_offset);

        tracing::trace!(chars = chars.len(), "Built offset index");
        Self { chars }
    }

    /// Records with `start <= global_offset < end`.
    pub fn range(&self, start: usize, end: usize) -> &[CharRecord] {
        if start >= end {
            return &[];
        }
        let lo = self.chars.partition_point(|c| c.global_offset < start);
        let hi = self.chars.partition_point(|c| c.global_offset < end);
        &self.chars[lo..hi]
    }

    pub fn chars(&self) -> &[CharRecord] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}
