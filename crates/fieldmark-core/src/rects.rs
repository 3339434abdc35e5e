use serde::{Deserialize, Serialize};

use crate::layout::{CharRecord, PageSizes};
use crate::logging::RECT_BUILDER;
use crate::offset_index::OffsetIndex;

/// Characters whose `y0` differ by less than this share a visual line.
pub const LINE_JOIN_THRESHOLD: f32 = 5.0;
/// Largest offset step between two characters of the same rect.
pub const MAX_OFFSET_GAP: usize = 1;

/// Bounding box of one line of a matched span, in page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRect {
    pub page: usize,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub page_width: f32,
    pub page_height: f32,
}

impl FieldRect {
    fn start(record: &CharRecord, (page_width, page_height): (f32, f32)) -> Self {
        Self {
            page: record.page,
            x0: record.x0,
            y0: record.y0,
            x1: record.x1,
            y1: record.y1,
            page_width,
            page_height,
        }
    }

    fn extend(&mut self, record: &CharRecord) {
        self.x0 = self.x0.min(record.x0);
        self.y0 = self.y0.min(record.y0);
        self.x1 = self.x1.max(record.x1);
        self.y1 = self.y1.max(record.y1);
    }

    /// True when the two rects intersect with positive area on the same page.
    pub fn overlaps(&self, other: &FieldRect) -> bool {
        self.page == other.page
            && self.x0 < other.x1
            && other.x0 < self.x1
            && self.y0 < other.y1
            && other.y0 < self.y1
    }
}

fn continues_line(previous: &CharRecord, record: &CharRecord, current: &FieldRect) -> bool {
    record.page == current.page
        && record.global_offset.saturating_sub(previous.global_offset) <= MAX_OFFSET_GAP
        && (record.y0 - previous.y0).abs() < LINE_JOIN_THRESHOLD
}

/// Groups the records of `[start, end)` into per-line rects, in offset order.
pub fn build_rects(
    start: usize,
    end: usize,
    index: &OffsetIndex,
    page_sizes: &PageSizes,
) -> Vec<FieldRect> {
    let records = index.range(start, end);
    let mut rects = Vec::new();
    let mut current: Option<FieldRect> = None;
    let mut previous: Option<&CharRecord> = None;

    for record in records {
        let joins = match (&current, previous) {
            (Some(rect), Some(prev)) => continues_line(prev, record, rect),
            _ => false,
        };

        match current.as_mut() {
            Some(rect) if joins => rect.extend(record),
            _ => {
                if let Some(done) = current.take() {
                    rects.push(done);
                }
                current = Some(FieldRect::start(record, page_sizes.get(record.page)));
            }
        }
        previous = Some(record);
    }

    if let Some(done) = current {
        rects.push(done);
    }

    tracing::trace!(
        target: RECT_BUILDER,
        start,
        end,
        chars = records.len(),
        rects = rects.len(),
        "Built rects for span"
    );
    rects
}
