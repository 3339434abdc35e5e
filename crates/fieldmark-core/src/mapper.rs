use rayon::prelude::*;
use serde_json::Value;
use tracing::{info_span, Level};
use uuid::Uuid;

use crate::config::MapperConfig;
use crate::fields::{parse_fields, CandidateField, MappedField, MappedFields};
use crate::layout::{DocumentLayout, PageSizes};
use crate::logging::FIELD_MAPPING;
use crate::matcher::{MatchLocator, SearchText};
use crate::offset_index::OffsetIndex;
use crate::rects::build_rects;

/// Read-only state shared by every field of one document.
pub struct FieldMapper {
    text: SearchText,
    index: OffsetIndex,
    page_sizes: PageSizes,
    config: MapperConfig,
}

impl FieldMapper {
    pub fn new(full_text: &str, layout: &DocumentLayout, config: MapperConfig) -> Self {
        Self {
            text: SearchText::new(full_text),
            index: OffsetIndex::build(layout),
            page_sizes: PageSizes::from_layout(layout),
            config,
        }
    }

    pub fn index(&self) -> &OffsetIndex {
        &self.index
    }

    /// Locates one field and turns its span into rects.
    pub fn map_field(&self, field: &CandidateField) -> MappedField {
        let locator = MatchLocator::new(&self.text, self.config.locator.clone());
        let Some(span) = locator.locate(&field.snippet, &field.value) else {
            return MappedField::unlocated(field);
        };

        let rects = build_rects(span.start, span.end, &self.index, &self.page_sizes);
        if rects.is_empty() {
            tracing::debug!(
                target: FIELD_MAPPING,
                label = %field.label,
                start = span.start,
                end = span.end,
                "Matched span has no character records"
            );
        }
        MappedField::with_rects(field, rects)
    }

    /// Maps every field, keeping input order.
    pub fn map_all(&self, fields: &[CandidateField]) -> Vec<MappedField> {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            target: FIELD_MAPPING,
            "map_fields",
            run_id = %run_id,
            fields = fields.len(),
            parallel = self.config.parallel
        );
        let _enter = span.enter();

        let mapped: Vec<MappedField> = if self.config.parallel {
            fields.par_iter().map(|f| self.map_field(f)).collect()
        } else {
            fields.iter().map(|f| self.map_field(f)).collect()
        };

        let located = mapped.iter().filter(|m| m.is_located()).count();
        tracing::event!(
            target: FIELD_MAPPING,
            Level::INFO,
            located,
            unlocated = mapped.len() - located,
            "Mapped {} fields",
            mapped.len()
        );
        mapped
    }
}

/// Maps candidate fields onto the layout with the default configuration.
pub fn map_fields(
    fields: &[CandidateField],
    full_text: &str,
    layout: &DocumentLayout,
) -> Vec<MappedField> {
    map_fields_with_config(fields, full_text, layout, &MapperConfig::default())
}

pub fn map_fields_with_config(
    fields: &[CandidateField],
    full_text: &str,
    layout: &DocumentLayout,
    config: &MapperConfig,
) -> Vec<MappedField> {
    if fields.is_empty() {
        return Vec::new();
    }
    FieldMapper::new(full_text, layout, config.clone()).map_all(fields)
}

/// Maps the classifier's untyped `{"fields": [...]}` output, skipping
/// malformed records.
pub fn map_structured(
    structured: &Value,
    full_text: &str,
    layout: &DocumentLayout,
    config: &MapperConfig,
) -> MappedFields {
    let fields = parse_fields(structured);
    MappedFields {
        fields: map_fields_with_config(&fields, full_text, layout, config),
    }
}
