pub mod config;
pub mod fields;
pub mod layout;
pub mod layout_builder;
pub mod logging;
pub mod mapper;
pub mod matcher;
pub mod offset_index;
pub mod rects;

pub use config::{LocatorConfig, MapperConfig};
pub use fields::{
    parse_classifier_output, parse_fields, CandidateField, MappedField, MappedFields,
};
pub use layout::{CharRecord, DocumentLayout, PageLayout, PageSizes};
pub use layout_builder::LayoutBuilder;
pub use mapper::{map_fields, map_fields_with_config, map_structured, FieldMapper};
pub use matcher::{locate, MatchLocator, MatchSource, MatchSpan, MatchStrategy, SearchText};
pub use offset_index::OffsetIndex;
pub use rects::{build_rects, FieldRect};

use anyhow::Result;

/// Maps a classifier reply onto a document and returns the output JSON.
///
/// # Arguments
/// * `classifier_output` - Raw classifier reply, ideally `{"fields": [...]}`
/// * `full_text` - The page-separated document text the layout indexes
/// * `layout` - Character records for every page
///
/// # Returns
/// * `Result<String>` - `{"fields": [...]}` as JSON
pub fn process_document(
    classifier_output: &str,
    full_text: &str,
    layout: &DocumentLayout,
    config: &MapperConfig,
    pretty: bool,
) -> Result<String> {
    let structured = parse_classifier_output(classifier_output);
    let mapped = map_structured(&structured, full_text, layout, config);

    let json = if pretty {
        serde_json::to_string_pretty(&mapped)?
    } else {
        serde_json::to_string(&mapped)?
    };
    Ok(json)
}
