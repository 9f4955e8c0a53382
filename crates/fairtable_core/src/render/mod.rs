//! Plain renderings of a floor layout.
//!
//! # Responsibility
//! - Turn a `FloorLayout` into a text plan or a JSON document.
//! - Keep styling out: only numbers, ids and category codes are emitted.

pub mod category;
pub mod text;

use crate::layout::numbering::{FloorLayout, LayoutStats};
use serde::Serialize;

#[derive(Serialize)]
struct LayoutDocument<'a> {
    stats: LayoutStats,
    #[serde(flatten)]
    layout: &'a FloorLayout,
}

/// Serializes the layout with its headline stats as pretty JSON.
pub fn render_json(layout: &FloorLayout) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&LayoutDocument {
        stats: layout.stats(),
        layout,
    })
}
