//! Foundation types for thorn-syntax.
//!
//! - [`Point`] - row/column positions
//! - [`LineIndex`] - byte offset to point conversion
//! - [`TextRange`], [`TextSize`] - byte offsets
//!
//! This module has NO dependencies on other crate modules.

mod line_index;
mod position;

pub use line_index::LineIndex;
pub use position::Point;

pub use text_size::{TextRange, TextSize};
