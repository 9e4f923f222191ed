//! Conversions between text formats and [`Document`](crate::Document).
//!
//! - [`markup`]: the note markup the editor stores and emits
//! - [`markdown`]: one-way import of Markdown notes

pub(crate) mod builder;
pub mod markdown;
pub mod markup;

pub use markup::{parse, serialize};
