//! The note markup: a small, deterministic subset of HTML.
//!
//! ## Blocks
//!
//! `<p>`, `<h1>` to `<h3>`, `<blockquote>`, `<pre>`, and `<ul>`/`<ol>`
//! holding `<li>`. Non-left alignment is written on the block tag as
//! `style="text-align:center"`. Nothing is emitted between blocks.
//!
//! ## Runs
//!
//! Each run is wrapped, outermost first, in `<a href>`, one `<span style>`
//! carrying the non-default `font-size`, `color` and `background-color`,
//! then `<b>`, `<i>` and `<u>`. A run with the default style is bare text.
//!
//! ## Parsing
//!
//! [`parse`] accepts the above plus what browser editing engines tend to
//! produce: `<strong>`, `<em>`, `<div>`, `<br>`, `<font>`, inline
//! `font-weight`/`font-style`/`text-decoration` styles and bare top-level
//! text. Anything else is dropped with its text kept. It never fails.
//!
//! ```rust
//! use hexhub_engine::parsing::markup::{parse, serialize};
//!
//! let doc = parse("<p>Hello <strong>World</strong></p>");
//! assert_eq!(serialize(&doc), "<p>Hello <b>World</b></p>");
//! ```

mod css;
mod cursor;
mod lexer;
mod parser;
mod serializer;
mod tag;

pub use parser::parse;
pub use serializer::serialize;
