//! Source positions for component highlighting.
//!
//! ```text
//! source_map/
//! ├── parser.rs: JSON parser that records a span per member and element
//! └── locate.rs: structural path → zero-indexed line range
//! ```
//!
//! Paths are the ones produced by [`crate::inspector::DocumentTree`]:
//! `mainTemplate/items/0/item` and so on.

pub mod locate;
pub mod parser;

pub use locate::{locate, locate_in_file, SourceRange};
pub use parser::{parse, Member, ParseError, Span, Spanned, SpannedValue};
