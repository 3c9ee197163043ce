//! cmdtree-reader: cursor-addressable token stream over mixed input.
//!
//! A [`Reader`] is built from raw text or from an ordered sequence of
//! arbitrary values. Each value becomes a content segment; consecutive
//! segments are joined by a synthetic single-space separator, so the whole
//! input reads like one line of text while opaque values can still be
//! pulled out whole.
//!
//! # Public API
//!
//! - [`Reader`] -- the cursor and its character/token operations
//! - [`Token`] -- one whitespace-delimited word or one opaque value
//! - [`Stringify`] -- pluggable value-to-text conversion
//!
//! Cursor positions count Unicode scalar values, not bytes.

pub mod reader;
pub mod segment;
pub mod token;

// ── Convenience re-exports ───────────────────────────────────────────

pub use reader::Reader;
pub use segment::{AnyValue, DefaultStringify, FnStringify, Stringify};
pub use token::Token;
