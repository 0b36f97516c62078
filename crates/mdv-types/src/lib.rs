//! Foundation types for the mdview diff engine.
//!
//! This crate provides the parsed-markdown token model shared between the
//! external tokenizer and the structural diff engine. Tokens are immutable
//! snapshots; the diff engine never mutates them.
//!
//! # Key Types
//!
//! - [`Token`] — A parsed block, list item, table row, or code line with its
//!   exact source text and nested children
//! - [`TokenKind`] — Closed structural classification (heading, paragraph,
//!   list, table, code, blockquote, other)
//! - [`TokenError`] — Well-formedness violations reported by validation

pub mod error;
pub mod token;

pub use error::TokenError;
pub use token::{Token, TokenKind};
