use thiserror::Error;

/// Errors produced by token validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// A non-container token carried children; this indicates a bug in the
    /// upstream parser, not a legitimate diff scenario.
    #[error("token of kind {kind} must not have children (raw: {raw:?})")]
    UnexpectedChildren { kind: String, raw: String },
}
