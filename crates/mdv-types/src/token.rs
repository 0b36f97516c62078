use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// The structural kind of a parsed markdown token.
///
/// This is a closed set: anything the parser cannot classify lands in
/// [`TokenKind::Other`]. Nested units (list items, table rows, code lines)
/// are also `Other`; their role is implied by the parent container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Heading,
    Paragraph,
    List,
    Table,
    Code,
    Blockquote,
    Other,
}

impl TokenKind {
    /// Returns `true` for kinds whose tokens carry nested children
    /// (list items, table rows, code lines, quoted blocks).
    pub fn is_container(self) -> bool {
        matches!(
            self,
            TokenKind::List | TokenKind::Table | TokenKind::Code | TokenKind::Blockquote
        )
    }
}

/// A parsed markdown block, list item, table row, or code line.
///
/// Tokens are immutable snapshots produced by the external parser. `raw` is
/// the exact source text of the unit and is what equality comparisons use;
/// `children` hold nested structure for container kinds:
///
/// - `List` children are item tokens (`raw` = the item's head text,
///   `children` = the items of its nested sub-list, if any),
/// - `Table` children are row tokens,
/// - `Code` children are line tokens,
/// - `Blockquote` children are the quoted inner blocks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Structural kind of this token.
    pub kind: TokenKind,
    /// Exact source text of this unit.
    pub raw: String,
    /// Nested tokens, empty for leaf units.
    pub children: Vec<Token>,
}

impl Token {
    /// Create a leaf token of the given kind.
    pub fn new(kind: TokenKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            children: Vec::new(),
        }
    }

    /// Create a container token with children.
    pub fn with_children(kind: TokenKind, raw: impl Into<String>, children: Vec<Token>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            children,
        }
    }

    /// A heading block.
    pub fn heading(raw: impl Into<String>) -> Self {
        Self::new(TokenKind::Heading, raw)
    }

    /// A paragraph block.
    pub fn paragraph(raw: impl Into<String>) -> Self {
        Self::new(TokenKind::Paragraph, raw)
    }

    /// A list block holding item tokens.
    pub fn list(raw: impl Into<String>, items: Vec<Token>) -> Self {
        Self::with_children(TokenKind::List, raw, items)
    }

    /// A list item: `head` is the item's own text, `nested` the items of its
    /// sub-list (empty when the item has no sub-list).
    pub fn list_item(head: impl Into<String>, nested: Vec<Token>) -> Self {
        Self::with_children(TokenKind::Other, head, nested)
    }

    /// A table block holding row tokens.
    pub fn table(raw: impl Into<String>, rows: Vec<Token>) -> Self {
        Self::with_children(TokenKind::Table, raw, rows)
    }

    /// A single table row.
    pub fn table_row(raw: impl Into<String>) -> Self {
        Self::new(TokenKind::Other, raw)
    }

    /// A fenced or indented code block holding line tokens.
    pub fn code(raw: impl Into<String>, lines: Vec<Token>) -> Self {
        Self::with_children(TokenKind::Code, raw, lines)
    }

    /// A single line of a code block.
    pub fn code_line(raw: impl Into<String>) -> Self {
        Self::new(TokenKind::Other, raw)
    }

    /// A blockquote holding its inner block tokens.
    pub fn blockquote(raw: impl Into<String>, inner: Vec<Token>) -> Self {
        Self::with_children(TokenKind::Blockquote, raw, inner)
    }

    /// An unclassified leaf block.
    pub fn other(raw: impl Into<String>) -> Self {
        Self::new(TokenKind::Other, raw)
    }

    /// Returns `true` if this token's kind carries children.
    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Deep equality over the whole subtree: kind, raw text, and children.
    ///
    /// `PartialEq` already compares deeply; this is the named predicate the
    /// differs hand to alignment as their `equals` function.
    pub fn subtree_eq(&self, other: &Token) -> bool {
        self == other
    }

    /// Check well-formedness of this subtree.
    ///
    /// List items are the one leaf kind allowed to carry children (their
    /// nested sub-list), and the engine reaches them only through a `List`
    /// parent, so `Other` tokens are exempt from the leaf check. Everything
    /// else with a non-container kind must be childless.
    pub fn validate(&self) -> Result<(), TokenError> {
        if !self.kind.is_container() && self.kind != TokenKind::Other && !self.children.is_empty()
        {
            return Err(TokenError::UnexpectedChildren {
                kind: format!("{:?}", self.kind),
                raw: self.raw.clone(),
            });
        }
        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }
}
