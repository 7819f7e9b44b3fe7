//! Identifier, selector and context identifiers
//!
//! All IDs are file-local: they are assigned by the writer while a container
//! is built and resolved again by the reader through the identifier,
//! selector and context ID tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ID of an interned identifier string. ID 0 is the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentifierId(pub u32);

impl IdentifierId {
    /// The implicit ID of the empty string
    pub const EMPTY: IdentifierId = IdentifierId(0);
}

/// ID of an interned selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectorId(pub u32);

/// ID of an Objective-C class or protocol within one container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextId(pub u32);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Whether a context is an Objective-C class or protocol
///
/// A class and a protocol may share a name; they receive distinct IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextKind {
    /// `@interface`
    Class,
    /// `@protocol`
    Protocol,
}

impl ContextKind {
    /// Whether this is a protocol
    #[inline]
    pub fn is_protocol(self) -> bool {
        self == ContextKind::Protocol
    }
}

/// A selector in its stored form: argument count plus identifier IDs
///
/// `num_args == 0` marks a zero-argument selector such as `count`, which
/// still has one identifier piece.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredSelector {
    /// Number of arguments the selector takes
    pub num_args: u16,
    /// Identifier IDs of the selector pieces
    pub identifiers: Vec<IdentifierId>,
}

/// A selector as named by the caller, one string per piece
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorRef<'a> {
    /// Number of arguments the selector takes
    pub num_args: u32,
    /// Selector pieces, without the `:` separators
    pub pieces: Vec<&'a str>,
}

/// Error splitting a selector string into pieces
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorParseError {
    /// Multi-piece selector without a trailing `:`
    #[error("selector '{0}' is missing a ':' at the end")]
    MissingTrailingColon(String),
    /// Selector with no pieces at all
    #[error("selector is empty")]
    Empty,
}

impl<'a> SelectorRef<'a> {
    /// Create a selector reference from explicit pieces
    pub fn new(num_args: u32, pieces: Vec<&'a str>) -> Self {
        SelectorRef { num_args, pieces }
    }

    /// A zero-argument selector such as `count`
    pub fn nullary(name: &'a str) -> Self {
        SelectorRef {
            num_args: 0,
            pieces: vec![name],
        }
    }

    /// Split textual selector syntax into pieces.
    ///
    /// `foo` has no arguments; `foo:bar:` takes two. Empty pieces are
    /// dropped, so `foo::` is the one-piece selector `foo:` with one argument.
    pub fn parse(selector: &'a str) -> Result<Self, SelectorParseError> {
        let takes_arguments = selector.ends_with(':');
        let pieces: Vec<&str> = selector.split(':').filter(|p| !p.is_empty()).collect();
        if pieces.is_empty() {
            return Err(SelectorParseError::Empty);
        }
        if !takes_arguments && pieces.len() > 1 {
            return Err(SelectorParseError::MissingTrailingColon(
                selector.to_string(),
            ));
        }
        let num_args = if takes_arguments { pieces.len() as u32 } else { 0 };
        Ok(SelectorRef { num_args, pieces })
    }
}

impl fmt::Display for SelectorRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in &self.pieces {
            f.write_str(piece)?;
            if self.num_args > 0 {
                f.write_str(":")?;
            }
        }
        Ok(())
    }
}
