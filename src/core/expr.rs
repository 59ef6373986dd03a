//! Evaluated string values.
//!
//! Evaluation replaces variable references with their values, but a
//! reference to a user *setting* survives as a placeholder: the decision
//! belongs to build time, so backends render it in their native variable
//! syntax instead of substituting the default.

use std::fmt;

use crate::util::interning::Symbol;

/// One piece of an [`EvalString`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Literal text.
    Lit(String),
    /// A late-bound reference to a user setting.
    Setting(Symbol),
}

/// A fully evaluated string, possibly containing setting placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvalString {
    pieces: Vec<Piece>,
}

impl EvalString {
    /// A literal string with no placeholders.
    pub fn lit(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return EvalString::default();
        }
        EvalString {
            pieces: vec![Piece::Lit(text)],
        }
    }

    /// A single setting placeholder.
    pub fn setting(name: Symbol) -> Self {
        EvalString {
            pieces: vec![Piece::Setting(name)],
        }
    }

    /// Append a piece, merging adjacent literals.
    pub fn push(&mut self, piece: Piece) {
        match (self.pieces.last_mut(), &piece) {
            (Some(Piece::Lit(prev)), Piece::Lit(next)) => prev.push_str(next),
            _ => self.pieces.push(piece),
        }
    }

    /// Append all pieces of another value.
    pub fn extend(&mut self, other: &EvalString) {
        for piece in &other.pieces {
            self.push(piece.clone());
        }
    }

    /// The pieces of this value.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// True when no placeholder remains.
    pub fn is_literal(&self) -> bool {
        self.pieces
            .iter()
            .all(|piece| matches!(piece, Piece::Lit(_)))
    }

    /// The literal text, when no placeholder remains.
    pub fn as_literal(&self) -> Option<&str> {
        match self.pieces.as_slice() {
            [] => Some(""),
            [Piece::Lit(text)] => Some(text),
            _ => None,
        }
    }

    /// Settings referenced by this value.
    pub fn settings(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Setting(name) => Some(*name),
            Piece::Lit(_) => None,
        })
    }

    /// True when the value is the empty string.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Render with `$(NAME)` placeholder syntax.
    ///
    /// Both GNU make and MSBuild spell variable references this way, so
    /// the two backends share this renderer.
    pub fn render_dollar(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Lit(text) => out.push_str(text),
                Piece::Setting(name) => {
                    out.push_str("$(");
                    out.push_str(name.as_str());
                    out.push(')');
                }
            }
        }
        out
    }
}

impl fmt::Display for EvalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_dollar())
    }
}

impl From<&str> for EvalString {
    fn from(text: &str) -> Self {
        EvalString::lit(text)
    }
}
