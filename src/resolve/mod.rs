//! Conflict resolution
//!
//! [`ConflictResolver`] walks the differences of one comparison in order and
//! asks a [`DecisionSource`] which side to keep for each. Sources range from
//! an interactive terminal prompt to a pre-supplied list or a channel served
//! by an async front end; the resolver itself holds no state.

pub mod channel;
pub mod sources;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diff::Difference;
use crate::error::{MergeError, Result};
use crate::merge::Side;

pub use channel::{channel, ChannelSource, DecisionChannel, DecisionRequest};
pub use sources::{CallbackSource, FixedSource, PromptSource, ScriptedSource};

/// Which side of a difference to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    KeepLeft,
    KeepRight,
}

impl Resolution {
    /// The content this resolution selects from `difference`.
    pub fn pick<'a>(&self, difference: &'a Difference) -> &'a str {
        match self {
            Self::KeepLeft => difference.left(),
            Self::KeepRight => difference.right(),
        }
    }
}

impl From<Side> for Resolution {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => Self::KeepLeft,
            Side::Right => Self::KeepRight,
        }
    }
}

impl FromStr for Resolution {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "l" | "left" | "keep_left" => Ok(Self::KeepLeft),
            "2" | "r" | "right" | "keep_right" => Ok(Self::KeepRight),
            _ => Err(MergeError::InvalidResolution {
                value: s.trim().to_string(),
            }),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepLeft => write!(f, "keep_left"),
            Self::KeepRight => write!(f, "keep_right"),
        }
    }
}

/// Provides one [`Resolution`] per difference, on demand.
///
/// Interactive implementations re-ask on invalid input and only return once
/// they have a valid choice; a closed source returns
/// [`MergeError::Cancelled`].
pub trait DecisionSource {
    fn decide(&mut self, difference: &Difference) -> Result<Resolution>;

    /// Decisions supplied up front but not yet consumed, for sources that
    /// hold a fixed list. `None` for sources that answer on demand.
    fn remaining(&self) -> Option<usize> {
        None
    }
}

impl<D: DecisionSource + ?Sized> DecisionSource for &mut D {
    fn decide(&mut self, difference: &Difference) -> Result<Resolution> {
        (**self).decide(difference)
    }

    fn remaining(&self) -> Option<usize> {
        (**self).remaining()
    }
}

impl<D: DecisionSource + ?Sized> DecisionSource for Box<D> {
    fn decide(&mut self, difference: &Difference) -> Result<Resolution> {
        (**self).decide(difference)
    }

    fn remaining(&self) -> Option<usize> {
        (**self).remaining()
    }
}

/// Resolved content for one line of the merged output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLine {
    pub line_number: usize,
    pub content: String,
}

impl ResolvedLine {
    pub fn new(line_number: usize, content: impl Into<String>) -> Self {
        Self {
            line_number,
            content: content.into(),
        }
    }
}

/// Obtains a decision for each difference, strictly in order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConflictResolver;

impl ConflictResolver {
    pub fn new() -> Self {
        Self
    }

    /// Ask `decisions` about each difference in turn. Differences must be
    /// strictly increasing by line number. The first error aborts the pass.
    pub fn resolve<D: DecisionSource + ?Sized>(
        &self,
        differences: &[Difference],
        decisions: &mut D,
    ) -> Result<Vec<ResolvedLine>> {
        let mut resolved = Vec::with_capacity(differences.len());
        let mut previous = 0;

        for difference in differences {
            let line_number = difference.line_number();
            if line_number <= previous {
                return Err(MergeError::UnorderedResolutions {
                    line_number,
                    span: previous,
                });
            }
            previous = line_number;

            let resolution = decisions.decide(difference)?;
            tracing::debug!("Line {}: {}", line_number, resolution);
            resolved.push(ResolvedLine::new(line_number, resolution.pick(difference)));
        }

        if let Some(unused) = decisions.remaining().filter(|&n| n > 0) {
            tracing::warn!(
                "{} supplied decisions were not used: only {} differences",
                unused,
                differences.len()
            );
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diffs() -> Vec<Difference> {
        vec![
            Difference::new(2, "b", "x").unwrap(),
            Difference::new(4, "", "d").unwrap(),
        ]
    }

    #[test]
    fn test_resolution_parsing() {
        assert_eq!("1".parse::<Resolution>().unwrap(), Resolution::KeepLeft);
        assert_eq!(" Right ".parse::<Resolution>().unwrap(), Resolution::KeepRight);
        assert_eq!("keep_left".parse::<Resolution>().unwrap(), Resolution::KeepLeft);

        let err = "3".parse::<Resolution>().unwrap_err();
        assert!(matches!(err, MergeError::InvalidResolution { ref value } if value == "3"));
    }

    #[test]
    fn test_resolve_in_order() {
        let mut seen = Vec::new();
        let mut source = CallbackSource::new(|diff: &Difference| {
            seen.push(diff.line_number());
            Ok(if diff.line_number() == 2 {
                Resolution::KeepRight
            } else {
                Resolution::KeepLeft
            })
        });

        let resolved = ConflictResolver::new().resolve(&diffs(), &mut source).unwrap();
        drop(source);

        assert_eq!(seen, vec![2, 4]);
        assert_eq!(
            resolved,
            vec![ResolvedLine::new(2, "x"), ResolvedLine::new(4, "")]
        );
    }

    #[test]
    fn test_empty_differences_never_ask() {
        let mut calls = 0;
        let mut source = CallbackSource::new(|_: &Difference| {
            calls += 1;
            Ok(Resolution::KeepLeft)
        });

        let resolved = ConflictResolver::new().resolve(&[], &mut source).unwrap();
        drop(source);

        assert!(resolved.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_unordered_differences_rejected() {
        let mut reversed = diffs();
        reversed.reverse();
        let mut source = FixedSource::new(Resolution::KeepLeft);

        let err = ConflictResolver::new()
            .resolve(&reversed, &mut source)
            .unwrap_err();
        assert!(matches!(err, MergeError::UnorderedResolutions { line_number: 2, .. }));
    }

    #[test]
    fn test_leftover_decisions_are_reported() {
        let mut source = ScriptedSource::parse("2,1,1,2").unwrap();

        let resolved = ConflictResolver::new().resolve(&diffs(), &mut source).unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(DecisionSource::remaining(&source), Some(2));
        assert_eq!(DecisionSource::remaining(&FixedSource::new(Resolution::KeepLeft)), None);
    }

    #[test]
    fn test_source_error_aborts() {
        let mut source = ScriptedSource::new(vec![Resolution::KeepLeft]);
        let err = ConflictResolver::new().resolve(&diffs(), &mut source).unwrap_err();
        assert!(matches!(err, MergeError::DecisionsExhausted { line_number: 4, supplied: 1 }));
    }
}
