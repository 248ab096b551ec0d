//! Request and result types for a single spin.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SpinRequest
// ---------------------------------------------------------------------------

/// Immutable snapshot of the participant list taken when a spin starts.
///
/// The engine only ever reads this copy. If the roster changes while the
/// wheel is turning, the running spin still sees the names it started with,
/// and indices stay stable for the whole lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpinRequest {
    participants: Vec<String>,
}

impl SpinRequest {
    /// Snapshots the given names in order.
    pub fn new<I, S>(participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            participants: participants.into_iter().map(Into::into).collect(),
        }
    }

    /// The names, in roster order.
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// Number of participants (segments on the wheel).
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// The name at `index`, if any.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.participants.get(index).map(String::as_str)
    }

    /// Every repeated name, paired with the index of its first occurrence.
    ///
    /// Duplicates are a caller error but not a hard failure: the wheel still
    /// spins, and each entry keeps its own segment.
    pub fn duplicates(&self) -> Vec<DuplicateName> {
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        let mut out = Vec::new();
        for (index, name) in self.participants.iter().enumerate() {
            match first_seen.get(name.as_str()) {
                Some(&first) => out.push(DuplicateName {
                    name: name.clone(),
                    first,
                    second: index,
                }),
                None => {
                    first_seen.insert(name, index);
                }
            }
        }
        out
    }
}

impl<S: Into<String>> FromIterator<S> for SpinRequest {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// A name that appears more than once in a [`SpinRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateName {
    pub name: String,
    /// Index of the first occurrence.
    pub first: usize,
    /// Index of this later occurrence.
    pub second: usize,
}

impl fmt::Display for DuplicateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} appears at positions {} and {}",
            self.name, self.first, self.second
        )
    }
}

// ---------------------------------------------------------------------------
// SelectionResult
// ---------------------------------------------------------------------------

/// The outcome of one spin. Computed once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Position of the winner in the [`SpinRequest`].
    pub winner_index: usize,
    /// The winner's name, copied out of the request.
    pub winner_name: String,
    /// Absolute wheel rotation in degrees the renderer should animate to.
    pub final_rotation: f64,
}
