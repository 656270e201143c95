//! Hierarchical task identifiers.
//!
//! A task id is a dotted path: `root.<n>` for a root task and
//! `<parent>.<m>` for each level below it. Every sequence number is a
//! positive integer, so `root.3.1` is the first child of the third root
//! task. The id doubles as the task's key in its parent's map, which makes
//! ancestry recoverable from the id alone.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Leading segment shared by every task id.
pub const ROOT_PREFIX: &str = "root";

/// A parsed, canonical task id.
///
/// Parsing normalizes sequence numbers (`root.01` becomes `root.1`), so two
/// ids compare equal exactly when their rendered forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    seqs: Vec<u32>,
}

/// Error returned when a string is not a well-formed task id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseTaskIdError {
    #[error("task id is empty")]
    Empty,

    #[error("task id '{0}' must start with 'root.'")]
    MissingRootPrefix(String),

    #[error("task id '{0}' has no sequence number after 'root'")]
    MissingSequence(String),

    #[error("task id '{id}' has invalid segment '{segment}': expected a positive integer")]
    InvalidSegment { id: String, segment: String },
}

impl TaskId {
    /// Id of the root task with sequence number `seq`.
    #[must_use]
    pub fn root(seq: u32) -> Self {
        Self { seqs: vec![seq] }
    }

    /// Id of this task's child with sequence number `seq`.
    #[must_use]
    pub fn child(&self, seq: u32) -> Self {
        let mut seqs = self.seqs.clone();
        seqs.push(seq);
        Self { seqs }
    }

    /// Parse a dotted id such as `root.2.1`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseTaskIdError`] if the prefix is not `root`, there is no
    /// sequence number, or any segment is not a positive integer.
    pub fn parse(input: &str) -> Result<Self, ParseTaskIdError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseTaskIdError::Empty);
        }

        let mut segments = trimmed.split('.');
        if segments.next() != Some(ROOT_PREFIX) {
            return Err(ParseTaskIdError::MissingRootPrefix(trimmed.to_string()));
        }

        let seqs = segments
            .map(|segment| match segment.parse::<u32>() {
                Ok(seq) if seq > 0 => Ok(seq),
                _ => Err(ParseTaskIdError::InvalidSegment {
                    id: trimmed.to_string(),
                    segment: segment.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if seqs.is_empty() {
            return Err(ParseTaskIdError::MissingSequence(trimmed.to_string()));
        }

        Ok(Self { seqs })
    }

    /// Number of levels below the project: 1 for a root task.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.seqs.len()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.seqs.len() == 1
    }

    /// Sequence number of the last segment.
    #[must_use]
    pub fn seq(&self) -> u32 {
        self.seqs.last().copied().unwrap_or_default()
    }

    /// Id of the parent task, or `None` for a root task.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            seqs: self.seqs[..self.seqs.len() - 1].to_vec(),
        })
    }

    /// Every id on the path from the root task down to (and including) this one.
    #[must_use]
    pub fn lineage(&self) -> Vec<Self> {
        (1..=self.seqs.len())
            .map(|len| Self {
                seqs: self.seqs[..len].to_vec(),
            })
            .collect()
    }

    /// True when `self` sits exactly one level below `parent`.
    #[must_use]
    pub fn is_child_of(&self, parent: &Self) -> bool {
        self.seqs.len() == parent.seqs.len() + 1 && self.seqs.starts_with(&parent.seqs)
    }

    /// Id without the `root.` prefix, as shown next to task names (`3.1`).
    #[must_use]
    pub fn display_number(&self) -> String {
        self.seqs
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ROOT_PREFIX}.{}", self.display_number())
    }
}

impl FromStr for TaskId {
    type Err = ParseTaskIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
