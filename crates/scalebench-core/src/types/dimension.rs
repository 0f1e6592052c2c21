//! Scaling dimensions and the dimension-value tuples samples are keyed by.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Axis of variation swept during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DimensionKind {
    /// Size of the generated or bound input.
    InputSize,
    /// Number of execution units invoking the operation at once.
    Concurrency,
}

impl DimensionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputSize => "InputSize",
            Self::Concurrency => "Concurrency",
        }
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named axis with the ordered values to sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingDimension {
    pub kind: DimensionKind,
    pub values: Vec<u64>,
}

impl ScalingDimension {
    pub fn new(kind: DimensionKind, values: impl Into<Vec<u64>>) -> Self {
        Self {
            kind,
            values: values.into(),
        }
    }

    pub fn input_size(values: impl Into<Vec<u64>>) -> Self {
        Self::new(DimensionKind::InputSize, values)
    }

    pub fn concurrency(values: impl Into<Vec<u64>>) -> Self {
        Self::new(DimensionKind::Concurrency, values)
    }

    /// First adjacent pair where the values decrease, as `(previous, next)`.
    pub fn first_decrease(&self) -> Option<(u64, u64)> {
        self.values.windows(2).find(|w| w[0] > w[1]).map(|w| (w[0], w[1]))
    }

    /// First declared value; the base value other sweeps hold this axis at.
    pub fn base_value(&self) -> Option<u64> {
        self.values.first().copied()
    }
}

/// The dimension values active while a sample was measured.
///
/// Entries are kept sorted by [`DimensionKind`] so two points built in a
/// different insertion order still compare and hash equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DimensionPoint(SmallVec<[(DimensionKind, u64); 2]>);

impl DimensionPoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `kind` to `value`, replacing an existing entry for the same axis.
    pub fn with(mut self, kind: DimensionKind, value: u64) -> Self {
        self.set(kind, value);
        self
    }

    pub fn set(&mut self, kind: DimensionKind, value: u64) {
        match self.0.binary_search_by_key(&kind, |(k, _)| *k) {
            Ok(idx) => self.0[idx].1 = value,
            Err(idx) => self.0.insert(idx, (kind, value)),
        }
    }

    pub fn get(&self, kind: DimensionKind) -> Option<u64> {
        self.0
            .binary_search_by_key(&kind, |(k, _)| *k)
            .ok()
            .map(|idx| self.0[idx].1)
    }

    pub fn input_size(&self) -> Option<u64> {
        self.get(DimensionKind::InputSize)
    }

    /// Concurrency level, 1 when the point has no concurrency axis.
    pub fn concurrency(&self) -> u64 {
        self.get(DimensionKind::Concurrency).unwrap_or(1)
    }

    /// This point with the input-size axis removed.
    pub fn without_input_size(&self) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(k, _)| *k != DimensionKind::InputSize)
                .copied()
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (DimensionKind, u64)> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DimensionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("-");
        }
        for (i, (kind, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", kind, value)?;
        }
        Ok(())
    }
}
