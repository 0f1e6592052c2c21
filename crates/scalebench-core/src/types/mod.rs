//! Shared value types: typed operation arguments and scaling dimensions.

pub mod args;
pub mod dimension;

pub use args::ArgValue;
pub use dimension::{DimensionKind, DimensionPoint, ScalingDimension};
