//! Benchmarkable operations and how input sizes reach their arguments.

use std::fmt;
use std::sync::Arc;

use scalebench_core::types::ArgValue;

use crate::generator::DataGenerator;

/// Error returned by an operation call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct OperationError {
    pub message: String,
}

impl OperationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The callable wrapped by an [`Operation`].
pub type OperationFn = dyn Fn(&[ArgValue]) -> Result<(), OperationError> + Send + Sync;

/// Whether a case is expected to succeed or to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expectation {
    #[default]
    Success,
    Error,
}

impl Expectation {
    /// Whether `outcome` is the one this case was registered for.
    pub fn is_met_by<T, E>(&self, outcome: &Result<T, E>) -> bool {
        match self {
            Self::Success => outcome.is_ok(),
            Self::Error => outcome.is_err(),
        }
    }
}

/// How the input-size dimension value reaches the argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeBinding {
    /// Arguments are used as declared; the size is only recorded.
    #[default]
    Fixed,
    /// The size is written as `ArgValue::UInt` at this argument position.
    Argument(usize),
    /// Arguments are produced by the data generator for each size.
    Generated,
}

/// A named unit of work. Built once, then shared read-only with every
/// execution unit.
#[derive(Clone)]
pub struct Operation {
    name: String,
    callable: Arc<OperationFn>,
    args: Vec<ArgValue>,
    expectation: Expectation,
    size_binding: SizeBinding,
}

impl Operation {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[ArgValue]) -> Result<(), OperationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callable: Arc::new(f),
            args: Vec::new(),
            expectation: Expectation::Success,
            size_binding: SizeBinding::Fixed,
        }
    }

    pub fn with_args(mut self, args: Vec<ArgValue>) -> Self {
        self.args = args;
        self
    }

    /// Register the case as "expect error": a successful call is the fault.
    pub fn expect_error(mut self) -> Self {
        self.expectation = Expectation::Error;
        self
    }

    /// Bind the input size into the argument at `position`.
    pub fn bind_size_at(mut self, position: usize) -> Self {
        self.size_binding = SizeBinding::Argument(position);
        self
    }

    /// Regenerate arguments from the data generator for every size.
    pub fn generated_args(mut self) -> Self {
        self.size_binding = SizeBinding::Generated;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[ArgValue] {
        &self.args
    }

    pub fn expectation(&self) -> Expectation {
        self.expectation
    }

    pub fn size_binding(&self) -> SizeBinding {
        self.size_binding
    }

    pub fn call(&self, args: &[ArgValue]) -> Result<(), OperationError> {
        (self.callable)(args)
    }

    /// Concrete arguments for one dimension point.
    pub fn args_for_size(&self, size: Option<u64>, generator: Option<&dyn DataGenerator>) -> Vec<ArgValue> {
        let Some(size) = size else {
            return self.args.clone();
        };
        match self.size_binding {
            SizeBinding::Fixed => self.args.clone(),
            SizeBinding::Argument(position) => {
                let mut args = self.args.clone();
                if let Some(slot) = args.get_mut(position) {
                    *slot = ArgValue::UInt(size);
                }
                args
            }
            SizeBinding::Generated => match generator {
                Some(g) => g.generate(size),
                None => self.args.clone(),
            },
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("expectation", &self.expectation)
            .field("size_binding", &self.size_binding)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &[ArgValue]) -> Result<(), OperationError> {
        Ok(())
    }

    #[test]
    fn size_is_written_at_declared_position() {
        let op = Operation::new("fill", noop)
            .with_args(vec![ArgValue::from("label"), ArgValue::UInt(0)])
            .bind_size_at(1);
        let args = op.args_for_size(Some(512), None);
        assert_eq!(args[1], ArgValue::UInt(512));
        assert_eq!(args[0], ArgValue::from("label"));
        // Declared arguments are untouched.
        assert_eq!(op.args()[1], ArgValue::UInt(0));
    }

    #[test]
    fn generated_binding_uses_generator() {
        let generator = |size: u64| vec![ArgValue::Bytes(vec![0; size as usize])];
        let op = Operation::new("hash", noop).generated_args();
        let args = op.args_for_size(Some(8), Some(&generator));
        assert_eq!(args[0].len(), Some(8));
    }

    #[test]
    fn expectation_matching() {
        let ok: Result<(), OperationError> = Ok(());
        let err: Result<(), OperationError> = Err(OperationError::new("boom"));
        assert!(Expectation::Success.is_met_by(&ok));
        assert!(!Expectation::Success.is_met_by(&err));
        assert!(Expectation::Error.is_met_by(&err));
        assert!(!Expectation::Error.is_met_by(&ok));
    }
}
