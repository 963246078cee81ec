//! Invocation records
//!
//! A [`Recorder`] is the observable call log of a delegate stand-in. It is
//! created per test and handed to the delegate by value; clones share the
//! same log, so the test keeps one handle while the delegate owns another.

use crate::operation::OperationId;
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One recorded call: operation id plus the arguments it received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Operation invoked
    pub operation: OperationId,

    /// Arguments, in parameter order
    pub args: Vec<Value>,
}

impl Invocation {
    /// Create an invocation record
    pub fn new(operation: OperationId, args: Vec<Value>) -> Self {
        Self { operation, args }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.operation.name())?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str("]")
    }
}

/// Shared, per-test invocation log
///
/// # Examples
///
/// ```
/// use tether_domain::{OperationId, Recorder};
///
/// let recorder = Recorder::new();
/// let delegate_side = recorder.clone();
///
/// delegate_side.record(OperationId::new("user_agent", []), vec![]);
/// assert_eq!(recorder.len(), 1);
///
/// recorder.clear();
/// assert!(delegate_side.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl Recorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    fn calls(&self) -> MutexGuard<'_, Vec<Invocation>> {
        // A panicking test thread must not hide the log from the next check
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an invocation
    pub fn record(&self, operation: OperationId, args: Vec<Value>) {
        self.calls().push(Invocation::new(operation, args));
    }

    /// Snapshot of every invocation so far, oldest first
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls().clone()
    }

    /// Invocations of one operation
    pub fn calls_to(&self, operation: &OperationId) -> Vec<Invocation> {
        self.calls()
            .iter()
            .filter(|c| &c.operation == operation)
            .cloned()
            .collect()
    }

    /// Number of invocations recorded
    pub fn len(&self) -> usize {
        self.calls().len()
    }

    /// Returns `true` if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.calls().is_empty()
    }

    /// Forget every recorded invocation
    pub fn clear(&self) {
        self.calls().clear();
    }

    /// Drain the log
    pub fn take(&self) -> Vec<Invocation> {
        std::mem::take(&mut *self.calls())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ParamType;

    fn op(name: &str) -> OperationId {
        OperationId::new(name, [ParamType::I32])
    }

    #[test]
    fn test_record_and_snapshot() {
        let recorder = Recorder::new();
        recorder.record(op("a"), vec![Value::I32(1)]);
        recorder.record(op("b"), vec![Value::I32(2)]);

        let calls = recorder.invocations();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].operation, op("a"));
        assert_eq!(calls[1].args, vec![Value::I32(2)]);
    }

    #[test]
    fn test_clones_share_log() {
        let recorder = Recorder::new();
        let other = recorder.clone();

        other.record(op("a"), vec![Value::I32(1)]);
        assert_eq!(recorder.len(), 1);

        recorder.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn test_calls_to_filters() {
        let recorder = Recorder::new();
        recorder.record(op("a"), vec![Value::I32(1)]);
        recorder.record(op("b"), vec![Value::I32(2)]);
        recorder.record(op("a"), vec![Value::I32(3)]);

        let calls = recorder.calls_to(&op("a"));
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].args, vec![Value::I32(3)]);
    }

    #[test]
    fn test_take_drains() {
        let recorder = Recorder::new();
        recorder.record(op("a"), vec![Value::I32(1)]);
        assert_eq!(recorder.take().len(), 1);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_display() {
        let call = Invocation::new(op("max_size"), vec![Value::I32(42)]);
        assert_eq!(call.to_string(), "max_size[42i32]");
    }
}
