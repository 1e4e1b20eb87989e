//! Composable call instrumentation
//!
//! An [`Operation`] is a named unit of work against a store. Wrappers add
//! cross-cutting behavior around any operation without touching it:
//!
//! - [`Counted`] increments the counter stored under the operation name
//! - [`Recorded`] appends the rendered arguments to `{name}:inputs` and the
//!   rendered result to `{name}:outputs`
//!
//! Wrappers are chosen when the operation is built, e.g.
//! `StoreValue.counted().recorded()`.

use std::fmt::Display;

use echostore::KvStore;
use tracing::debug;

use crate::error::Result;
use crate::value::CallArgs;

/// A named call against a store
pub trait Operation {
    /// Argument type
    type Input;
    /// Result type
    type Output;

    /// Qualified operation name, also used as its counter key
    fn name(&self) -> &str;

    /// Run the operation
    fn call(&self, store: &dyn KvStore, input: Self::Input) -> Result<Self::Output>;
}

/// Key of the list holding an operation's rendered arguments
pub fn inputs_key(name: &str) -> String {
    format!("{}:inputs", name)
}

/// Key of the list holding an operation's rendered results
pub fn outputs_key(name: &str) -> String {
    format!("{}:outputs", name)
}

/// Counts every call of the wrapped operation
#[derive(Debug, Clone)]
pub struct Counted<O> {
    inner: O,
}

impl<O: Operation> Operation for Counted<O> {
    type Input = O::Input;
    type Output = O::Output;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn call(&self, store: &dyn KvStore, input: Self::Input) -> Result<Self::Output> {
        let calls = store.incr(self.name())?;
        debug!(operation = self.name(), calls, "counted call");
        self.inner.call(store, input)
    }
}

/// Records arguments and result of every successful call
///
/// Both entries go into the store in one atomic append once the call has
/// returned, so the input and output lists always have the same length. A
/// failed call leaves no history.
#[derive(Debug, Clone)]
pub struct Recorded<O> {
    inner: O,
    inputs: String,
    outputs: String,
}

impl<O: Operation> Recorded<O> {
    fn new(inner: O) -> Self {
        let inputs = inputs_key(inner.name());
        let outputs = outputs_key(inner.name());
        Self {
            inner,
            inputs,
            outputs,
        }
    }
}

impl<O> Operation for Recorded<O>
where
    O: Operation,
    O::Input: CallArgs,
    O::Output: Display,
{
    type Input = O::Input;
    type Output = O::Output;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn call(&self, store: &dyn KvStore, input: Self::Input) -> Result<Self::Output> {
        let args = input.render_args();
        let output = self.inner.call(store, input)?;
        let rendered = output.to_string();

        store.rpush_pair(
            &self.inputs,
            args.as_bytes(),
            &self.outputs,
            rendered.as_bytes(),
        )?;
        debug!(operation = self.name(), args = %args, output = %rendered, "recorded call");

        Ok(output)
    }
}

/// Builder methods for layering wrappers onto an operation
pub trait OperationExt: Operation + Sized {
    /// Count calls under the operation name
    fn counted(self) -> Counted<Self> {
        Counted { inner: self }
    }

    /// Record argument/result history
    fn recorded(self) -> Recorded<Self> {
        Recorded::new(self)
    }
}

impl<O: Operation> OperationExt for O {}
