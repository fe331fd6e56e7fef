//! Train and predict procedures and the context they run with.

use std::fmt;
use std::sync::Arc;

use crate::dataset::Dataset;
use crate::error::{MungeError, Result};

use super::args::PieceArgs;
use super::value::{LearnedState, Value};

/// Which procedure of a piece is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// First run: parameters are learned from the data.
    Train,
    /// Every later run: previously learned parameters are reused.
    Predict,
}

enum StateAccess<'a> {
    Writable(&'a mut LearnedState),
    Frozen(&'a LearnedState),
}

/// Everything a procedure sees besides the dataset.
///
/// In train mode [`Invocation::learn`] records parameters on the piece; in
/// predict mode the learned state is read-only and `learn` fails with
/// [`MungeError::StateFrozen`].
pub struct Invocation<'a> {
    mode: Mode,
    args: &'a PieceArgs,
    state: StateAccess<'a>,
    scope: Option<String>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn train(args: &'a PieceArgs, state: &'a mut LearnedState) -> Self {
        Self {
            mode: Mode::Train,
            args,
            state: StateAccess::Writable(state),
            scope: None,
        }
    }

    pub(crate) fn predict(args: &'a PieceArgs, state: &'a LearnedState) -> Self {
        Self {
            mode: Mode::Predict,
            args,
            state: StateAccess::Frozen(state),
            scope: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_training(&self) -> bool {
        self.mode == Mode::Train
    }

    /// Arguments for the current mode.
    pub fn args(&self) -> &'a PieceArgs {
        self.args
    }

    /// Current key namespace, if this invocation was scoped.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Record a learned parameter.
    pub fn learn(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let key = self.qualify(key);
        match &mut self.state {
            StateAccess::Writable(state) => {
                state.insert(key, value.into());
                Ok(())
            }
            StateAccess::Frozen(_) => Err(MungeError::StateFrozen(key)),
        }
    }

    /// Read a learned parameter.
    pub fn learned(&self, key: &str) -> Result<&Value> {
        let key = self.qualify(key);
        let state: &LearnedState = match &self.state {
            StateAccess::Writable(state) => &**state,
            StateAccess::Frozen(state) => *state,
        };
        state.get(&key).ok_or(MungeError::MissingState(key))
    }

    /// Read a learned numeric parameter.
    pub fn learned_f64(&self, key: &str) -> Result<f64> {
        self.learned(key)?.as_f64().ok_or_else(|| {
            MungeError::Procedure(format!("learned value '{}' is not numeric", self.qualify(key)))
        })
    }

    /// Borrow this invocation with keys namespaced under `scope`.
    ///
    /// Scopes nest: scoping an already scoped invocation joins both with `/`.
    pub fn scoped(&mut self, scope: &str) -> Invocation<'_> {
        let scope = self.qualify(scope);
        let state = match &mut self.state {
            StateAccess::Writable(state) => StateAccess::Writable(&mut **state),
            StateAccess::Frozen(state) => StateAccess::Frozen(*state),
        };
        Invocation {
            mode: self.mode,
            args: self.args,
            state,
            scope: Some(scope),
        }
    }

    fn qualify(&self, key: &str) -> String {
        match &self.scope {
            Some(scope) => format!("{}/{}", scope, key),
            None => key.to_string(),
        }
    }
}

type ProcedureFn = dyn Fn(&mut Dataset, &mut Invocation<'_>) -> Result<()> + Send + Sync;

/// A shareable train or predict procedure.
///
/// Procedures mutate the dataset in place. Any memoisation a procedure needs
/// belongs in the learned state it receives, never in caller-visible state.
#[derive(Clone)]
pub struct Procedure(Arc<ProcedureFn>);

impl Procedure {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Dataset, &mut Invocation<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, data: &mut Dataset, invocation: &mut Invocation<'_>) -> Result<()> {
        (self.0)(data, invocation)
    }

    /// Whether both handles point at the same closure.
    pub fn ptr_eq(a: &Procedure, b: &Procedure) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Procedure(..)")
    }
}
