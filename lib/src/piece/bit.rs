//! The train/predict state machine behind every piece.

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::dataset::Dataset;
use crate::error::Result;

use super::args::PieceArgs;
use super::procedure::{Invocation, Mode, Procedure};
use super::value::LearnedState;

#[derive(Debug, Default)]
struct BitState {
    trained: bool,
    learned: LearnedState,
}

/// A pair of procedures plus the state that decides which one runs.
///
/// The first [`MungeBit::run`] calls the train procedure, stores whatever it
/// learned and marks the bit trained. Every later run calls the predict
/// procedure against the stored state without re-learning it. The flag and the
/// learned state are the only mutable parts and live behind a lock, so a
/// trained bit can be shared and replayed from several threads at once.
pub struct MungeBit {
    train: Procedure,
    predict: Procedure,
    enforce_train: bool,
    state: RwLock<BitState>,
}

impl MungeBit {
    pub fn new(train: Procedure, predict: Procedure) -> Self {
        Self {
            train,
            predict,
            enforce_train: true,
            state: RwLock::new(BitState::default()),
        }
    }

    /// When `false`, the bit never becomes trained and runs its train
    /// procedure every time. Useful for stateless steps.
    pub fn enforce_train(mut self, enforce: bool) -> Self {
        self.enforce_train = enforce;
        self
    }

    pub fn is_trained(&self) -> bool {
        self.read_state().trained
    }

    /// Snapshot of the learned parameters.
    pub fn learned(&self) -> LearnedState {
        self.read_state().learned.clone()
    }

    pub fn train_procedure(&self) -> &Procedure {
        &self.train
    }

    pub fn predict_procedure(&self) -> &Procedure {
        &self.predict
    }

    /// Run the procedure that matches the current state and report which one ran.
    ///
    /// A failing train procedure leaves the bit untrained and its previous
    /// state untouched.
    ///
    /// # Locking
    /// The train procedure runs while this bit's write lock is held, so
    /// concurrent first runs train exactly once. A procedure must therefore
    /// not call back into its own bit or piece (`is_trained`, `learned`,
    /// `run`, or an `apply_pipeline` that includes it): that deadlocks. It
    /// reads and writes its own state through the [`Invocation`] instead.
    /// Other bits may be queried freely.
    pub fn run(
        &self,
        data: &mut Dataset,
        train_args: &PieceArgs,
        predict_args: &PieceArgs,
    ) -> Result<Mode> {
        {
            let state = self.read_state();
            if state.trained {
                let mut invocation = Invocation::predict(predict_args, &state.learned);
                self.predict.call(data, &mut invocation)?;
                return Ok(Mode::Predict);
            }
        }

        let mut state = self.write_state();
        // Another caller may have finished training while we waited.
        if state.trained {
            let mut invocation = Invocation::predict(predict_args, &state.learned);
            self.predict.call(data, &mut invocation)?;
            return Ok(Mode::Predict);
        }

        let mut learned = LearnedState::new();
        let mut invocation = Invocation::train(train_args, &mut learned);
        self.train.call(data, &mut invocation)?;

        state.learned = learned;
        if self.enforce_train {
            state.trained = true;
        }
        Ok(Mode::Train)
    }

    /// Overwrite the state, e.g. with parameters persisted from an earlier run.
    pub(crate) fn restore(&self, trained: bool, learned: LearnedState) {
        let mut state = self.write_state();
        state.trained = trained;
        state.learned = learned;
    }

    fn read_state(&self) -> RwLockReadGuard<'_, BitState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, BitState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for MungeBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("MungeBit")
            .field("trained", &state.trained)
            .field("enforce_train", &self.enforce_train)
            .field("learned", &state.learned)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MungeError;
    use std::sync::Arc;

    fn scale(factor: f64) -> Procedure {
        Procedure::new(move |data, _inv| {
            for v in data.float_column_mut("X")? {
                *v *= factor;
            }
            Ok(())
        })
    }

    fn sample() -> Dataset {
        Dataset::new().with_column("X", vec![1.0, 2.0, 3.0]).unwrap()
    }

    #[test]
    fn test_first_run_trains_then_predicts() {
        let bit = MungeBit::new(scale(2.0), scale(3.0));
        let args = PieceArgs::new();
        assert!(!bit.is_trained());

        let mut first = sample();
        assert_eq!(bit.run(&mut first, &args, &args).unwrap(), Mode::Train);
        assert_eq!(first.float_column("X").unwrap(), &[2.0, 4.0, 6.0]);
        assert!(bit.is_trained());

        let mut second = sample();
        assert_eq!(bit.run(&mut second, &args, &args).unwrap(), Mode::Predict);
        assert_eq!(second.float_column("X").unwrap(), &[3.0, 6.0, 9.0]);
    }

    #[test]
    fn test_failed_training_stays_untrained() {
        let failing = Procedure::new(|_data, inv| {
            inv.learn("partial", 1.0)?;
            Err(MungeError::Procedure("boom".to_string()))
        });
        let bit = MungeBit::new(failing, scale(1.0));
        let args = PieceArgs::new();

        assert!(bit.run(&mut sample(), &args, &args).is_err());
        assert!(!bit.is_trained());
        assert!(bit.learned().is_empty());
    }

    #[test]
    fn test_predict_reads_learned_state() {
        let train = Procedure::new(|data, inv| {
            let max = data
                .float_column("X")?
                .iter()
                .cloned()
                .fold(f64::MIN, f64::max);
            inv.learn("max", max)?;
            Ok(())
        });
        let predict = Procedure::new(|data, inv| {
            let max = inv.learned_f64("max")?;
            for v in data.float_column_mut("X")? {
                *v /= max;
            }
            Ok(())
        });
        let bit = MungeBit::new(train, predict);
        let args = PieceArgs::new();

        bit.run(&mut sample(), &args, &args).unwrap();
        let mut replay = Dataset::new().with_column("X", vec![1.5, 6.0]).unwrap();
        bit.run(&mut replay, &args, &args).unwrap();

        assert_eq!(replay.float_column("X").unwrap(), &[0.5, 2.0]);
        assert_eq!(bit.learned().len(), 1);
    }

    #[test]
    fn test_not_enforced_always_trains() {
        let bit = MungeBit::new(scale(2.0), scale(3.0)).enforce_train(false);
        let args = PieceArgs::new();

        let mut data = sample();
        bit.run(&mut data, &args, &args).unwrap();
        assert_eq!(bit.run(&mut data, &args, &args).unwrap(), Mode::Train);
        assert!(!bit.is_trained());
        assert_eq!(data.float_column("X").unwrap(), &[4.0, 8.0, 12.0]);
    }

    #[test]
    fn test_concurrent_replay_of_trained_bit() {
        let bit = Arc::new(MungeBit::new(scale(2.0), scale(3.0)));
        let args = PieceArgs::new();
        bit.run(&mut sample(), &args, &args).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let bit = Arc::clone(&bit);
                std::thread::spawn(move || {
                    let args = PieceArgs::new();
                    let mut data = sample();
                    bit.run(&mut data, &args, &args).unwrap();
                    let out = data.float_column("X").unwrap().to_vec();
                    out
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec![3.0, 6.0, 9.0]);
        }
    }

    #[test]
    fn test_train_may_query_other_bits() {
        let reference = Arc::new(MungeBit::new(scale(2.0), scale(2.0)));
        let args = PieceArgs::new();
        reference.run(&mut sample(), &args, &args).unwrap();

        let other = Arc::clone(&reference);
        let train = Procedure::new(move |_data, inv| {
            inv.learn("reference_trained", other.is_trained())?;
            inv.learn("reference_keys", other.learned().len() as i64)?;
            let own = inv.learned("reference_trained")?.as_bool();
            inv.learn("own_state_visible", own == Some(true))
        });
        let bit = MungeBit::new(train, scale(1.0));
        bit.run(&mut sample(), &args, &args).unwrap();

        let learned = bit.learned();
        assert_eq!(learned.get("reference_trained").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(learned.get("reference_keys").and_then(|v| v.as_i64()), Some(0));
        assert_eq!(learned.get("own_state_visible").and_then(|v| v.as_bool()), Some(true));
    }
}
