//! Strictly sequential execution of a piece sequence.

use crate::config::PipelineConfig;
use crate::dataset::DatasetHandle;
use crate::error::Result;
use crate::piece::PieceRef;

/// Run every piece against the handle, in index order, on the calling thread.
///
/// Later pieces may read columns produced by earlier ones, so order is part of
/// correctness. The first failure is returned as is and the remaining pieces
/// do not run. Each named piece is announced before it runs when
/// `config.announce_progress` is set.
pub fn execute(
    handle: &mut DatasetHandle,
    pieces: &[PieceRef],
    config: &PipelineConfig,
) -> Result<()> {
    for (idx, piece) in pieces.iter().enumerate() {
        if let (true, Some(name)) = (config.announce_progress, piece.name()) {
            log::log!(config.progress_level, "Running {}", name);
        }
        let mode = piece.run(handle)?;
        log::debug!("step {}/{} ran in {:?} mode", idx + 1, pieces.len(), mode);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::error::MungeError;
    use crate::piece::{MungePiece, Procedure};
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::{Arc, Mutex, Once};
    use std::thread::{self, ThreadId};

    /// Records every log line together with the thread that emitted it, so
    /// tests running in parallel only look at their own records.
    struct CaptureLogger {
        records: Mutex<Vec<(ThreadId, Level, String)>>,
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            let entry = (thread::current().id(), record.level(), record.args().to_string());
            self.records.lock().unwrap().push(entry);
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger {
        records: Mutex::new(Vec::new()),
    };
    static INIT: Once = Once::new();

    fn capture_logs() {
        INIT.call_once(|| {
            log::set_logger(&LOGGER).unwrap();
            log::set_max_level(LevelFilter::Trace);
        });
        let me = thread::current().id();
        LOGGER.records.lock().unwrap().retain(|(id, _, _)| *id != me);
    }

    /// Progress notices emitted on the current thread.
    fn notices() -> Vec<(Level, String)> {
        let me = thread::current().id();
        LOGGER
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _, msg)| *id == me && msg.starts_with("Running "))
            .map(|(_, level, msg)| (*level, msg.clone()))
            .collect()
    }

    fn noop() -> MungePiece {
        MungePiece::from_procedure(Procedure::new(|_data, _inv| Ok(())))
    }

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> PieceRef {
        let log = Arc::clone(log);
        MungePiece::from_procedure(Procedure::new(move |_data, _inv| {
            log.lock().unwrap().push(tag);
            Ok(())
        }))
        .into_ref()
    }

    #[test]
    fn test_runs_in_index_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pieces = vec![recorder(&log, "a"), recorder(&log, "b"), recorder(&log, "c")];
        let mut handle = DatasetHandle::wrap(Dataset::new());

        execute(&mut handle, &pieces, &PipelineConfig::default()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_later_piece_sees_earlier_output() {
        let produce = MungePiece::from_procedure(Procedure::new(|data, _inv| {
            data.insert_column("Y", vec![1.0, 2.0])
        }))
        .into_ref();
        let consume = MungePiece::from_procedure(Procedure::new(|data, _inv| {
            let doubled: Vec<f64> = data.float_column("Y")?.iter().map(|v| v * 2.0).collect();
            data.insert_column("Z", doubled)
        }))
        .into_ref();

        let mut handle = DatasetHandle::wrap(Dataset::new());
        execute(&mut handle, &[produce, consume], &PipelineConfig::default()).unwrap();
        assert_eq!(handle.float_column("Z").unwrap(), &[2.0, 4.0]);
    }

    #[test]
    fn test_failure_stops_remaining_pieces() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let failing = MungePiece::from_procedure(Procedure::new(|_data, _inv| {
            Err(MungeError::Procedure("boom".to_string()))
        }))
        .into_ref();
        let pieces = vec![recorder(&log, "a"), failing, recorder(&log, "c")];
        let mut handle = DatasetHandle::wrap(Dataset::new());

        let err = execute(&mut handle, &pieces, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, MungeError::Procedure(msg) if msg == "boom"));
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }

    #[test]
    fn test_named_piece_is_announced_once_at_configured_level() {
        capture_logs();
        let pieces = vec![noop().with_name("scale").into_ref(), noop().into_ref()];
        let mut handle = DatasetHandle::wrap(Dataset::new());

        execute(&mut handle, &pieces, &PipelineConfig::default()).unwrap();
        assert_eq!(notices(), vec![(Level::Info, "Running scale".to_string())]);
    }

    #[test]
    fn test_progress_level_is_configurable() {
        capture_logs();
        let pieces = vec![noop().with_name("impute").into_ref()];
        let config = PipelineConfig::default().with_progress_level(Level::Debug);
        let mut handle = DatasetHandle::wrap(Dataset::new());

        execute(&mut handle, &pieces, &config).unwrap();
        assert_eq!(notices(), vec![(Level::Debug, "Running impute".to_string())]);
    }

    #[test]
    fn test_unnamed_or_silenced_pieces_are_not_announced() {
        capture_logs();
        let mut handle = DatasetHandle::wrap(Dataset::new());

        execute(&mut handle, &[noop().into_ref()], &PipelineConfig::default()).unwrap();
        let quiet = PipelineConfig::default().with_progress(false);
        execute(&mut handle, &[noop().with_name("quiet").into_ref()], &quiet).unwrap();

        assert!(notices().is_empty());
    }
}
