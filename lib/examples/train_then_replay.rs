//! Train a small preprocessing pipeline on one table and replay it on another.
//!
//! The training table has a missing age and an id column the model should not
//! see. The pipeline drops the id, imputes the age with the training median and
//! standardizes the numeric columns. The output dataset carries the pieces as
//! history; passing it as the only spec replays them on the test table with the
//! statistics learned from the training table. The learned parameters are also
//! saved to disk and restored into a freshly built pipeline.

use mungeflow::dataset::ColumnData;
use mungeflow::history::{History, HistoryParams};
use mungeflow::normalize::normalize;
use mungeflow::piece::builtin::{drop_columns, impute, standardize, ImputeStrategy};
use mungeflow::piece::{column_transformation, MungePiece, PieceArgs};
use mungeflow::{apply_pipeline, Dataset, MungeError, Spec};
use std::error::Error;

fn training_table() -> Result<Dataset, Box<dyn Error>> {
    Ok(Dataset::new()
        .with_column("id", vec![1i64, 2, 3, 4, 5, 6])?
        .with_column("age", vec![22.0, 38.0, f64::NAN, 35.0, 54.0, 2.0])?
        .with_column("fare", vec![7.25, 71.28, 7.92, 53.10, 51.86, 21.07])?)
}

fn test_table() -> Result<Dataset, Box<dyn Error>> {
    Ok(Dataset::new()
        .with_column("id", vec![7i64, 8])?
        .with_column("age", vec![f64::NAN, 40.0])?
        .with_column("fare", vec![8.05, 30.00])?)
}

/// Clip values to the range seen at train time.
fn clip_to_training_range() -> MungePiece {
    let proc = column_transformation(|data, inv| {
        let values = data
            .to_floats()
            .ok_or_else(|| MungeError::Procedure("expected numbers".to_string()))?;
        if inv.is_training() {
            let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            inv.learn("lo", lo)?;
            inv.learn("hi", hi)?;
        }
        let (lo, hi) = (inv.learned_f64("lo")?, inv.learned_f64("hi")?);
        Ok(ColumnData::Float(
            values.into_iter().map(|v| v.clamp(lo, hi)).collect(),
        ))
    });
    MungePiece::from_procedure(proc)
        .with_name("clip")
        .with_args(PieceArgs::columns(["fare"]))
}

fn pipeline() -> Vec<Spec> {
    vec![
        Spec::from(drop_columns(["id"])),
        Spec::from(impute(["age"], ImputeStrategy::Median)),
        Spec::from(clip_to_training_range()),
        Spec::from(standardize(["age", "fare"])),
    ]
}

fn print_table(title: &str, data: &Dataset) -> Result<(), Box<dyn Error>> {
    println!("{}", title);
    for name in data.column_names() {
        let values: Vec<String> = data
            .float_column(name)?
            .iter()
            .map(|v| format!("{:>7.3}", v))
            .collect();
        println!("  {:<5} {}", name, values.join(" "));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let trained = apply_pipeline(training_table()?, pipeline())?;
    print_table("Training table after the pipeline:", &trained)?;

    let history = trained.history().cloned().unwrap_or_default();
    println!("\nRecorded history: {:?}", history.names());

    let replayed = apply_pipeline(test_table()?, [Spec::from(&trained)])?;
    print_table("\nTest table replayed in predict mode:", &replayed)?;

    // Persist what was learned and load it into a fresh, untrained pipeline.
    let dir = std::env::temp_dir().join("mungeflow-example");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("history.bin");
    history.save_to_file(&path)?;

    let params = HistoryParams::load_from_file(&path)?;
    println!("\nSaved parameters:\n{}", params.to_json()?);

    let fresh = History::new(normalize(pipeline())?);
    fresh.restore_params(params)?;
    let restored = apply_pipeline(test_table()?, [Spec::from(fresh)])?;

    assert_eq!(
        restored.float_column("age")?,
        replayed.float_column("age")?
    );
    println!("\nRestored pipeline reproduces the replay.");
    Ok(())
}
