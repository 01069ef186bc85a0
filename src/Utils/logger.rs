use crate::numerical::runge::RefinementStep;
use chrono::Local;
use csv::Writer;
use std::fs::File;
use std::io;

/// Save the refinement history produced by one integration run into a CSV
/// file: one row per completed pass.
pub fn save_history_to_csv(history: &[RefinementStep], filename: &str) -> io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["iteration", "subdivisions", "cutoff", "estimate", "runge_error"])?;

    for step in history {
        writer.write_record(&[
            step.iteration.to_string(),
            step.subdivisions.to_string(),
            step.cutoff.to_string(),
            step.estimate.to_string(),
            step.error.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Timestamped file name for a history dump, e.g. "history_2026-08-30_12-00-00.csv"
pub fn timestamped_history_name(prefix: &str) -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("{}_{}.csv", prefix, date_and_time)
}
