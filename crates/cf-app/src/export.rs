//! CSV export of trace records.

use std::path::Path;

use cf_sim::TraceRecord;

use crate::error::{AppError, AppResult};

pub const CSV_HEADER: &str =
    "time_s,reference_mps,speed_mps,error_mps,command,engine_force_n,disturbance_n";

/// One header line, then one line per record in run order.
pub fn trace_to_csv(records: &[TraceRecord]) -> String {
    let mut csv = String::with_capacity(64 * (records.len() + 1));
    csv.push_str(CSV_HEADER);
    csv.push('\n');
    for r in records {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            r.time,
            r.reference,
            r.velocity,
            r.error,
            r.command,
            r.engine_force,
            r.disturbance_force
        ));
    }
    csv
}

pub fn write_csv(path: &Path, records: &[TraceRecord]) -> AppResult<()> {
    std::fs::write(path, trace_to_csv(records)).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
