//! Performance Metrics
//!
//! Appends one CSV row per resolved unit of work so runs can be compared
//! offline. Brute-force units go to `bruteforce_package_metrics.csv`,
//! dictionary chunks to `dictionary_chunk_metrics.csv`, both under the
//! configured directory. Write failures are logged and otherwise ignored.

use crate::coordinator::types::CrackingResult;
use crate::coordinator::work::WorkKind;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

pub const BRUTE_FORCE_FILE: &str = "bruteforce_package_metrics.csv";
pub const DICTIONARY_FILE: &str = "dictionary_chunk_metrics.csv";

const BRUTE_FORCE_HEADER: &str = "Timestamp,JobId,UserLogin,PasswordLength,CharPackage,ServerIp,ProcessingTime,TotalTime,PasswordFound";
const DICTIONARY_HEADER: &str = "Timestamp,JobId,UserLogin,ChunkStart,ChunkEnd,ChunkSize,ServerIp,ProcessingTime,TotalTime,PasswordFound,Granularity";

#[derive(Debug)]
pub struct MetricsRecorder {
    dir: PathBuf,
    /// Serializes appends from concurrent jobs.
    write_lock: Mutex<()>,
}

impl MetricsRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Records every unit of a finished job.
    pub fn record_job(&self, job_id: &str, granularity: u64, results: &[CrackingResult]) {
        let mut brute_force = Vec::new();
        let mut dictionary = Vec::new();
        let timestamp = now_ms();

        for result in results {
            let processing = result
                .elapsed_ms
                .map(|ms| ms.to_string())
                .unwrap_or_else(|| "-1".to_string());

            match &result.unit {
                WorkKind::BruteForce(request) => brute_force.push(format!(
                    "{},{},{},{},{},{},{},{},{}",
                    timestamp,
                    job_id,
                    request.username,
                    request.password_length,
                    request.portion,
                    result.worker_id,
                    processing,
                    result.round_trip_ms,
                    result.success
                )),
                WorkKind::Dictionary(request) => dictionary.push(format!(
                    "{},{},{},{},{},{},{},{},{},{},{}",
                    timestamp,
                    job_id,
                    request.username,
                    request.start_line,
                    request.end_line,
                    request.end_line + 1 - request.start_line,
                    result.worker_id,
                    processing,
                    result.round_trip_ms,
                    result.success,
                    granularity
                )),
            }
        }

        if !brute_force.is_empty() {
            self.append(BRUTE_FORCE_FILE, BRUTE_FORCE_HEADER, &brute_force);
        }
        if !dictionary.is_empty() {
            self.append(DICTIONARY_FILE, DICTIONARY_HEADER, &dictionary);
        }
    }

    fn append(&self, file_name: &str, header: &str, rows: &[String]) {
        let path = self.dir.join(file_name);
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Err(e) = write_rows(&path, header, rows) {
            tracing::error!("Failed to write metrics to {}: {}", path.display(), e);
        } else {
            tracing::debug!("Saved {} metric rows to {}", rows.len(), path.display());
        }
    }
}

fn write_rows(path: &Path, header: &str, rows: &[String]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let new_file = !path.exists();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    if new_file {
        writeln!(file, "{}", header)?;
    }
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    Ok(())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::types::WorkerId;
    use crate::rpc::protocol::{BruteForceRequest, DictionaryRequest};

    fn result(unit: WorkKind, success: bool, elapsed_ms: Option<u64>) -> CrackingResult {
        CrackingResult {
            elapsed_ms,
            success,
            worker_id: WorkerId::new("10.0.0.1:5099"),
            password: None,
            unit,
            round_trip_ms: 7,
        }
    }

    #[test]
    fn test_rows_are_split_by_job_kind() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = MetricsRecorder::new(dir.path().join("metrics"));

        recorder.record_job(
            "job-1",
            10_000,
            &[
                result(
                    WorkKind::Dictionary(DictionaryRequest {
                        username: "alice".to_string(),
                        start_line: 1,
                        end_line: 10_000,
                    }),
                    false,
                    Some(12),
                ),
                result(
                    WorkKind::BruteForce(BruteForceRequest {
                        username: "alice".to_string(),
                        password_length: 3,
                        portion: "abc".to_string(),
                        alphabet: None,
                    }),
                    true,
                    None,
                ),
            ],
        );

        let dictionary =
            fs::read_to_string(dir.path().join("metrics").join(DICTIONARY_FILE)).unwrap();
        let lines: Vec<&str> = dictionary.lines().collect();
        assert_eq!(lines[0], DICTIONARY_HEADER);
        assert!(lines[1].ends_with(",job-1,alice,1,10000,10000,10.0.0.1:5099,12,7,false,10000"));

        let brute_force =
            fs::read_to_string(dir.path().join("metrics").join(BRUTE_FORCE_FILE)).unwrap();
        assert!(brute_force.lines().nth(1).unwrap().ends_with(",abc,10.0.0.1:5099,-1,7,true"));
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = MetricsRecorder::new(dir.path());
        let unit = WorkKind::BruteForce(BruteForceRequest {
            username: "bob".to_string(),
            password_length: 1,
            portion: "a".to_string(),
            alphabet: None,
        });

        recorder.record_job("job-1", 1, &[result(unit.clone(), false, Some(1))]);
        recorder.record_job("job-2", 1, &[result(unit, false, Some(1))]);

        let content = fs::read_to_string(dir.path().join(BRUTE_FORCE_FILE)).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
