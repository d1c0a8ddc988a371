//! Dictionary Storage
//!
//! Local view of the dictionary corpus directory. Uploading and validating
//! corpus files happens elsewhere; this module only answers "which corpus is
//! current", "how many lines does it have" and "give me lines N..M".
//!
//! The current corpus is the most recently created regular file in the
//! directory (modification time is used on filesystems without birth times).

use crate::error::{CrackError, Result};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub struct DictionaryStorage {
    dir: PathBuf,
}

impl DictionaryStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the most recently created corpus file.
    pub fn latest_file(&self) -> Result<PathBuf> {
        if !self.dir.is_dir() {
            return Err(CrackError::CorpusMissing(format!(
                "Dictionary directory not found at: {}",
                self.dir.display()
            )));
        }

        let mut latest: Option<(SystemTime, PathBuf)> = None;
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            let stamp = metadata
                .created()
                .or_else(|_| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);

            let newer = match &latest {
                Some((best, best_path)) => {
                    stamp > *best || (stamp == *best && entry.path() > *best_path)
                }
                None => true,
            };
            if newer {
                latest = Some((stamp, entry.path()));
            }
        }

        latest.map(|(_, path)| path).ok_or_else(|| {
            CrackError::CorpusMissing(format!(
                "No dictionary files found in {}",
                self.dir.display()
            ))
        })
    }

    /// Counts the lines of the current corpus.
    pub fn count_lines(&self) -> Result<u64> {
        let path = self.latest_file()?;
        let reader = BufReader::new(File::open(&path)?);

        let mut count = 0u64;
        for line in reader.split(b'\n') {
            line?;
            count += 1;
        }

        tracing::info!("Dictionary {} contains {} lines", path.display(), count);
        Ok(count)
    }

    /// Opens the current corpus positioned at `start_line` (1-based).
    ///
    /// The returned iterator yields `(line_number, candidate)` pairs up to and
    /// including `end_line`, or until the file ends.
    pub fn open_range(&self, start_line: u64, end_line: u64) -> Result<LineRange> {
        let path = self.latest_file()?;
        let reader = BufReader::new(File::open(&path)?);
        Ok(LineRange {
            reader,
            next_line: 1,
            start_line: start_line.max(1),
            end_line,
        })
    }
}

/// Streaming reader over an inclusive line range of the corpus.
pub struct LineRange {
    reader: BufReader<File>,
    next_line: u64,
    start_line: u64,
    end_line: u64,
}

impl Iterator for LineRange {
    type Item = std::io::Result<(u64, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        loop {
            if self.next_line > self.end_line {
                return None;
            }

            buf.clear();
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }

            let line_number = self.next_line;
            self.next_line += 1;
            if line_number < self.start_line {
                continue;
            }

            while matches!(buf.last(), Some(b'\n' | b'\r')) {
                buf.pop();
            }
            return Some(Ok((line_number, std::mem::take(&mut buf))));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_corpus(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn test_missing_directory_is_corpus_missing() {
        let storage = DictionaryStorage::new("/definitely/not/here");
        let err = storage.latest_file().unwrap_err();
        assert!(matches!(err, CrackError::CorpusMissing(_)));
    }

    #[test]
    fn test_empty_directory_is_corpus_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DictionaryStorage::new(dir.path());
        assert!(matches!(
            storage.count_lines(),
            Err(CrackError::CorpusMissing(_))
        ));
    }

    #[test]
    fn test_count_lines() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), "words.txt", &["alpha", "beta", "gamma"]);

        let storage = DictionaryStorage::new(dir.path());
        assert_eq!(storage.count_lines().unwrap(), 3);
    }

    #[test]
    fn test_open_range_is_inclusive_and_one_based() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), "words.txt", &["a", "b", "c", "d", "e"]);

        let storage = DictionaryStorage::new(dir.path());
        let lines: Vec<(u64, Vec<u8>)> = storage
            .open_range(2, 4)
            .unwrap()
            .collect::<std::io::Result<_>>()
            .unwrap();

        assert_eq!(
            lines,
            vec![
                (2, b"b".to_vec()),
                (3, b"c".to_vec()),
                (4, b"d".to_vec())
            ]
        );
    }

    #[test]
    fn test_open_range_keeps_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("words.txt"), b"caf\xe9\r\nplain\n").unwrap();

        let storage = DictionaryStorage::new(dir.path());
        let lines: Vec<(u64, Vec<u8>)> = storage
            .open_range(1, 2)
            .unwrap()
            .collect::<std::io::Result<_>>()
            .unwrap();

        assert_eq!(lines[0], (1, b"caf\xe9".to_vec()));
        assert_eq!(lines[1], (2, b"plain".to_vec()));
    }

    #[test]
    fn test_open_range_stops_at_end_of_file() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), "words.txt", &["a", "b"]);

        let storage = DictionaryStorage::new(dir.path());
        let count = storage.open_range(1, 1_000).unwrap().count();
        assert_eq!(count, 2);
    }
}
