//! File-backed event log
//!
//! One JSON record per line. A batch is serialized up front and appended
//! with a single write, so a serialization failure leaves the file untouched.
//! A record only counts once its terminating newline is on disk: an
//! unterminated tail left by an interrupted append is ignored when reading
//! and cut off when the log is reopened.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::EventLogError;
use crate::events::models::{Event, EventRecord};
use crate::events::sink::EventSink;

/// Append-only JSON-lines event log
pub struct FileEventLog {
    path: PathBuf,
    next_sequence: Mutex<u64>,
}

/// Committed records and where they end in the file
struct Scan {
    records: Vec<EventRecord>,
    committed_len: u64,
    file_len: u64,
}

impl FileEventLog {
    /// Open the log at `path`, creating parent directories as needed and
    /// resuming the sequence after any records already on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EventLogError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let scan = Self::scan(&path)?;
        if scan.committed_len < scan.file_len {
            OpenOptions::new()
                .write(true)
                .open(&path)?
                .set_len(scan.committed_len)?;
            tracing::warn!(
                path = ?path,
                dropped_bytes = scan.file_len - scan.committed_len,
                "Truncated interrupted append from event log"
            );
        }

        let next_sequence = scan
            .records
            .last()
            .map(|record| record.sequence + 1)
            .unwrap_or(0);

        tracing::debug!(path = ?path, next_sequence, "Opened event log");

        Ok(Self {
            path,
            next_sequence: Mutex::new(next_sequence),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every committed record back from disk
    pub fn load(&self) -> Result<Vec<EventRecord>, EventLogError> {
        Ok(Self::scan(&self.path)?.records)
    }

    fn scan(path: &Path) -> Result<Scan, EventLogError> {
        if !path.exists() {
            return Ok(Scan {
                records: Vec::new(),
                committed_len: 0,
                file_len: 0,
            });
        }

        let bytes = fs::read(path)?;
        let committed_len = bytes
            .iter()
            .rposition(|b| *b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(0);

        let mut records = Vec::new();
        for line in bytes[..committed_len].split(|b| *b == b'\n') {
            if line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }
            records.push(serde_json::from_slice(line)?);
        }

        let tail = &bytes[committed_len..];
        if !tail.iter().all(|b| b.is_ascii_whitespace()) {
            tracing::warn!(
                path = ?path,
                bytes = tail.len(),
                "Ignoring unterminated record at end of event log"
            );
        }

        Ok(Scan {
            records,
            committed_len: committed_len as u64,
            file_len: bytes.len() as u64,
        })
    }
}

impl EventSink for FileEventLog {
    fn publish(&self, events: &[Event]) -> Result<(), EventLogError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut next_sequence = self.next_sequence.lock();

        let mut buffer = String::new();
        let mut sequence = *next_sequence;
        for event in events {
            let record = EventRecord::new(sequence, event.clone());
            buffer.push_str(&serde_json::to_string(&record)?);
            buffer.push('\n');
            sequence += 1;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let start = file.metadata()?.len();
        if let Err(e) = file
            .write_all(buffer.as_bytes())
            .and_then(|()| file.flush())
        {
            // Never leave part of a batch behind
            if let Err(rollback) = file.set_len(start) {
                tracing::error!(path = ?self.path, error = %rollback, "Failed to roll back partial batch");
            }
            return Err(e.into());
        }

        for (offset, event) in events.iter().enumerate() {
            tracing::debug!(
                sequence = *next_sequence + offset as u64,
                kind = event.kind(),
                "Event appended"
            );
        }
        *next_sequence = sequence;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let log = FileEventLog::open(dir.path().join("events.jsonl")).unwrap();
        assert!(log.load().unwrap().is_empty());
    }

    #[test]
    fn test_publish_and_load() {
        let dir = TempDir::new().unwrap();
        let log = FileEventLog::open(dir.path().join("nested/events.jsonl")).unwrap();
        let account = Identity::random();

        log.publish(&[
            Event::AdministratorGranted { account },
            Event::AdministratorRevoked { account },
        ])
        .unwrap();

        let records = log.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, 0);
        assert_eq!(records[1].event, Event::AdministratorRevoked { account });
    }

    #[test]
    fn test_reopen_resumes_sequence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let account = Identity::random();

        {
            let log = FileEventLog::open(&path).unwrap();
            log.publish(&[Event::AdministratorGranted { account }])
                .unwrap();
        }

        let log = FileEventLog::open(&path).unwrap();
        log.publish(&[Event::AdministratorRevoked { account }])
            .unwrap();

        let sequences: Vec<u64> = log.load().unwrap().iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![0, 1]);
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        fs::write(&path, "not json\n").unwrap();

        assert!(matches!(
            FileEventLog::open(&path),
            Err(EventLogError::Serialization(_))
        ));
    }

    #[test]
    fn test_interrupted_append_is_dropped_on_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let account = Identity::random();

        {
            let log = FileEventLog::open(&path).unwrap();
            log.publish(&[Event::AdministratorGranted { account }])
                .unwrap();
        }
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(br#"{"sequence":1,"id":""#).unwrap();
        drop(file);

        let log = FileEventLog::open(&path).unwrap();
        assert_eq!(log.load().unwrap().len(), 1);

        log.publish(&[Event::AdministratorRevoked { account }])
            .unwrap();
        let records = log.load().unwrap();
        let sequences: Vec<u64> = records.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![0, 1]);
        assert_eq!(records[1].event, Event::AdministratorRevoked { account });
        assert!(fs::read_to_string(&path).unwrap().ends_with('\n'));
    }

    #[test]
    fn test_unterminated_tail_is_ignored_by_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let log = FileEventLog::open(&path).unwrap();
        log.publish(&[Event::RectorAppointed {
            rector: Identity::random(),
        }])
        .unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"sequence\":").unwrap();
        drop(file);

        assert_eq!(log.load().unwrap().len(), 1);
    }

    #[test]
    fn test_corruption_before_the_tail_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let log = FileEventLog::open(&path).unwrap();
        log.publish(&[Event::RectorAppointed {
            rector: Identity::random(),
        }])
        .unwrap();

        let mut contents = String::from("garbage\n");
        contents.push_str(&fs::read_to_string(&path).unwrap());
        fs::write(&path, contents).unwrap();

        assert!(matches!(
            FileEventLog::open(&path),
            Err(EventLogError::Serialization(_))
        ));
    }
}
