//! Filesystem-backed record source and system clock

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::traits::{Clock, RecordSource};
use crate::core::types::{FileSnapshot, FileStat};

/// The position file on disk. Opened fresh on every call.
#[derive(Debug, Clone)]
pub struct FsRecordSource {
    path: PathBuf,
}

impl FsRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for FsRecordSource {
    fn stat(&self) -> Option<FileStat> {
        let meta = fs::metadata(&self.path).ok()?;
        if !meta.is_file() {
            return None;
        }
        let modified = meta.modified().ok()?;
        Some(FileStat {
            modified: DateTime::<Utc>::from(modified),
            len: meta.len(),
        })
    }

    fn snapshot(&self) -> io::Result<FileSnapshot> {
        // A file that disappears mid-poll reads as zero bytes, which the
        // parser reports as "no new data".
        let declared_len = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(FileSnapshot::new(0, Vec::new()))
            }
            Err(e) => return Err(e),
        };

        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(FileSnapshot::new(declared_len, Vec::new()))
            }
            Err(e) => return Err(e),
        };

        let mut bytes = Vec::with_capacity(declared_len as usize);
        file.read_to_end(&mut bytes)?;
        Ok(FileSnapshot::new(declared_len, bytes))
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::freshness::{check_freshness, Freshness};
    use crate::core::session::{Fetch, PositionalSession, UnavailableReason};
    use crate::core::traits::mocks::MockLog;
    use filetime::FileTime;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    const SAMPLE: &str = r#"x=10.0,y=20.0,z=0,surface=1,player=7,server="saveA""#;

    fn write_aged(path: &Path, contents: &str, age_secs: u64) {
        fs::write(path, contents).unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        filetime::set_file_mtime(path, FileTime::from_system_time(mtime)).unwrap();
    }

    #[test]
    fn test_stat_missing_file() {
        let temp = TempDir::new().unwrap();
        let source = FsRecordSource::new(temp.path().join("missing.txt"));
        assert!(source.stat().is_none());
    }

    #[test]
    fn test_directory_is_not_a_source() {
        let temp = TempDir::new().unwrap();
        let source = FsRecordSource::new(temp.path());
        assert!(source.stat().is_none());
    }

    #[test]
    fn test_snapshot_reads_whole_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pos.txt");
        fs::write(&path, SAMPLE).unwrap();

        let source = FsRecordSource::new(&path);
        let stat = source.stat().unwrap();
        assert_eq!(stat.len, SAMPLE.len() as u64);

        let snapshot = source.snapshot().unwrap();
        assert_eq!(snapshot, FileSnapshot::complete(SAMPLE));
    }

    #[test]
    fn test_snapshot_of_vanished_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let source = FsRecordSource::new(temp.path().join("gone.txt"));
        let snapshot = source.snapshot().unwrap();
        assert!(snapshot.bytes.is_empty());
    }

    #[test]
    fn test_freshness_from_mtime() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pos.txt");
        let source = FsRecordSource::new(&path);
        let four = Duration::from_secs(4);

        assert_eq!(check_freshness(&source, &SystemClock, four), Freshness::Missing);

        write_aged(&path, SAMPLE, 1);
        assert_eq!(check_freshness(&source, &SystemClock, four), Freshness::Fresh);

        write_aged(&path, SAMPLE, 10);
        assert_eq!(check_freshness(&source, &SystemClock, four), Freshness::Stale);
    }

    #[test]
    fn test_session_against_real_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pos.txt");
        let source = FsRecordSource::new(&path);
        let log = MockLog::new();
        let mut session = PositionalSession::default();

        write_aged(&path, SAMPLE, 1);
        let fetch = session.fetch_position(&source, &SystemClock, &log);
        assert_eq!(
            fetch.frame().unwrap().avatar.position,
            [10.0, 1000.0, -20.0]
        );

        write_aged(&path, SAMPLE, 10);
        assert!(matches!(
            session.fetch_position(&source, &SystemClock, &log),
            Fetch::Unavailable(UnavailableReason::FileStale)
        ));

        write_aged(&path, "", 0);
        assert!(matches!(
            session.fetch_position(&source, &SystemClock, &log),
            Fetch::Reuse
        ));
        assert_eq!(log.count(), 0);
    }
}
