use crate::error::{CrawlError, Result};
use crate::results::JobRecord;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Append the records of `new` whose `job_id` is not yet known.
///
/// `existing` keeps its order; the first occurrence of an id wins, both
/// against `existing` and within `new`.
pub fn merge(existing: Vec<JobRecord>, new: &[JobRecord]) -> Vec<JobRecord> {
    let mut seen: HashSet<String> = existing.iter().map(|r| r.job_id.clone()).collect();
    let mut merged = existing;
    for record in new {
        if seen.insert(record.job_id.clone()) {
            merged.push(record.clone());
        }
    }
    merged
}

/// Result of folding one page of records into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    pub added: usize,
    pub total: usize,
}

/// Deduplicated job records persisted as a JSON array
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted records.
    ///
    /// A missing or unparsable file reads as empty; other I/O failures
    /// are returned.
    pub fn load(&self) -> Result<Vec<JobRecord>> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                ::log::debug!("No record file at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(CrawlError::io(&self.path, e)),
        };

        match serde_json::from_slice::<Vec<JobRecord>>(&contents) {
            Ok(records) => Ok(records),
            Err(e) => {
                ::log::warn!(
                    "Record file {} is not a valid record array ({}), treating it as empty",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    /// Replace the persisted records.
    ///
    /// The JSON goes to a sibling temporary file which is synced and then
    /// renamed over the target, so readers see either the old or the new
    /// array.
    pub fn save(&self, records: &[JobRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        let tmp_path = self.tmp_path();

        let write_tmp = || -> std::io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()
        };
        if let Err(e) = write_tmp() {
            let _ = fs::remove_file(&tmp_path);
            return Err(CrawlError::io(&tmp_path, e));
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            CrawlError::io(&self.path, e)
        })?;

        ::log::debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Load, merge and save as one step.
    ///
    /// Takes `&mut self` so only one merge can be running against a store.
    pub fn merge_and_save(&mut self, new: &[JobRecord]) -> Result<MergeOutcome> {
        let existing = self.load()?;
        let before = existing.len();
        let merged = merge(existing, new);
        let outcome = MergeOutcome {
            added: merged.len() - before,
            total: merged.len(),
        };
        if outcome.added > 0 || !self.path.exists() {
            self.save(&merged)?;
        }
        Ok(outcome)
    }

    /// Delete the record file so the next run starts from nothing
    pub fn wipe(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                ::log::info!("Removed record file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CrawlError::io(&self.path, e)),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "records".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rec(id: &str) -> JobRecord {
        JobRecord::new(id, &format!("tok-{}", id))
    }

    fn ids(records: &[JobRecord]) -> Vec<&str> {
        records.iter().map(|r| r.job_id.as_str()).collect()
    }

    #[test]
    fn test_merge_appends_unique_in_order() {
        let existing = vec![rec("1"), rec("2"), rec("3")];
        let new = vec![rec("4"), rec("2"), rec("5"), rec("4"), rec("1")];
        let merged = merge(existing, &new);
        assert_eq!(ids(&merged), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_merge_first_seen_wins() {
        let existing = vec![JobRecord::new("1", "old")];
        let merged = merge(existing, &[JobRecord::new("1", "new")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].search_request_token, "old");
    }

    #[test]
    fn test_merge_idempotent() {
        let a = vec![rec("1"), rec("2"), rec("3")];
        assert_eq!(merge(a.clone(), &a), a);
    }

    #[test]
    fn test_merge_no_duplicates_from_messy_inputs() {
        let a = vec![rec("9"), rec("3"), rec("7")];
        let b = vec![rec("3"), rec("3"), rec("8"), rec("9"), rec("6"), rec("8")];
        let merged = merge(a.clone(), &b);

        let unique: HashSet<&str> = ids(&merged).into_iter().collect();
        assert_eq!(unique.len(), merged.len());
        assert_eq!(&merged[..a.len()], &a[..]);
        assert_eq!(ids(&merged[a.len()..]), vec!["8", "6"]);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path().join("job_ids.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job_ids.json");
        fs::write(&path, "81234567\n81234568\n").unwrap();
        let store = RecordStore::new(&path);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_invalid_utf8_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job_ids.json");
        fs::write(&path, b"[\xff\xfe garbage").unwrap();

        let mut store = RecordStore::new(&path);
        assert!(store.load().unwrap().is_empty());

        let outcome = store.merge_and_save(&[rec("1")]).unwrap();
        assert_eq!(outcome, MergeOutcome { added: 1, total: 1 });
        assert_eq!(ids(&store.load().unwrap()), vec!["1"]);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path().join("job_ids.json"));
        let records = vec![rec("1"), rec("2")];
        store.save(&records).unwrap();

        assert_eq!(store.load().unwrap(), records);
        assert!(!dir.path().join("job_ids.json.tmp").exists());

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"jobId\": \"1\""));
        assert!(raw.contains("\"searchRequestToken\": \"tok1\""));
    }

    #[test]
    fn test_merge_and_save_across_runs() {
        let dir = TempDir::new().unwrap();
        let mut store = RecordStore::new(dir.path().join("job_ids.json"));

        let first = store.merge_and_save(&[rec("1"), rec("2")]).unwrap();
        assert_eq!(first, MergeOutcome { added: 2, total: 2 });

        let mut reopened = RecordStore::new(store.path());
        let second = reopened.merge_and_save(&[rec("2"), rec("3")]).unwrap();
        assert_eq!(second, MergeOutcome { added: 1, total: 3 });
        assert_eq!(ids(&reopened.load().unwrap()), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_merge_and_save_replaces_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job_ids.json");
        fs::write(&path, "{ not json").unwrap();

        let mut store = RecordStore::new(&path);
        let outcome = store.merge_and_save(&[rec("1")]).unwrap();
        assert_eq!(outcome, MergeOutcome { added: 1, total: 1 });
        assert_eq!(ids(&store.load().unwrap()), vec!["1"]);
    }

    #[test]
    fn test_wipe() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path().join("job_ids.json"));
        store.save(&[rec("1")]).unwrap();
        store.wipe().unwrap();
        assert!(!store.path().exists());
        // Wiping twice is fine
        store.wipe().unwrap();
    }
}
