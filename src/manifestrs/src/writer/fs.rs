// manifestrs/src/writer/fs.rs

use crate::writer::{FileWriter, WriteRequest, WriteResult};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes files atomically, fanning batches out over a bounded pool
pub struct FsFileWriter {
    pool: Option<ThreadPool>,
}

impl FsFileWriter {
    /// Writer allowing at most `max_concurrency` writes in flight
    pub fn new(max_concurrency: usize) -> Self {
        let threads = max_concurrency.max(1);
        let pool = if threads == 1 {
            None
        } else {
            match ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("manifestrs-writer-{}", i))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!("Could not start writer pool, writing sequentially: {}", e);
                    None
                }
            }
        };
        Self { pool }
    }

    fn write_atomic(request: &WriteRequest) -> std::io::Result<()> {
        let path = &request.filepath;
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs_err::create_dir_all(parent)?;

        // Write next to the target so the rename stays on one file system
        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(request.content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Default for FsFileWriter {
    fn default() -> Self {
        Self::new(1)
    }
}

impl FileWriter for FsFileWriter {
    fn write_file(&self, request: &WriteRequest) -> WriteResult {
        match Self::write_atomic(request) {
            Ok(()) => {
                log::debug!("Wrote {}", request.filepath.display());
                WriteResult::ok(&request.filepath)
            }
            Err(e) => {
                log::warn!("Failed to write {}: {}", request.filepath.display(), e);
                WriteResult::failed(&request.filepath, e)
            }
        }
    }

    fn write_files(&self, requests: &[WriteRequest]) -> Vec<WriteResult> {
        match &self.pool {
            Some(pool) => pool.install(|| {
                requests
                    .par_iter()
                    .map(|request| self.write_file(request))
                    .collect()
            }),
            None => requests
                .iter()
                .map(|request| self.write_file(request))
                .collect(),
        }
    }

    fn retire_file(&self, filepath: &Path, quarantine_dir: Option<&Path>) -> WriteResult {
        if !filepath.exists() {
            return WriteResult::ok(filepath);
        }

        let outcome = match quarantine_dir {
            Some(dir) => {
                let name = filepath.file_name().unwrap_or(filepath.as_os_str());
                fs_err::create_dir_all(dir).and_then(|_| fs_err::rename(filepath, dir.join(name)))
            }
            None => fs_err::remove_file(filepath),
        };

        match outcome {
            Ok(()) => WriteResult::ok(filepath),
            Err(e) if e.kind() == ErrorKind::NotFound => WriteResult::ok(filepath),
            Err(e) => WriteResult::failed(filepath, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request(path: &Path, content: &str) -> WriteRequest {
        WriteRequest {
            filepath: path.to_path_buf(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_write_file_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("src/components/Card.tsx");

        let result = FsFileWriter::default().write_file(&request(&path, "card"));

        assert!(result.success);
        assert_eq!(fs_err::read_to_string(&path).unwrap(), "card");
    }

    #[test]
    fn test_write_file_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("App.tsx");
        let writer = FsFileWriter::default();

        writer.write_file(&request(&path, "one"));
        writer.write_file(&request(&path, "two"));

        assert_eq!(fs_err::read_to_string(&path).unwrap(), "two");
    }

    #[test]
    fn test_write_files_keeps_order_and_reports_failures() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs_err::write(&blocker, "not a directory").unwrap();

        let requests: Vec<WriteRequest> = (0..6)
            .map(|i| request(&temp_dir.path().join(format!("f{}.tsx", i)), "x"))
            .chain(std::iter::once(request(&blocker.join("nested.tsx"), "x")))
            .collect();

        let results = FsFileWriter::new(3).write_files(&requests);

        assert_eq!(results.len(), 7);
        for (result, request) in results.iter().zip(&requests) {
            assert_eq!(result.filepath, request.filepath);
        }
        assert!(results[..6].iter().all(|r| r.success));
        assert!(!results[6].success);
        assert!(results[6].error.is_some());
    }

    #[test]
    fn test_retire_file_quarantines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Old.tsx");
        let trash = temp_dir.path().join("trash/1");
        fs_err::write(&path, "old").unwrap();

        let result = FsFileWriter::default().retire_file(&path, Some(&trash));

        assert!(result.success);
        assert!(!path.exists());
        assert_eq!(
            fs_err::read_to_string(trash.join("Old.tsx")).unwrap(),
            "old"
        );
    }

    #[test]
    fn test_retire_file_deletes_and_tolerates_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Old.tsx");
        fs_err::write(&path, "old").unwrap();
        let writer = FsFileWriter::default();

        assert!(writer.retire_file(&path, None).success);
        assert!(!path.exists());
        assert!(writer.retire_file(&path, None).success);
    }
}
