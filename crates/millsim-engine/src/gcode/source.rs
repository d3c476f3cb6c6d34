//! Line sources for program files
//!
//! The loader never touches the filesystem directly: it asks a [`LineSource`]
//! whether a program exists and for its lines. [`FileLineSource`] reads from
//! disk, [`MemoryLineSource`] serves programs held in memory.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Buffer size for reading program files (64 KB)
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Supplies the lines of a program file
pub trait LineSource {
    /// Whether a program exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// All lines of the program at `path`, without line terminators
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// Reads program files from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLineSource;

impl FileLineSource {
    /// Create a new filesystem line source
    pub fn new() -> Self {
        Self
    }
}

impl LineSource for FileLineSource {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut lines = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            match line {
                Ok(line) => lines.push(line),
                Err(e) => {
                    warn!(
                        "Failed to read line {} of {}: {}",
                        index + 1,
                        path.display(),
                        e
                    );
                    return Err(e);
                }
            }
        }

        debug!("Read {} lines from {}", lines.len(), path.display());
        Ok(lines)
    }
}

/// Serves programs from memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryLineSource {
    files: HashMap<PathBuf, Vec<String>>,
}

impl MemoryLineSource {
    /// Create an empty in-memory source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a program under `path`, splitting `content` into lines
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: &str) {
        self.files
            .insert(path.into(), content.lines().map(str::to_string).collect());
    }

    /// Builder form of [`MemoryLineSource::insert`]
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.insert(path, content);
        self
    }
}

impl LineSource for MemoryLineSource {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no program registered at {}", path.display()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_source_reads_lines() {
        let mut file = tempfile::Builder::new().suffix(".f5").tempfile().unwrap();
        writeln!(file, "N1G01X0Y0Z0").unwrap();
        writeln!(file, "N2G01X1").unwrap();
        file.flush().unwrap();

        let source = FileLineSource::new();
        assert!(source.exists(file.path()));
        let lines = source.read_lines(file.path()).unwrap();
        assert_eq!(lines, vec!["N1G01X0Y0Z0", "N2G01X1"]);
    }

    #[test]
    fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.k1");
        let source = FileLineSource::new();
        assert!(!source.exists(&path));
        assert!(source.read_lines(&path).is_err());
    }

    #[test]
    fn test_memory_source() {
        let source = MemoryLineSource::new().with_file("a.f2", "G01X1\nG01X2\n");
        assert!(source.exists(Path::new("a.f2")));
        assert!(!source.exists(Path::new("b.f2")));
        assert_eq!(source.read_lines(Path::new("a.f2")).unwrap().len(), 2);
        assert_eq!(
            source.read_lines(Path::new("b.f2")).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }
}
