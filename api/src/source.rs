//! I define the [`DataSource`] trait,
//! the boundary with the adapters providing external extensions for predicates,
//! as well as [`CsvFileDataSource`].
//!
//! Adapters do not read data themselves:
//! they describe how the backend must access it,
//! and check that the resource they point to is available.
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// An external source of facts for a predicate.
pub trait DataSource: Debug + Send + Sync {
    /// The number of columns provided by this source, if it is known in advance.
    fn arity(&self) -> Option<usize>;

    /// A string identifying this source.
    ///
    /// Two declarations with the same predicate and the same identity are the same declaration.
    fn identity(&self) -> String;

    /// The fragment of backend configuration describing this source,
    /// as the `index`-th source of the configuration.
    fn to_backend_config_fragment(&self, index: usize) -> String;

    /// Check that the underlying resource is available.
    ///
    /// This is called every time the knowledge base is loaded,
    /// never at declaration time.
    fn validate(&self) -> io::Result<()> {
        Ok(())
    }
}

/// A [`DataSource`] reading a CSV file (one fact per line).
#[derive(Clone, Debug)]
pub struct CsvFileDataSource {
    path: PathBuf,
    arity: Option<usize>,
}

impl CsvFileDataSource {
    /// Declare the CSV file at `path` as a data source.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvFileDataSource {
            path: path.into(),
            arity: None,
        }
    }

    /// Declare the number of columns of the file.
    #[must_use]
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// The path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir_and_stem(&self) -> (String, String) {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.display().to_string(),
            _ => ".".to_string(),
        };
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = match name.strip_suffix(".gz") {
            Some(name) => name.to_string(),
            None => name,
        };
        let stem = match stem.strip_suffix(".csv") {
            Some(stem) => stem.to_string(),
            None => stem,
        };
        (dir, stem)
    }
}

impl DataSource for CsvFileDataSource {
    fn arity(&self) -> Option<usize> {
        self.arity
    }

    fn identity(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn to_backend_config_fragment(&self, index: usize) -> String {
        let (dir, stem) = self.dir_and_stem();
        format!(
            "EDB{index}_type=INMEMORY\nEDB{index}_param0={dir}\nEDB{index}_param1={stem}\n"
        )
    }

    fn validate(&self) -> io::Result<()> {
        let meta = std::fs::metadata(&self.path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", self.path.display()),
            ));
        }
        File::open(&self.path).map(|_| ())
    }
}
