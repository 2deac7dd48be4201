//! Backing-file persistence for the catalog
//!
//! The data file holds a single root object, `{"products": [...]}`. Loading
//! returns the `products` array (empty when the key is absent). Saving always
//! rewrites the whole file: canonical fields only, four-space indentation,
//! literal `/` and non-ASCII text, one trailing newline.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Serializer, Value, ser::PrettyFormatter};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::record::Record;

const INDENT: &[u8] = b"    ";

/// Load/save seam between the catalog and its storage.
pub trait RecordStore: Send + Sync {
    fn load(&self) -> StoreResult<Vec<Record>>;
    fn save(&self, records: &[Record]) -> StoreResult<()>;
}

/// How `JsonFileStore::save` replaces the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate and rewrite the file in place.
    #[default]
    Overwrite,
    /// Write a sibling temporary file, then rename it over the target.
    Atomic,
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "atomic" => Ok(Self::Atomic),
            other => Err(format!(
                "unknown write mode '{other}', expected one of: overwrite, atomic"
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    products: Vec<Record>,
}

#[derive(Debug, Serialize)]
struct CanonicalCatalogFile {
    products: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    write_mode: WriteMode,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_mode: WriteMode::default(),
        }
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> StoreResult<Vec<Record>> {
        let bytes = fs::read(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(self.path.clone())
            } else {
                StoreError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let file: CatalogFile = serde_json::from_slice(&bytes).map_err(StoreError::Parse)?;
        debug!(path = %self.path.display(), records = file.products.len(), "catalog loaded");
        Ok(file.products)
    }

    fn save(&self, records: &[Record]) -> StoreResult<()> {
        let bytes = encode(records)?;

        let written = match self.write_mode {
            WriteMode::Overwrite => fs::write(&self.path, &bytes),
            WriteMode::Atomic => self.write_atomic(&bytes),
        };
        written.map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(
            path = %self.path.display(),
            records = records.len(),
            bytes = bytes.len(),
            "catalog saved"
        );
        Ok(())
    }
}

/// Serializes the collection exactly as it is written to disk.
pub fn encode(records: &[Record]) -> StoreResult<Vec<u8>> {
    let file = CanonicalCatalogFile {
        products: records.iter().map(Record::to_canonical).collect(),
    };

    let mut out = Vec::with_capacity(128 * (records.len() + 1));
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    file.serialize(&mut serializer)
        .map_err(StoreError::Encode)?;
    out.push(b'\n');
    Ok(out)
}

/// One past the largest integer id; ids that are missing or not integers count as 0.
///
/// `None` once the largest id is `i64::MAX`.
pub fn next_id(records: &[Record]) -> Option<String> {
    records
        .iter()
        .map(Record::numeric_id)
        .fold(0, i64::max)
        .checked_add(1)
        .map(|id| id.to_string())
}
