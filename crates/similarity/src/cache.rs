//! On-disk cache for built similarity matrices.
//!
//! The artifact file holds a bincode-encoded `DatasetFingerprint` header
//! followed by the matrices. The header is checked before the (large) body is
//! decoded; any difference in dataset rows, identifier order, movie content,
//! feature settings or format version is a `CacheMismatch` and the caller
//! rebuilds.

use crate::engine::SimilarityMatrices;
use crate::error::{Result, SimilarityError};
use crate::features::FeatureConfig;
use data_loader::{DataIndex, Movie};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Bumped whenever the artifact layout changes
pub const FORMAT_VERSION: u32 = 2;

const ARTIFACT_FILE: &str = "similarity_matrices.bin";

/// Identifies the dataset and settings a set of matrices was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFingerprint {
    pub version: u32,
    pub row_count: usize,
    /// crc32 over movie ids in position order
    pub id_digest: u32,
    /// crc32 over every field the matrices are built from
    pub content_digest: u32,
    /// crc32 over the encoded feature settings
    pub config_digest: u32,
}

impl DatasetFingerprint {
    pub fn of(index: &DataIndex, config: &FeatureConfig) -> Self {
        let mut ids = crc32fast::Hasher::new();
        let mut content = crc32fast::Hasher::new();
        for movie in index.movies() {
            ids.update(&movie.id.to_le_bytes());
            hash_content(&mut content, movie);
        }

        let encoded = bincode::serialize(config).unwrap_or_default();

        Self {
            version: FORMAT_VERSION,
            row_count: index.len(),
            id_digest: ids.finalize(),
            content_digest: content.finalize(),
            config_digest: crc32fast::hash(&encoded),
        }
    }
}

impl fmt::Display for DatasetFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{}/{} rows/ids {:08x}/content {:08x}/config {:08x}",
            self.version, self.row_count, self.id_digest, self.content_digest, self.config_digest
        )
    }
}

/// Feed the matrix inputs of one movie into `hasher`.
///
/// Each field is length-prefixed so moving text between fields changes the
/// digest.
fn hash_content(hasher: &mut crc32fast::Hasher, movie: &Movie) {
    let mut field = |text: &str| {
        hasher.update(&(text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    };

    field(&movie.title);
    field(movie.overview.as_deref().unwrap_or(""));
    field(movie.director.as_deref().unwrap_or(""));
    for list in [
        &movie.genres,
        &movie.keywords,
        &movie.cast,
        &movie.production_companies,
    ] {
        field(&list.len().to_string());
        for name in list {
            field(name);
        }
    }
}

/// Directory-backed artifact cache
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(ARTIFACT_FILE)
    }

    /// Load cached matrices, checking them against the expected fingerprint
    pub fn load(&self, expected: &DatasetFingerprint) -> Result<SimilarityMatrices> {
        let path = self.path();
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SimilarityError::CacheMissing {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let mut reader = BufReader::new(file);

        let found: DatasetFingerprint = bincode::deserialize_from(&mut reader)?;
        if &found != expected {
            return Err(mismatch(expected, &found));
        }

        let matrices: SimilarityMatrices = bincode::deserialize_from(&mut reader)?;
        if matrices.fingerprint() != expected || !matrices.is_consistent() {
            return Err(mismatch(expected, matrices.fingerprint()));
        }
        Ok(matrices)
    }

    /// Write matrices atomically (temp file, then rename)
    pub fn store(&self, matrices: &SimilarityMatrices) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path();
        let tmp = path.with_extension("bin.tmp");

        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            bincode::serialize_into(&mut writer, matrices.fingerprint())?;
            bincode::serialize_into(&mut writer, matrices)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Return cached matrices when they match the dataset, else build and store.
    ///
    /// A failure to write the cache is logged, not returned: the freshly built
    /// matrices are still usable.
    #[instrument(skip_all, fields(cache = %self.dir.display()))]
    pub fn load_or_build(
        &self,
        index: &DataIndex,
        config: &FeatureConfig,
    ) -> Result<SimilarityMatrices> {
        let expected = DatasetFingerprint::of(index, config);
        match self.load(&expected) {
            Ok(matrices) => {
                info!("Loaded cached similarity matrices ({})", expected);
                return Ok(matrices);
            }
            Err(SimilarityError::CacheMissing { .. }) => {
                info!("No cached similarity matrices, building");
            }
            Err(e) => {
                warn!("Discarding cached similarity matrices: {}", e);
            }
        }

        let matrices = SimilarityMatrices::build(index, config)?;
        if let Err(e) = self.store(&matrices) {
            warn!("Failed to write similarity cache: {}", e);
        }
        Ok(matrices)
    }

    /// Remove the artifact file. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn mismatch(expected: &DatasetFingerprint, found: &DatasetFingerprint) -> SimilarityError {
    SimilarityError::CacheMismatch {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}
