use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::constants::{AGE_MODEL_NAME, APP_DIR_NAME, DETECTOR_MODEL_NAME, GENDER_MODEL_NAME};

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("no models directory found (looked in {})", format_paths(.0))]
    NoModelsDir(Vec<PathBuf>),
    #[error("missing model files: {}", format_paths(.0))]
    Missing(Vec<PathBuf>),
    #[error("model files are empty (0 bytes), re-download them: {}", format_paths(.0))]
    Empty(Vec<PathBuf>),
    #[error("failed to inspect model file {path}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Paths of the three models a session needs, validated to exist and be non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelFiles {
    pub detector: PathBuf,
    pub age: PathBuf,
    pub gender: PathBuf,
}

impl ModelFiles {
    /// Validates the standard model file names inside `dir`.
    ///
    /// Every missing file is reported at once; empty files are only
    /// checked once nothing is missing.
    pub fn in_dir(dir: &Path) -> Result<Self, ModelResolveError> {
        let files = Self {
            detector: dir.join(DETECTOR_MODEL_NAME),
            age: dir.join(AGE_MODEL_NAME),
            gender: dir.join(GENDER_MODEL_NAME),
        };
        files.validate()?;
        Ok(files)
    }

    pub fn paths(&self) -> [&Path; 3] {
        [&self.detector, &self.age, &self.gender]
    }

    fn validate(&self) -> Result<(), ModelResolveError> {
        let missing: Vec<PathBuf> = self
            .paths()
            .into_iter()
            .filter(|p| !p.exists())
            .map(Path::to_path_buf)
            .collect();
        if !missing.is_empty() {
            return Err(ModelResolveError::Missing(missing));
        }

        let mut empty = Vec::new();
        for path in self.paths() {
            let len = fs::metadata(path)
                .map_err(|source| ModelResolveError::Inspect {
                    path: path.to_path_buf(),
                    source,
                })?
                .len();
            if len == 0 {
                empty.push(path.to_path_buf());
            }
        }
        if !empty.is_empty() {
            return Err(ModelResolveError::Empty(empty));
        }
        Ok(())
    }
}

/// Picks the models directory.
///
/// Resolution order:
/// 1. Explicit directory, if given (must exist)
/// 2. `./models` relative to the working directory
/// 3. Platform data directory (`<data_dir>/FaceLens/models`)
pub fn resolve_models_dir(explicit: Option<&Path>) -> Result<PathBuf, ModelResolveError> {
    let candidates: Vec<PathBuf> = match explicit {
        Some(dir) => vec![dir.to_path_buf()],
        None => {
            let mut dirs = vec![PathBuf::from("models")];
            if let Some(data) = data_models_dir() {
                dirs.push(data);
            }
            dirs
        }
    };

    candidates
        .iter()
        .find(|d| d.is_dir())
        .cloned()
        .ok_or(ModelResolveError::NoModelsDir(candidates))
}

/// Platform-specific models directory.
///
/// - macOS: `~/Library/Application Support/FaceLens/models/`
/// - Linux: `$XDG_DATA_HOME/FaceLens/models/` or `~/.local/share/FaceLens/models/`
/// - Windows: `%APPDATA%/FaceLens/models/`
pub fn data_models_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(APP_DIR_NAME).join("models"))
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
