use base64::Engine;
use std::path::{Path, PathBuf};
use tokio::fs;

const EXTENSION: &str = "png";
const DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug)]
pub enum SketchError {
    InvalidName(String),
    InvalidImage(base64::DecodeError),
    NotFound(String),
    Io(std::io::Error),
}

impl std::fmt::Display for SketchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "invalid sketch name: {:?}", name),
            Self::InvalidImage(err) => write!(f, "invalid sketch data: {}", err),
            Self::NotFound(name) => write!(f, "sketch not found: {}", name),
            Self::Io(err) => write!(f, "sketch storage error: {}", err),
        }
    }
}

impl From<std::io::Error> for SketchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// PNG files in one directory, keyed by file stem.
#[derive(Debug, Clone)]
pub struct SketchStore {
    dir: PathBuf,
}

impl SketchStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), SketchError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// `data` is base64 PNG, with or without a `data:` URL prefix.
    pub async fn save(&self, name: &str, data: &str) -> Result<(), SketchError> {
        let path = self.path_for(name)?;
        let encoded = data.strip_prefix(DATA_URL_PREFIX).unwrap_or(data);
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(SketchError::InvalidImage)?;
        fs::write(&path, bytes).await?;
        log::info!("Saved sketch {:?} to {}", name, path.display());
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<String>, SketchError> {
        let mut result = Vec::new();

        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                result.push(stem.to_owned());
            }
        }
        result.sort();

        Ok(result)
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, SketchError> {
        let path = self.path_for(name)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(SketchError::NotFound(name.to_owned()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, SketchError> {
        let stem = name.strip_suffix(".png").unwrap_or(name);
        if !is_valid_name(stem) {
            return Err(SketchError::InvalidName(name.to_owned()));
        }
        Ok(self.dir.join(format!("{}.{}", stem, EXTENSION)))
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && !name.contains(|c: char| c == '/' || c == '\\' || c.is_control())
}
