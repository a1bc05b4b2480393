use std::fs;
use std::path::{Path, PathBuf};

use crate::core::errors::ApiError;

/// Directory of fine-tuned models, one sub-directory per model.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_root(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    /// Model names in alphabetical order; empty when the root is missing.
    pub fn list(&self) -> Result<Vec<String>, ApiError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(ApiError::internal)? {
            let entry = entry.map_err(ApiError::internal)?;
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Path for `name`, which must be a plain directory name.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ApiError> {
        let safe = sanitize_model_name(name)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid model name: {}", name)))?;
        Ok(self.root.join(safe))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).map(|path| path.is_dir()).unwrap_or(false)
    }
}

fn sanitize_model_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains("..") || trimmed.contains(['/', '\\', ':']) {
        return None;
    }
    let base = Path::new(trimmed).file_name().and_then(|n| n.to_str())?;
    (base == trimmed).then_some(base)
}
