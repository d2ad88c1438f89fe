use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::APP_DIR_NAME;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model not found at {configured} or in {searched}")]
    NotFound {
        configured: PathBuf,
        searched: PathBuf,
    },
    #[error("model path {0} has no file name")]
    NoFileName(PathBuf),
    #[error("could not determine model cache directory")]
    NoCacheDir,
}

/// Resolve the heatmap model file.
///
/// Resolution order:
/// 1. The configured path, relative to the working directory
/// 2. The same file name inside the per-user model directory
pub fn resolve(configured: &Path) -> Result<PathBuf, ModelResolveError> {
    resolve_in(configured, &model_cache_dir()?)
}

fn resolve_in(configured: &Path, cache_dir: &Path) -> Result<PathBuf, ModelResolveError> {
    if configured.is_file() {
        return Ok(configured.to_path_buf());
    }

    let name = configured
        .file_name()
        .ok_or_else(|| ModelResolveError::NoFileName(configured.to_path_buf()))?;
    let cached = cache_dir.join(name);
    if cached.is_file() {
        log::debug!("Using cached model {}", cached.display());
        return Ok(cached);
    }

    Err(ModelResolveError::NotFound {
        configured: configured.to_path_buf(),
        searched: cache_dir.to_path_buf(),
    })
}

/// Platform-specific model directory.
///
/// - macOS: `~/Library/Application Support/PrivacyGuard/models/`
/// - Linux: `$XDG_CACHE_HOME/PrivacyGuard/models/` or `~/.cache/PrivacyGuard/models/`
/// - Windows: `%LOCALAPPDATA%/PrivacyGuard/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME).join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join(APP_DIR_NAME).join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_prefers_configured_path() {
        let tmp = TempDir::new().unwrap();
        let configured = tmp.path().join("model.onnx");
        fs::write(&configured, b"configured").unwrap();
        let cache = tmp.path().join("cache");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("model.onnx"), b"cached").unwrap();

        let resolved = resolve_in(&configured, &cache).unwrap();
        assert_eq!(resolved, configured);
    }

    #[test]
    fn test_resolve_falls_back_to_cache_dir() {
        let tmp = TempDir::new().unwrap();
        let configured = tmp.path().join("missing").join("model.onnx");
        let cache = tmp.path().join("cache");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("model.onnx"), b"cached").unwrap();

        let resolved = resolve_in(&configured, &cache).unwrap();
        assert_eq!(resolved, cache.join("model.onnx"));
    }

    #[test]
    fn test_resolve_missing_everywhere_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let configured = tmp.path().join("model.onnx");
        let err = resolve_in(&configured, &tmp.path().join("cache")).unwrap_err();
        assert!(matches!(err, ModelResolveError::NotFound { .. }));
    }

    #[test]
    fn test_resolve_directory_is_not_a_model() {
        let tmp = TempDir::new().unwrap();
        let configured = tmp.path().join("model.onnx");
        fs::create_dir_all(&configured).unwrap();
        let err = resolve_in(&configured, &tmp.path().join("cache")).unwrap_err();
        assert!(matches!(err, ModelResolveError::NotFound { .. }));
    }

    #[test]
    fn test_model_cache_dir_returns_path() {
        let path = model_cache_dir().unwrap();
        assert!(path.to_string_lossy().contains(APP_DIR_NAME));
        assert!(path.to_string_lossy().ends_with("models"));
    }
}
