//! Build config loading.

use crate::error::{CliError, Result};
use directories::ProjectDirs;
use sheetlayout_core::BuildConfig;
use std::path::{Path, PathBuf};

const MAX_INPUT_FILE_BYTES: u64 = 1_048_576; // 1 MiB

/// Read a text file, refusing anything over the size cap.
pub fn read_capped(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_INPUT_FILE_BYTES {
        return Err(CliError::TooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            max: MAX_INPUT_FILE_BYTES,
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

pub fn parse_config(path: &Path, content: &str) -> Result<BuildConfig> {
    toml::from_str(content).map_err(|err| CliError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Load the build config.
///
/// An explicit path must exist and parse. The per-user file is optional:
/// problems with it become warnings and the defaults apply.
pub fn load_config(explicit: Option<&Path>) -> Result<(BuildConfig, Vec<String>)> {
    let mut warnings = Vec::new();

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(CliError::NotFound(path.to_path_buf()));
        }
        let content = read_capped(path)?;
        return Ok((parse_config(path, &content)?, warnings));
    }

    let Some(path) = user_config_path() else {
        return Ok((BuildConfig::default(), warnings));
    };
    if !path.exists() {
        return Ok((BuildConfig::default(), warnings));
    }
    log::debug!("reading config from {}", path.display());
    let config = read_capped(&path).and_then(|content| parse_config(&path, &content));
    match config {
        Ok(config) => Ok((config, warnings)),
        Err(err) => {
            warnings.push(err.to_string());
            Ok((BuildConfig::default(), warnings))
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetlayout")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config(Path::new("c.toml"), "strict_references = true\n").unwrap();
        assert!(config.strict_references);
        assert_eq!(config.max_resolve_attempts, BuildConfig::default().max_resolve_attempts);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = parse_config(Path::new("c.toml"), "strict = true\n").unwrap_err();
        assert!(matches!(err, CliError::Parse { .. }));
    }

    #[test]
    fn test_missing_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(load_config(Some(&path)), Err(CliError::NotFound(_))));
    }

    #[test]
    fn test_explicit_config_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "operator_spacing = false").unwrap();
        writeln!(file, "table_name_attempts = 5").unwrap();
        let (config, warnings) = load_config(Some(&path)).unwrap();
        assert!(!config.operator_spacing);
        assert_eq!(config.table_name_attempts, 5);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_oversized_file_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.toml");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_INPUT_FILE_BYTES + 1).unwrap();
        assert!(matches!(read_capped(&path), Err(CliError::TooLarge { .. })));
    }
}
