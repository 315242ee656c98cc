//! First-run setup.
//!
//! Writes the default configuration file when none exists yet.

use std::path::Path;

/// Embedded default configuration template.
pub const DEFAULT_CONFIG: &str = include_str!("../../environments/micpulse.toml");

/// Creates the config file at `config_path` if it is missing.
///
/// Returns whether a file was written.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn ensure_config(config_path: &Path) -> anyhow::Result<bool> {
    if config_path.exists() {
        tracing::debug!("Config found at {}", config_path.display());
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, DEFAULT_CONFIG)?;
    tracing::info!("Default configuration written to {}", config_path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_config_writes_once() {
        let dir = std::env::temp_dir().join(format!("micpulse-setup-{}", std::process::id()));
        let path = dir.join("micpulse.toml");
        let _ = std::fs::remove_dir_all(&dir);

        assert!(ensure_config(&path).unwrap());
        std::fs::write(&path, "[visual]\nrenderer = \"element\"\n").unwrap();
        assert!(!ensure_config(&path).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("element"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
