use super::EngineConfig;
use crate::error::{CoreError, Result};
use std::path::Path;
use std::{env, fs};

pub const ENGINE_CONFIG_PATH_ENV: &str = "FIVES_ENGINE_CONFIG_PATH";

/// Loads the config file named by `FIVES_ENGINE_CONFIG_PATH`.
///
/// Unset or blank means defaults. `.yaml`/`.yml` files are parsed as YAML,
/// anything else as JSON.
pub fn load_from_env() -> Result<EngineConfig> {
    let Ok(path) = env::var(ENGINE_CONFIG_PATH_ENV) else {
        return Ok(EngineConfig::default());
    };

    let path = path.trim();
    if path.is_empty() {
        return Ok(EngineConfig::default());
    }

    load_from_path(Path::new(path))
}

pub(crate) fn load_from_path(path: &Path) -> Result<EngineConfig> {
    let content = fs::read_to_string(path)?;
    let is_yaml = matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"));

    let config = if is_yaml {
        EngineConfig::from_yaml(&content)
    } else {
        EngineConfig::from_json(&content)
    }
    .map_err(|e| {
        CoreError::InvalidConfig(format!(
            "{ENGINE_CONFIG_PATH_ENV}='{}': {e}",
            path.display()
        ))
    })?;

    log::info!("Loaded engine config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "badges:\n  dynasty_streak: 10").unwrap();
        let config = load_from_path(file.path()).unwrap();
        assert_eq!(config.badges.dynasty_streak, 10);
    }

    #[test]
    fn test_load_bad_json_reports_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains(ENGINE_CONFIG_PATH_ENV));
    }
}
