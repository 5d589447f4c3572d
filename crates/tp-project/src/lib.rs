//! tp-project: controller configuration file format and validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_config};

use std::path::Path;

/// Newest configuration file version this build understands.
pub const LATEST_VERSION: u32 = 1;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_yaml(content: &str) -> ProjectResult<ControllerConfig> {
    let config: ControllerConfig = serde_yaml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn parse_json(content: &str) -> ProjectResult<ControllerConfig> {
    let config: ControllerConfig = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn to_yaml_string(config: &ControllerConfig) -> ProjectResult<String> {
    validate_config(config)?;
    Ok(serde_yaml::to_string(config)?)
}

pub fn to_json_string(config: &ControllerConfig) -> ProjectResult<String> {
    validate_config(config)?;
    Ok(serde_json::to_string_pretty(config)?)
}

pub fn load_yaml(path: &Path) -> ProjectResult<ControllerConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content)
}

pub fn save_yaml(path: &Path, config: &ControllerConfig) -> ProjectResult<()> {
    let content = to_yaml_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<ControllerConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_json(&content)
}

pub fn save_json(path: &Path, config: &ControllerConfig) -> ProjectResult<()> {
    let content = to_json_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a configuration, picking the format from the file extension.
///
/// `.json` is read as JSON; anything else as YAML.
pub fn load(path: &Path) -> ProjectResult<ControllerConfig> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_yaml(path),
    }
}
