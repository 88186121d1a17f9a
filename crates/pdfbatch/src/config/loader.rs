use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::batch::manager::MAX_STALE_AFTER_MINUTES;
use crate::config::schema::{Config, DocumentTemplate};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "PDFBATCH_CONFIG";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Picks the config file to use: the explicit path, then `$PDFBATCH_CONFIG`,
/// then `~/.pdfbatch/config.json` when it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(from_env) = std::env::var_os(CONFIG_ENV_VAR) {
        if !from_env.is_empty() {
            return Some(PathBuf::from(from_env));
        }
    }

    default_config_path().filter(|p| p.exists())
}

/// Returns the canonical config path: `~/.pdfbatch/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".pdfbatch").join("config.json"))
}

/// Loads the resolved config file, or the defaults when none is found.
pub fn load_config_or_default(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match resolve_config_path(explicit) {
        Some(path) => {
            log::debug!("Loading configuration from {}", path.display());
            load_config(path)
        }
        None => {
            log::debug!("No configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.batch_size == 0 {
        return Err(ConfigError::Validation {
            message: "batch_size must be at least 1".to_string(),
        });
    }

    if !(1..=MAX_STALE_AFTER_MINUTES).contains(&config.stale_after_minutes) {
        return Err(ConfigError::Validation {
            message: format!(
                "stale_after_minutes must be between 1 and {}",
                MAX_STALE_AFTER_MINUTES
            ),
        });
    }

    let mut names = HashSet::new();
    for template in &config.templates {
        if !names.insert(&template.name) {
            return Err(ConfigError::InvalidTemplate {
                name: template.name.clone(),
                reason: "Duplicate template name".to_string(),
            });
        }

        validate_template(template)?;
    }

    Ok(())
}

pub(crate) fn validate_template(template: &DocumentTemplate) -> Result<(), ConfigError> {
    for (field, pattern) in &template.fields {
        let regex = regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            template: template.name.clone(),
            field: field.clone(),
            reason: e.to_string(),
        })?;

        let has_named = regex.capture_names().flatten().any(|n| n == field);
        if !has_named && regex.captures_len() < 2 {
            return Err(ConfigError::InvalidPattern {
                template: template.name.clone(),
                field: field.clone(),
                reason: format!(
                    "Pattern must contain a capture group or a named group '?P<{}>'",
                    field
                ),
            });
        }
    }

    for part in &template.parts {
        if !template.fields.contains_key(&part.field) {
            return Err(ConfigError::InvalidTemplate {
                name: template.name.clone(),
                reason: format!("Part references undeclared field '{}'", part.field),
            });
        }
    }

    if let Some(format) = &template.format {
        for placeholder in format_placeholders(format) {
            if !template.fields.contains_key(placeholder) {
                return Err(ConfigError::InvalidTemplate {
                    name: template.name.clone(),
                    reason: format!("Format references undeclared field '{}'", placeholder),
                });
            }
        }
    }

    Ok(())
}

/// Names inside `{...}` in a format string.
pub(crate) fn format_placeholders(format: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = format;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                names.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}
