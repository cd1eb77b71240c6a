// crates/agentgate-config/src/file.rs
// ============================================================================
// Module: Config File Loading
// Description: TOML configuration files with environment substitution.
// Purpose: Load InitOptions from disk for file-driven deployments.
// Dependencies: toml, agentgate-core, crate::options
// ============================================================================

//! ## Overview
//! Configuration files are TOML documents deserializing into
//! [`InitOptions`]. Before parsing, `${VAR}` placeholders in the raw
//! document are replaced with the value of the named environment variable;
//! referencing an unset variable fails the load outright rather than
//! committing a half-substituted configuration. Files above the size cap are
//! rejected before being read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use agentgate_core::ConfigError;

use crate::options::InitOptions;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable overriding the default config file path.
pub const CONFIG_PATH_ENV_VAR: &str = "AGENTGATE_CONFIG";

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "agentgate.toml";

/// Maximum accepted config file size in bytes.
const MAX_CONFIG_FILE_BYTES: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and substitutes a config file at an explicit path.
///
/// # Errors
///
/// Returns [`ConfigError::FileNotFound`] for a missing file,
/// [`ConfigError::FileTooLarge`] above the size cap,
/// [`ConfigError::MissingEnvVar`] for a `${VAR}` referencing an unset
/// variable, and [`ConfigError::ParseFailed`] for invalid TOML.
pub fn load_config_file(path: &Path) -> Result<InitOptions, ConfigError> {
    let metadata = fs::metadata(path)
        .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
    if metadata.len() > MAX_CONFIG_FILE_BYTES {
        return Err(ConfigError::FileTooLarge(metadata.len()));
    }

    let raw = fs::read_to_string(path)
        .map_err(|err| ConfigError::ParseFailed(err.to_string()))?;
    let substituted = substitute_env(&raw)?;
    toml::from_str(&substituted).map_err(|err| ConfigError::ParseFailed(err.to_string()))
}

/// Loads the config file named by `AGENTGATE_CONFIG`, or the default file
/// when it exists.
///
/// Returns `Ok(None)` when neither is present; an explicitly named file that
/// is missing is an error.
///
/// # Errors
///
/// Propagates [`load_config_file`] failures.
pub fn load_default_config_file() -> Result<Option<InitOptions>, ConfigError> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR)
        && !path.trim().is_empty()
    {
        return load_config_file(&PathBuf::from(path)).map(Some);
    }
    let default = Path::new(DEFAULT_CONFIG_FILE);
    if default.is_file() {
        return load_config_file(default).map(Some);
    }
    Ok(None)
}

// ============================================================================
// SECTION: Substitution
// ============================================================================

/// Replaces `${VAR}` placeholders with environment variable values.
fn substitute_env(raw: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start + 2..].find('}') else {
            break;
        };
        let name = &rest[start + 2..start + 2 + end];
        let value = env::var(name)
            .map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        output.push_str(&rest[..start]);
        output.push_str(&value);
        rest = &rest[start + 2 + end + 1..];
    }
    output.push_str(rest);
    Ok(output)
}
