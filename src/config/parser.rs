use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads a harvester configuration file
///
/// Missing sections and keys take their defaults, so an empty file yields
/// `Config::default()`. The result has already passed [`validate`], which means
/// it can be handed straight to `Harvester::new`.
///
/// # Errors
///
/// * `ConfigError::Io` - The file could not be read
/// * `ConfigError::Parse` - The file is not valid TOML or has a mistyped key
/// * `ConfigError::Validation` - A value is out of range (timeout, depth, log size)
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use pdf_harvester::config::load_config;
///
/// let config = load_config(Path::new("harvester.toml")).unwrap();
/// println!("Downloads go to: {}", config.output.download_dir);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// SHA-256 of the configuration file, hex encoded
///
/// The CLI logs it when a crawl starts so the files in a download directory can
/// be traced back to the settings (depth, timeout, user agent) that produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(hash_content(&std::fs::read_to_string(path)?))
}

/// Loads a configuration together with the hash of the exact text it was parsed from
///
/// The file is read once, so the hash always describes the configuration returned
/// even if the file is rewritten while the harvester starts.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
