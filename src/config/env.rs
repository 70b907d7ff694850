//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::models::CampaignConfig;
use std::path::{Path, PathBuf};

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load an environment file into the process environment.
    ///
    /// An explicit `path` must exist. Without one, `./.env` is loaded when
    /// present. Variables already set in the environment win over the file.
    /// Returns the file that was loaded, if any.
    pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>> {
        let candidate = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::config(format!("Environment file not found: {}", path.display())));
                }
                path.to_path_buf()
            }
            None => {
                let default = PathBuf::from(".env");
                if !default.exists() {
                    return Ok(None);
                }
                default
            }
        };

        dotenv::from_path(&candidate)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", candidate.display(), e)))?;
        Ok(Some(candidate))
    }

    /// Content of a commented example .env file
    pub fn create_example_env_content() -> String {
        let mut content = String::from(
            "# Network performance campaign configuration\n\
             #\n\
             # Values here override built-in defaults and are themselves\n\
             # overridden by real environment variables and command-line flags.\n\n",
        );
        for (var, description, example) in Self::get_supported_env_vars() {
            content.push_str(&format!("# {}\n# {}={}\n\n", description, var, example));
        }
        content
    }

    /// Write the example .env file to `path`
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))
    }

    /// Check one variable by merging it into a default configuration
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let mut config = CampaignConfig::default();
        config.merge_from_lookup(|k| (k == key).then(|| value.to_string()))?;
        config.validate_sections()
    }

    /// Supported variables with a description and an example value
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("TEST_PROTOCOLS", "Comma-separated throughput protocols (tcp, udp)", "tcp,udp"),
            ("TEST_DURATION_SECONDS", "Duration of each throughput test in seconds", "60"),
            ("TEST_ITERATIONS", "Throughput iterations per protocol (1-100)", "5"),
            ("ITERATION_DELAY_SECONDS", "Pause between throughput iterations in seconds", "10"),
            ("UDP_BITRATE", "Target bitrate for UDP throughput tests", "10M"),
            ("LATENCY_DURATION_SECONDS", "Duration of the latency test in seconds", "60"),
            ("LATENCY_INTERVAL_SECONDS", "Interval between latency probes in seconds", "1.0"),
            ("MAX_LATENCY_MS", "Maximum acceptable mean latency in ms", "50"),
            ("MAX_PACKET_LOSS_PERCENT", "Maximum acceptable packet loss in percent", "1.0"),
            ("MIN_THROUGHPUT_MBPS", "Minimum acceptable throughput in Mbps", "10"),
            ("LOG_LEVEL", "Log level (trace, debug, info, warn, error)", "info"),
            ("LOG_FORMAT", "Log format (console, json, compact)", "console"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Help text listing the supported variables
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<26} {}\n", var, description));
            help.push_str(&format!("  {:<26} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Warnings for supported variables currently set to invalid values
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var, _, _)| {
                let value = std::env::var(var).ok()?;
                Self::validate_env_var(var, &value).err().map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_example_content_lists_every_variable() {
        let content = EnvManager::create_example_env_content();
        for (var, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", var)), "{} missing", var);
        }
    }

    #[test]
    fn test_save_example_file() {
        let temp_file = NamedTempFile::new().unwrap();
        EnvManager::save_example_env_file(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("Network performance campaign configuration"));
    }

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("TEST_PROTOCOLS", "tcp,udp").is_ok());
        assert!(EnvManager::validate_env_var("TEST_ITERATIONS", "5").is_ok());
        assert!(EnvManager::validate_env_var("MAX_LATENCY_MS", "12.5").is_ok());
        assert!(EnvManager::validate_env_var("LOG_FORMAT", "json").is_ok());
        assert!(EnvManager::validate_env_var("UDP_BITRATE", "10M").is_ok());

        assert!(EnvManager::validate_env_var("TEST_PROTOCOLS", "icmp").is_err());
        assert!(EnvManager::validate_env_var("TEST_ITERATIONS", "0").is_err());
        assert!(EnvManager::validate_env_var("TEST_ITERATIONS", "101").is_err());
        assert!(EnvManager::validate_env_var("MAX_PACKET_LOSS_PERCENT", "250").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();
        assert!(help.contains("TEST_PROTOCOLS"));
        assert!(help.contains("Configuration Priority"));
    }

    #[test]
    fn test_load_explicit_env_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "NPC_ENV_FILE_MARKER=loaded").unwrap();

        let loaded = EnvManager::load_env_file(Some(file.path())).unwrap();
        assert_eq!(loaded.as_deref(), Some(file.path()));
        assert_eq!(std::env::var("NPC_ENV_FILE_MARKER").unwrap(), "loaded");
    }

    #[test]
    fn test_missing_explicit_env_file() {
        let err = EnvManager::load_env_file(Some(Path::new("/definitely/not/here/.env"))).unwrap_err();
        assert_eq!(err.category(), "CONFIG");
    }
}
