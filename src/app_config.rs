//! File configuration for CLI defaults.
//!
//! The file is line-oriented `key = value` with `#` comments. Strings are
//! double-quoted; instance lists are one quoted, comma-separated string.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use discovery_core::DiscoveryConfig;

/// Environment variable that overrides the official API credential.
pub const API_KEY_ENV: &str = "TOPIC_DISCOVERY_API_KEY";

/// Database file used when neither `--db` nor `database_path` is given.
pub const DEFAULT_DATABASE_FILE: &str = "topic-discovery.db";

/// Values read from the config file. Unset keys keep library defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub official_base_url: Option<String>,
    pub piped_instances: Option<Vec<String>>,
    pub invidious_instances: Option<Vec<String>>,
    pub provider_timeout_secs: Option<u64>,
    pub fallback_deadline_secs: Option<u64>,
    pub database_path: Option<PathBuf>,
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        validate_secs("provider_timeout_secs", self.provider_timeout_secs, 120)?;
        validate_secs("fallback_deadline_secs", self.fallback_deadline_secs, 600)?;
        for (field, list) in [
            ("piped_instances", &self.piped_instances),
            ("invidious_instances", &self.invidious_instances),
        ] {
            if let Some(list) = list
                && list.is_empty()
            {
                bail!("Invalid config value for `{field}`: expected at least one instance URL");
            }
        }
        Ok(())
    }
}

fn validate_secs(field: &str, value: Option<u64>, max: u64) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=max).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..={max}");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Log level used when neither `RUST_LOG` nor a CLI flag decides.
    #[must_use]
    pub fn log_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose | Self::Debug => "debug",
            Self::Quiet => "error",
        }
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/topic-discovery/config.toml`
/// 2. `$HOME/.config/topic-discovery/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("topic-discovery")
                .join("config.toml"),
        );
    }
    let home = env_var_non_empty("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("topic-discovery")
            .join("config.toml"),
    )
}

fn env_var_non_empty(name: &str) -> Option<std::ffi::OsString> {
    env::var_os(name).filter(|value| !value.is_empty())
}

/// Loads the config file at the default path, or defaults when absent.
pub fn load_default_file_config() -> Result<FileConfig> {
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path),
        _ => Ok(FileConfig::default()),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

/// Builds the library config: defaults, then file values, then the
/// credential env var, then the CLI deadline.
pub fn build_discovery_config(
    file: &FileConfig,
    env_api_key: Option<String>,
    cli_deadline_secs: Option<u64>,
) -> Result<DiscoveryConfig> {
    let mut config = DiscoveryConfig::default();
    if let Some(url) = &file.official_base_url {
        config.official_base_url.clone_from(url);
    }
    if let Some(list) = &file.piped_instances {
        config.piped_instances.clone_from(list);
    }
    if let Some(list) = &file.invidious_instances {
        config.invidious_instances.clone_from(list);
    }
    if let Some(secs) = file.provider_timeout_secs {
        config.provider_timeout = Duration::from_secs(secs);
    }
    config.fallback_deadline = cli_deadline_secs
        .or(file.fallback_deadline_secs)
        .map(Duration::from_secs);
    config.api_key = env_api_key
        .filter(|key| !key.trim().is_empty())
        .or_else(|| file.api_key.clone());

    config
        .validate()
        .context("Effective configuration is invalid")?;
    Ok(config)
}

/// Reads the credential override from the environment.
#[must_use]
pub fn api_key_from_env() -> Option<String> {
    env::var(API_KEY_ENV).ok()
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_index + 1;

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };
        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "api_key" => {
                cfg.api_key = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "official_base_url" => {
                cfg.official_base_url = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "piped_instances" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.piped_instances = Some(split_list(&parsed));
            }
            "invidious_instances" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.invidious_instances = Some(split_list(&parsed));
            }
            "provider_timeout_secs" => {
                cfg.provider_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "fallback_deadline_secs" => {
                cfg.fallback_deadline_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "database_path" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.database_path = Some(PathBuf::from(parsed));
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
provider_timeout_secs = 8
verbosity = "verbose"
"#,
        )
        .unwrap();
        assert_eq!(cfg.provider_timeout_secs, Some(8));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert!(cfg.piped_instances.is_none());
    }

    #[test]
    fn test_parse_config_instance_lists() {
        let cfg =
            parse_config_str(r#"piped_instances = "https://a.example, https://b.example,""#)
                .unwrap();
        assert_eq!(
            cfg.piped_instances,
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
    }

    #[test]
    fn test_parse_config_rejects_empty_instance_list() {
        let err = parse_config_str(r#"invidious_instances = " , ""#).unwrap_err();
        assert!(format!("{err:#}").contains("invidious_instances"));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
api_key = "abc#123" # hash inside the string is kept
fallback_deadline_secs = 30 # whole chain
"#,
        )
        .unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("abc#123"));
        assert_eq!(cfg.fallback_deadline_secs, Some(30));
    }

    #[test]
    fn test_parse_config_rejects_out_of_range_timeout() {
        let err = parse_config_str("provider_timeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("provider_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_trailing_tokens() {
        let err = parse_config_str("provider_timeout_secs = 4 trailing").unwrap_err();
        assert!(err.to_string().contains("provider_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("database_path = /tmp/x.db").unwrap_err();
        assert!(err.to_string().contains("database_path"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("concurrency = 4").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_env_key_overrides_file_key() {
        let file = FileConfig {
            api_key: Some("from-file".to_string()),
            ..FileConfig::default()
        };
        let config = build_discovery_config(&file, Some("from-env".to_string()), None).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-env"));

        let config = build_discovery_config(&file, Some("  ".to_string()), None).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_cli_deadline_overrides_file_deadline() {
        let file = FileConfig {
            fallback_deadline_secs: Some(60),
            ..FileConfig::default()
        };
        let config = build_discovery_config(&file, None, Some(5)).unwrap();
        assert_eq!(config.fallback_deadline, Some(Duration::from_secs(5)));

        let config = build_discovery_config(&file, None, None).unwrap();
        assert_eq!(config.fallback_deadline, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_invalid_instance_url_is_rejected() {
        let file = FileConfig {
            piped_instances: Some(vec!["ftp://mirror.example".to_string()]),
            ..FileConfig::default()
        };
        assert!(build_discovery_config(&file, None, None).is_err());
    }

    #[test]
    fn test_verbosity_log_levels() {
        assert_eq!(VerbositySetting::Default.log_level(), "info");
        assert_eq!(VerbositySetting::Quiet.log_level(), "error");
        assert_eq!(VerbositySetting::Debug.log_level(), "debug");
    }
}
