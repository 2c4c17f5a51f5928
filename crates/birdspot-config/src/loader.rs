//! Configuration loader.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::schema::Config;

/// Config file read when no `--config` path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/birdspot.toml";

/// Overrides `jobs.directory`.
pub const ENV_JOB_DIRECTORY: &str = "BIRDSPOT_JOB_DIRECTORY";

/// Overrides `cache.directory`.
pub const ENV_FILE_CACHE_DIRECTORY: &str = "BIRDSPOT_FILE_CACHE_DIRECTORY";

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Io(e),
        })?;
        let mut config = Self::load_str(&content)?;
        Self::apply_overrides(&mut config, |name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load from `path`, or from [`DEFAULT_CONFIG_PATH`] when `None`.
    ///
    /// A missing default file yields the built-in defaults. A missing explicit
    /// path is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::load(Path::new(DEFAULT_CONFIG_PATH)) {
            Err(ConfigError::NotFound(_)) => {
                let mut config = Config::default();
                Self::apply_overrides(&mut config, |name| std::env::var(name).ok());
                Ok(config)
            }
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        Self::expand_paths(&mut config);
        Ok(config)
    }

    /// Apply directory overrides, looking variables up through `lookup`.
    pub fn apply_overrides<F>(config: &mut Config, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_JOB_DIRECTORY).filter(|v| !v.is_empty()) {
            config.jobs.directory = PathBuf::from(Self::expand_path(&dir));
        }
        if let Some(dir) = lookup(ENV_FILE_CACHE_DIRECTORY).filter(|v| !v.is_empty()) {
            config.cache.directory = PathBuf::from(Self::expand_path(&dir));
        }
    }

    /// Expand environment variables in the format `${VAR}`.
    ///
    /// Whole-line `#` comments are left untouched.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;

        let mut lines = Vec::new();
        for line in content.split_inclusive('\n') {
            if line.trim_start().starts_with('#') || !re.is_match(line) {
                lines.push(line.to_string());
                continue;
            }

            let mut expanded = line.to_string();
            for cap in re.captures_iter(line) {
                let var_name = &cap[1];
                let var_value = std::env::var(var_name)
                    .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
                expanded = expanded.replace(&cap[0], &var_value);
            }
            lines.push(expanded);
        }

        Ok(lines.concat())
    }

    fn expand_paths(config: &mut Config) {
        config.jobs.directory = Self::expand_path_buf(&config.jobs.directory);
        config.cache.directory = Self::expand_path_buf(&config.cache.directory);
        if let Some(dir) = config.logging.directory.as_mut() {
            *dir = Self::expand_path_buf(dir);
        }
    }

    fn expand_path_buf(path: &Path) -> PathBuf {
        PathBuf::from(Self::expand_path(&path.to_string_lossy()))
    }

    /// Expand shell-style paths (e.g., `~/.birdspot`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.jobs.pool.max_workers, 4);
        assert_eq!(config.cache.backend, "file");
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [jobs]
            directory = "/srv/birdspot/jobs"
            max_workers = 8

            [cache]
            backend = "memory"
            directory = "/srv/birdspot/cache"
            prefix = "scores"
            version = 2

            [logging]
            level = "debug"
            directory = "/var/log/birdspot"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.jobs.directory, PathBuf::from("/srv/birdspot/jobs"));
        assert_eq!(config.jobs.pool.max_workers, 8);
        assert_eq!(config.cache.backend, "memory");
        assert_eq!(config.cache.prefix, "scores");
        assert_eq!(config.cache.version, 2);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.directory, Some(PathBuf::from("/var/log/birdspot")));
    }

    #[test]
    fn test_load_expands_tilde_in_directories() {
        let content = r#"
            [jobs]
            directory = "~/birdspot-jobs"

            [logging]
            directory = "~/birdspot-logs"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert!(!config.jobs.directory.starts_with("~"));
        assert!(config.jobs.directory.ends_with("birdspot-jobs"));
        assert!(!config.logging.directory.unwrap().starts_with("~"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[jobs]").unwrap();
        writeln!(file, "max_workers = 2").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.jobs.pool.max_workers, 2);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/birdspot.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_explicit_missing_path() {
        let result = ConfigLoader::load_or_default(Some(Path::new("/nonexistent/birdspot.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_load_wrong_type() {
        let result = ConfigLoader::load_str("[jobs]\nmax_workers = \"many\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_JOB_DIRECTORY, "/tmp/birdspot/jobs"),
            (ENV_FILE_CACHE_DIRECTORY, "/tmp/birdspot/cache"),
        ]);
        let mut config = Config::default();

        ConfigLoader::apply_overrides(&mut config, |name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.jobs.directory, PathBuf::from("/tmp/birdspot/jobs"));
        assert_eq!(config.cache.directory, PathBuf::from("/tmp/birdspot/cache"));
    }

    #[test]
    fn test_apply_overrides_ignores_empty_values() {
        let mut config = Config::default();
        let before = config.jobs.directory.clone();

        ConfigLoader::apply_overrides(&mut config, |_| Some(String::new()));

        assert_eq!(config.jobs.directory, before);
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("BIRDSPOT_TEST_CACHE_PREFIX", "staging");
        }
        let config = ConfigLoader::load_str("[cache]\nprefix = \"${BIRDSPOT_TEST_CACHE_PREFIX}\"").unwrap();
        assert_eq!(config.cache.prefix, "staging");
        unsafe {
            std::env::remove_var("BIRDSPOT_TEST_CACHE_PREFIX");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_TEST_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(name)) if name == "NONEXISTENT_TEST_VAR_12345"));
    }

    #[test]
    fn test_expand_env_vars_skips_comments() {
        let content = "# ${NONEXISTENT_TEST_VAR_12345} is not read\n  # nor ${THIS_ONE}\nvalue = 1\n";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_load_shipped_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/birdspot.toml");
        let config = ConfigLoader::load(&path).unwrap();

        assert_eq!(config.jobs.pool.max_workers, 4);
        assert_eq!(config.cache.backend, "file");
        assert_eq!(config.cache.prefix, "birdspot");
        assert!(!config.jobs.directory.starts_with("~"));
        assert!(crate::ConfigValidator::validate(&config).unwrap().is_valid());
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(ConfigLoader::expand_path("/usr/local/bin"), "/usr/local/bin");
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/test");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/test"));
    }
}
