//! Game configuration and provider factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use votesort_core::dataset::FilterConfig;
use votesort_core::model::Variant;
use votesort_core::traits::DataProvider;
use votesort_core::EngineConfig;

use crate::file::{DatedFileProvider, FileProvider};

/// Top-level votesort configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotesortConfig {
    /// Puzzle variant to play.
    #[serde(default = "default_variant")]
    pub variant: Variant,
    /// Seed for reproducible games.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Explicit data file. When unset, today's file in `data_dir` is used.
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    /// Directory holding dated data files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Dataset filtering thresholds.
    #[serde(default)]
    pub filter: FilterConfig,
}

fn default_variant() -> Variant {
    Variant::Rank
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for VotesortConfig {
    fn default() -> Self {
        Self {
            variant: default_variant(),
            seed: None,
            data_path: None,
            data_dir: default_data_dir(),
            filter: FilterConfig::default(),
        }
    }
}

impl VotesortConfig {
    /// Engine settings derived from this config.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            variant: self.variant,
            filter: self.filter.clone(),
            seed: self.seed,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `votesort.toml` in the current directory
/// 2. `~/.config/votesort/config.toml`
///
/// Environment variable overrides: `VOTESORT_DATA`, `VOTESORT_SEED`,
/// `VOTESORT_VARIANT`.
pub fn load_config() -> Result<VotesortConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<VotesortConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("votesort.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<VotesortConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => VotesortConfig::default(),
    };

    // Apply env var overrides
    if let Ok(data) = std::env::var("VOTESORT_DATA") {
        config.data_path = Some(PathBuf::from(data));
    }
    if let Ok(seed) = std::env::var("VOTESORT_SEED") {
        let seed = seed
            .trim()
            .parse::<u64>()
            .with_context(|| format!("invalid VOTESORT_SEED: '{seed}'"))?;
        config.seed = Some(seed);
    }
    if let Ok(variant) = std::env::var("VOTESORT_VARIANT") {
        config.variant = variant
            .parse()
            .map_err(|e: String| anyhow::anyhow!("invalid VOTESORT_VARIANT: {e}"))?;
    }

    config.data_path = config.data_path.as_deref().map(resolve_path);
    config.data_dir = resolve_path(&config.data_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("votesort"))
}

/// Create the data provider a config points at.
pub fn create_provider(config: &VotesortConfig) -> Box<dyn DataProvider> {
    match &config.data_path {
        Some(path) => Box::new(FileProvider::new(path)),
        None => Box::new(DatedFileProvider::today(&config.data_dir)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votesort_core::model::AnswerOrder;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_VOTESORT_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_VOTESORT_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_VOTESORT_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_VOTESORT_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_values_again() {
        std::env::set_var("_VOTESORT_SELF_REF", "${_VOTESORT_SELF_REF}");
        assert_eq!(
            resolve_env_vars("a/${_VOTESORT_SELF_REF}/b"),
            "a/${_VOTESORT_SELF_REF}/b"
        );
        std::env::remove_var("_VOTESORT_SELF_REF");

        assert_eq!(resolve_env_vars("open ${UNCLOSED"), "open ${UNCLOSED");
        assert_eq!(resolve_env_vars("${_VOTESORT_UNSET_VAR}x"), "x");
    }

    #[test]
    fn default_config() {
        let config = VotesortConfig::default();
        assert_eq!(config.variant, Variant::Rank);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.filter.min_answers, 3);
        assert!(config.seed.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
variant = "pair"
seed = 42
data_path = "data/sample_data.json"

[filter]
min_answers = 4
answer_order = "as-ingested"
"#;
        let config: VotesortConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.variant, Variant::Pair);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.filter.min_answers, 4);
        assert_eq!(config.filter.min_top_answer_chars, 10);
        assert_eq!(config.filter.answer_order, AnswerOrder::AsIngested);

        let engine = config.engine_config();
        assert_eq!(engine.variant, Variant::Pair);
        assert_eq!(engine.seed, Some(42));
    }

    #[test]
    fn explicit_missing_config_fails() {
        let err = load_config_from(Some(Path::new("/no/such/votesort.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("votesort.toml");
        std::fs::write(&path, "variant = \"rank-once\"\ndata_dir = \"daily\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.variant, Variant::RankOnce);
        assert_eq!(config.data_dir, PathBuf::from("daily"));
    }

    #[test]
    fn provider_follows_data_path() {
        let mut config = VotesortConfig::default();
        assert_eq!(create_provider(&config).name(), "dated-file");
        config.data_path = Some(PathBuf::from("data/sample_data.json"));
        assert_eq!(create_provider(&config).name(), "file");
    }
}
