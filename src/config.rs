use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::filter::FilterPolicy;
use crate::resolve::RelationOptions;
use crate::store::parse_source;
use crate::walk::WalkMode;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "WOF_GRAPH_CONFIG";

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "wof-graph.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub relations: RelationsConfig,
}

/// Walk and output settings
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Record sources used to resolve parents and related records
    /// (`fs://<path>` or a bare path). Empty means "the walked repos".
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Derive node colours from record content
    #[serde(default = "default_true")]
    pub styled: bool,
    /// Abort the walk on the first record that fails to load
    #[serde(default = "default_true")]
    pub fail_fast: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            sources: Vec::new(),
            workers: default_workers(),
            cache_capacity: default_cache_capacity(),
            styled: true,
            fail_fast: true,
        }
    }
}

/// Record admission settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    /// Placetypes to leave out
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Only include records belonging to one of these IDs
    #[serde(default)]
    pub belongs_to: Vec<i64>,
    #[serde(default)]
    pub exclude_ceased: bool,
}

/// Supersession settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelationsConfig {
    #[serde(default)]
    pub supersedes: bool,
    #[serde(default)]
    pub superseded_by: bool,
    #[serde(default)]
    pub recursive: bool,
}

fn default_mode() -> String {
    "repo".to_string()
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_cache_capacity() -> usize {
    10_000
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) first.
    /// Looks for a config file in this order:
    /// 1. `explicit` (must exist)
    /// 2. Path in the WOF_GRAPH_CONFIG environment variable (must exist)
    /// 3. ./wof-graph.toml, if present
    ///
    /// Falls back to defaults when no file is found. The result is not
    /// validated; call [`Config::validate`] after applying overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let _ = dotenv::dotenv();

        let config_path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        Ok(config)
    }

    /// Parse a config file without validating it
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.mode()?;

        if self.graph.workers == 0 {
            anyhow::bail!("graph.workers must be greater than 0");
        }

        for source in &self.graph.sources {
            parse_source(source).with_context(|| format!("Invalid source: {}", source))?;
        }

        Ok(())
    }

    pub fn mode(&self) -> Result<WalkMode> {
        Ok(self.graph.mode.parse::<WalkMode>()?)
    }

    pub fn filter_policy(&self) -> FilterPolicy {
        FilterPolicy::new(
            self.filter.exclude.iter().cloned(),
            self.filter.belongs_to.iter().copied(),
            self.filter.exclude_ceased,
        )
    }

    pub fn relation_options(&self) -> RelationOptions {
        RelationOptions {
            supersedes: self.relations.supersedes,
            superseded_by: self.relations.superseded_by,
            recursive: self.relations.recursive,
        }
    }
}
