//! Settings read from the environment.

use std::env;
use std::fmt::{self, Debug};
use std::str::FromStr;
use std::time::Duration;

use record_clerk_openai_model::{OpenAIConfig, OpenAIConfigBuilder};

use crate::catalog::CatalogSource;

/// The upstream Chinook script, used when no catalog is configured.
pub const DEFAULT_CATALOG_URL: &str = "https://raw.githubusercontent.com/lerocha/chinook-database/master/ChinookDatabase/DataSources/Chinook_Sqlite.sql";

const DEFAULT_MODEL: &str = "gpt-4o";

/// Errors in the environment settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
    /// A variable is not a valid number.
    #[error("{name} must be a positive integer, got `{value}`")]
    InvalidNumber {
        /// The variable name.
        name: &'static str,
        /// The value that was set.
        value: String,
    },
}

/// The application settings.
#[derive(Clone)]
pub struct Config {
    /// The OpenAI API key.
    pub api_key: String,
    /// A custom OpenAI-compatible endpoint.
    pub base_url: Option<String>,
    /// The model name.
    pub model: String,
    /// Where the catalog is loaded from.
    pub catalog: CatalogSource,
    /// How long a model turn may take.
    pub model_timeout: Option<Duration>,
    /// How long a tool call may take.
    pub tool_timeout: Option<Duration>,
    /// The maximum number of model turns per user message.
    pub max_turns: Option<usize>,
}

impl Config {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the settings with a custom variable lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let api_key = var("OPENAI_API_KEY")
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;
        let catalog = var("RECORD_CLERK_CATALOG")
            .map(|location| CatalogSource::parse(&location))
            .unwrap_or_else(|| {
                CatalogSource::Url(DEFAULT_CATALOG_URL.to_owned())
            });

        let model_secs = parse_number(&var, "RECORD_CLERK_MODEL_TIMEOUT_SECS")?;
        let tool_secs = parse_number(&var, "RECORD_CLERK_TOOL_TIMEOUT_SECS")?;

        Ok(Self {
            api_key,
            base_url: var("OPENAI_BASE_URL"),
            model: var("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            catalog,
            model_timeout: model_secs.map(Duration::from_secs),
            tool_timeout: tool_secs.map(Duration::from_secs),
            max_turns: parse_number(&var, "RECORD_CLERK_MAX_TURNS")?,
        })
    }

    /// Returns the configuration of the OpenAI provider.
    pub fn openai_config(&self) -> OpenAIConfig {
        let mut builder = OpenAIConfigBuilder::with_api_key(&self.api_key)
            .with_model(&self.model);
        if let Some(base_url) = &self.base_url {
            builder = builder.with_base_url(base_url);
        }
        builder.build()
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("catalog", &self.catalog)
            .field("model_timeout", &self.model_timeout)
            .field("tool_timeout", &self.tool_timeout)
            .field("max_turns", &self.max_turns)
            .finish()
    }
}

fn parse_number<T, F>(
    var: &F,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr + PartialEq + Default,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = var(name) else {
        return Ok(None);
    };
    match value.trim().parse::<T>() {
        Ok(number) if number != T::default() => Ok(Some(number)),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}
