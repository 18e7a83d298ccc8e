use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub const DEFAULT_DICTIONARY_PATH: &str = "ReverseLookupDictionary.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "account_items.csv";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;

#[derive(Clone, Debug)]
pub struct LookupConfig {
    pub database_url: String,
    pub dictionary_path: PathBuf,
    pub output_path: PathBuf,
    /// WHATWG label such as `shift_jis`; BOM sniffing with UTF-8 fallback when unset.
    pub dictionary_encoding: Option<String>,
    pub max_connections: u32,
}

impl LookupConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow!("DATABASE_URL environment variable not set"))?;

        let dictionary_path = PathBuf::from(
            var("REVERSE_DICTIONARY_PATH").unwrap_or_else(|| DEFAULT_DICTIONARY_PATH.to_string()),
        );

        let output_path = PathBuf::from(
            var("REVERSE_LOOKUP_OUTPUT").unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
        );

        let dictionary_encoding = var("REVERSE_DICTIONARY_ENCODING").filter(|e| !e.is_empty());

        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse()
                .map_err(|e| anyhow!("invalid DATABASE_MAX_CONNECTIONS `{}`: {}", value, e))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            dictionary_path,
            output_path,
            dictionary_encoding,
            max_connections,
        })
    }

    /// Command line values win over the environment.
    pub fn with_overrides(
        mut self,
        dictionary_path: Option<PathBuf>,
        output_path: Option<PathBuf>,
        dictionary_encoding: Option<String>,
    ) -> Self {
        if let Some(path) = dictionary_path {
            self.dictionary_path = path;
        }
        if let Some(path) = output_path {
            self.output_path = path;
        }
        if dictionary_encoding.is_some() {
            self.dictionary_encoding = dictionary_encoding;
        }
        self
    }
}
