//! Layered configuration.
//!
//! Built-in defaults, then a TOML file, then `QA_*` environment variables
//! (`__` separates nested keys, e.g. `QA_SERVER__PORT=9000`).

use crate::composer::ComposerConfig;
use crate::retriever::RetrieverConfig;
use anyhow::{Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LOCAL_CONFIG_FILE: &str = "college-qa.toml";
const ENV_PREFIX: &str = "QA_";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub client: ClientSettings,
    pub documents: DocumentSettings,
    pub retrieval: RetrievalSettings,
    pub composer: ComposerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientSettings {
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocumentSettings {
    pub dir: PathBuf,
    /// Approximate chunk size in characters; 0 keeps whole files.
    pub chunk_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalSettings {
    pub max_features: usize,
    pub top_k: usize,
    pub min_similarity: f32,
    pub boilerplate: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ComposerSettings {
    pub max_passages: usize,
    pub max_chars: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000".to_string(),
        }
    }
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("docs"),
            chunk_chars: 0,
        }
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        let defaults = RetrieverConfig::default();
        Self {
            max_features: defaults.max_features,
            top_k: defaults.top_k,
            min_similarity: defaults.min_similarity,
            boilerplate: defaults.boilerplate,
        }
    }
}

impl Default for ComposerSettings {
    fn default() -> Self {
        let defaults = ComposerConfig::default();
        Self {
            max_passages: defaults.max_passages,
            max_chars: defaults.max_chars,
        }
    }
}

impl Settings {
    /// Loads settings from `path` if given, otherwise from the first config
    /// file found in the working directory or the user config dir.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                if !path.exists() {
                    bail!("config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => default_config_file(),
        };
        Self::from_figment(Self::figment(file.as_deref()))
    }

    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.retrieval.max_features == 0 {
            bail!("retrieval.max_features must be greater than zero");
        }
        if self.retrieval.top_k == 0 {
            bail!("retrieval.top_k must be greater than zero");
        }
        if self.composer.max_passages == 0 {
            bail!("composer.max_passages must be greater than zero");
        }
        if self.composer.max_chars == 0 {
            bail!("composer.max_chars must be greater than zero");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn retriever_config(&self) -> RetrieverConfig {
        RetrieverConfig {
            max_features: self.retrieval.max_features,
            top_k: self.retrieval.top_k,
            min_similarity: self.retrieval.min_similarity,
            boilerplate: self.retrieval.boilerplate.clone(),
        }
    }

    pub fn composer_config(&self) -> ComposerConfig {
        ComposerConfig {
            max_passages: self.composer.max_passages,
            max_chars: self.composer.max_chars,
        }
    }
}

fn default_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("college-qa").join("config.toml"))
        .filter(|path| path.exists())
}
