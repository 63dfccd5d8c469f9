use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TV_ROOT: &str = "/media/tv";
pub const DEFAULT_MOVIE_ROOT: &str = "/media/movies";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("decoding YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("missing {0} URL or API key")]
    MissingService(&'static str),

    #[error("{0} root path is required")]
    MissingRootPath(&'static str),
}

#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub url: String,
    pub api: String,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api = if self.api.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("ServiceConfig")
            .field("url", &self.url)
            .field("api", &api)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(rename = "tvRootPath")]
    pub tv_root_path: String,
    #[serde(rename = "movieRootPath")]
    pub movie_root_path: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sonarr: ServiceConfig,
    pub radarr: ServiceConfig,
    pub paths: PathsConfig,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match path {
            Some(p) if !p.as_os_str().is_empty() => Self::from_file(p)?,
            _ => Self::default(),
        };
        cfg.apply_env(lookup);
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    // Environment wins over the file; empty variables are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut String); 6] = [
            ("SONARR_URL", &mut self.sonarr.url),
            ("SONARR_API", &mut self.sonarr.api),
            ("RADARR_URL", &mut self.radarr.url),
            ("RADARR_API", &mut self.radarr.api),
            ("TV_ROOT_PATH", &mut self.paths.tv_root_path),
            ("MOVIE_ROOT_PATH", &mut self.paths.movie_root_path),
        ];
        for (key, slot) in fields {
            if let Some(v) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = v;
            }
        }
    }

    pub fn normalize(&mut self) {
        for s in [
            &mut self.sonarr.url,
            &mut self.sonarr.api,
            &mut self.radarr.url,
            &mut self.radarr.api,
            &mut self.paths.tv_root_path,
            &mut self.paths.movie_root_path,
        ] {
            *s = s.trim().to_string();
        }

        for url in [&mut self.sonarr.url, &mut self.radarr.url] {
            let trimmed_len = url.trim_end_matches('/').len();
            url.truncate(trimmed_len);
        }

        if self.paths.tv_root_path.is_empty() {
            self.paths.tv_root_path = DEFAULT_TV_ROOT.to_string();
        }
        if self.paths.movie_root_path.is_empty() {
            self.paths.movie_root_path = DEFAULT_MOVIE_ROOT.to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sonarr.url.is_empty() || self.sonarr.api.is_empty() {
            return Err(ConfigError::MissingService("Sonarr"));
        }
        if self.radarr.url.is_empty() || self.radarr.api.is_empty() {
            return Err(ConfigError::MissingService("Radarr"));
        }
        if self.paths.tv_root_path.is_empty() {
            return Err(ConfigError::MissingRootPath("TV"));
        }
        if self.paths.movie_root_path.is_empty() {
            return Err(ConfigError::MissingRootPath("Movie"));
        }
        Ok(())
    }
}
