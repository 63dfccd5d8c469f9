use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

const API_PREFIX: &str = "/api/v3";
const QUALITY_PROFILE_ID: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    pub fn resource(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "show",
        }
    }

    pub fn service_name(self) -> &'static str {
        match self {
            MediaKind::Movie => "Radarr",
            MediaKind::Series => "Sonarr",
        }
    }

    pub fn add_payload(self, found: &Map<String, Value>, root_path: &str) -> Value {
        let field = |name: &str| found.get(name).cloned().unwrap_or(Value::Null);
        let mut payload = json!({
            "title": field("title"),
            "titleSlug": field("titleSlug"),
            "images": field("images"),
            "rootFolderPath": root_path,
            "monitored": true,
            "qualityProfileId": QUALITY_PROFILE_ID,
        });
        let extra = match self {
            MediaKind::Movie => json!({
                "tmdbId": field("tmdbId"),
                "year": field("year"),
                "addOptions": { "searchForMovie": true },
            }),
            MediaKind::Series => json!({
                "seasons": field("seasons"),
                "addOptions": { "searchForMissingEpisodes": true },
            }),
        };
        if let (Some(base), Value::Object(extra)) = (payload.as_object_mut(), extra) {
            base.extend(extra);
        }
        payload
    }
}

#[derive(Error, Debug)]
pub enum ArrError {
    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("lookup response is not a JSON list: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("lookup returned no results")]
    NoResults,

    #[error("{0} did not accept the add request")]
    AddRejected(&'static str),
}

#[async_trait]
pub trait ArrApi: Send + Sync {
    // Status is not inspected; only transport failures are errors.
    async fn lookup(&self, term: &str) -> Result<Vec<u8>, ArrError>;
    async fn add(&self, payload: &Value) -> bool;
}

#[derive(Debug, Clone)]
pub struct ArrClient {
    client: Client,
    kind: MediaKind,
    base_url: String,
    api_key: String,
}

impl ArrClient {
    pub fn new(client: Client, kind: MediaKind, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            kind,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn resource_url(&self) -> String {
        format!("{}{API_PREFIX}/{}", self.base_url, self.kind.resource())
    }

    fn lookup_url(&self, term: &str) -> String {
        format!(
            "{}/lookup?term={}",
            self.resource_url(),
            urlencoding::encode(term)
        )
    }

    fn transport(&self, source: reqwest::Error) -> ArrError {
        ArrError::Transport {
            service: self.kind.service_name(),
            source,
        }
    }
}

#[async_trait]
impl ArrApi for ArrClient {
    async fn lookup(&self, term: &str) -> Result<Vec<u8>, ArrError> {
        let url = self.lookup_url(term);
        debug!("GET {}", url);
        let res = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let status = res.status();
        let body = res.bytes().await.map_err(|e| self.transport(e))?;
        debug!(
            "{} lookup for '{}' -> {} ({} bytes)",
            self.kind.service_name(),
            term,
            status,
            body.len()
        );
        Ok(body.to_vec())
    }

    async fn add(&self, payload: &Value) -> bool {
        let url = self.resource_url();
        debug!("POST {}", url);
        let res = match self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(payload)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                warn!("{}", self.transport(e));
                return false;
            }
        };
        let status = res.status();
        if status.is_success() {
            return true;
        }
        let text = res.text().await.unwrap_or_default();
        warn!(
            "{} rejected add with status {}: {}",
            self.kind.service_name(),
            status,
            text
        );
        false
    }
}

pub fn first_result(body: &[u8]) -> Result<Map<String, Value>, ArrError> {
    let results: Vec<Map<String, Value>> = serde_json::from_slice(body)?;
    results.into_iter().next().ok_or(ArrError::NoResults)
}
