use crate::arr::{first_result, ArrApi, ArrClient, ArrError, MediaKind};
use crate::command::{parse_command, Command};
use crate::config::Config;
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};

pub const USAGE: &str = "Use: Request <title> or Request movie: <title>";

#[derive(Clone)]
pub struct Library {
    pub kind: MediaKind,
    pub api: Arc<dyn ArrApi>,
    pub root_path: String,
}

impl Library {
    pub fn new(kind: MediaKind, api: Arc<dyn ArrApi>, root_path: impl Into<String>) -> Self {
        Self {
            kind,
            api,
            root_path: root_path.into(),
        }
    }

    pub async fn add_title(&self, title: &str) -> Result<(), ArrError> {
        let body = self.api.lookup(title).await?;
        let found = first_result(&body)?;
        let payload = self.kind.add_payload(&found, &self.root_path);
        if self.api.add(&payload).await {
            Ok(())
        } else {
            Err(ArrError::AddRejected(self.kind.service_name()))
        }
    }
}

#[derive(Clone)]
pub struct Relay {
    series: Library,
    movies: Library,
}

impl Relay {
    pub fn new(series: Library, movies: Library) -> Self {
        Self { series, movies }
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        let sonarr = ArrClient::new(
            client.clone(),
            MediaKind::Series,
            &config.sonarr.url,
            &config.sonarr.api,
        );
        let radarr = ArrClient::new(
            client,
            MediaKind::Movie,
            &config.radarr.url,
            &config.radarr.api,
        );
        Self::new(
            Library::new(
                MediaKind::Series,
                Arc::new(sonarr),
                config.paths.tv_root_path.clone(),
            ),
            Library::new(
                MediaKind::Movie,
                Arc::new(radarr),
                config.paths.movie_root_path.clone(),
            ),
        )
    }

    pub fn library(&self, kind: MediaKind) -> &Library {
        match kind {
            MediaKind::Movie => &self.movies,
            MediaKind::Series => &self.series,
        }
    }

    pub async fn reply(&self, message: &str) -> String {
        let (kind, title) = match parse_command(message) {
            Command::Help => return USAGE.to_string(),
            Command::Request { kind, title } => (kind, title),
        };

        match self.library(kind).add_title(&title).await {
            Ok(()) => {
                info!("Added {} '{}'", kind.noun(), title);
                added_text(kind, &title)
            }
            Err(e) => {
                warn!("Request for {} '{}' failed: {}", kind.noun(), title, e);
                not_found_text(kind, &title)
            }
        }
    }
}

pub fn added_text(kind: MediaKind, title: &str) -> String {
    match kind {
        MediaKind::Movie => format!("Movie '{}' added!", title),
        MediaKind::Series => format!("Show '{}' added", title),
    }
}

pub fn not_found_text(kind: MediaKind, title: &str) -> String {
    format!("Could not find {} '{}'", kind.noun(), title)
}
