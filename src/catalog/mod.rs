//! Boundary to the show catalog (myshows.me).
//!
//! The application talks to the catalog only through [`Catalog`], so the
//! dispatch and auth logic can be exercised against scripted fakes.

mod myshows;

pub use myshows::MyShowsClient;

use serde::Deserialize;
use thiserror::Error;

pub type ShowId = u64;
pub type EpisodeId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The catalog refused the token (or the credentials used to issue one).
    #[error("catalog rejected credentials: {0}")]
    Auth(String),
    #[error("catalog request failed: {0}")]
    Transient(String),
}

impl CatalogError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Show {
    pub id: ShowId,
    pub title: String,
    pub title_original: String,
    pub rating: f64,
    pub image: Option<String>,
    pub year: Option<i32>,
    pub total_seasons: Option<u32>,
    pub status: Option<String>,
    pub country: Option<String>,
    pub imdb_id: Option<u64>,
}

impl Show {
    /// Original title when the catalog has one, localized title otherwise.
    pub fn display_title(&self) -> &str {
        if self.title_original.trim().is_empty() {
            &self.title
        } else {
            &self.title_original
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowWithStatus {
    pub show: Show,
    #[serde(default)]
    pub watch_status: String,
}

/// One episode the catalog reports as newly available for a followed show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeDescriptor {
    pub show_id: ShowId,
    pub episode_id: EpisodeId,
    pub season: u32,
    pub episode: u32,
    pub episode_image: Option<String>,
    pub show_image: Option<String>,
    pub show_title: String,
}

pub trait Catalog {
    fn issue_token(
        &self,
        client_id: &str,
        client_secret: &str,
        username: &str,
        password: &str,
    ) -> Result<String, CatalogError>;

    fn fetch_show_list(&self, token: &str) -> Result<Vec<ShowWithStatus>, CatalogError>;

    fn fetch_due_episodes(&self, token: &str) -> Result<Vec<EpisodeDescriptor>, CatalogError>;

    fn set_watching(&self, token: &str, show_id: ShowId) -> Result<(), CatalogError>;

    fn search_shows(&self, query: &str) -> Result<Vec<Show>, CatalogError>;

    fn top_shows(&self, count: u32) -> Result<Vec<Show>, CatalogError>;

    fn show_by_id(&self, show_id: ShowId) -> Result<Show, CatalogError>;
}
