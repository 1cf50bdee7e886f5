use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use super::{Catalog, CatalogError, EpisodeDescriptor, Show, ShowId, ShowWithStatus};
use crate::http::{self, HttpFailure};

const TOKEN_URL: &str = "https://myshows.me/oauth/token";
const RPC_URL: &str = "https://myshows.me/v2/rpc/";

/// JSON-RPC client for the myshows.me v2 API.
pub struct MyShowsClient {
    agent: ureq::Agent,
    token_url: String,
    rpc_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DueEpisode {
    episode: EpisodeRecord,
    show: Show,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeRecord {
    id: u64,
    #[serde(default)]
    season_number: u32,
    #[serde(default)]
    episode_number: u32,
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopEntry {
    show: Show,
}

impl MyShowsClient {
    pub fn new() -> Self {
        Self::with_endpoints(TOKEN_URL, RPC_URL)
    }

    pub fn with_endpoints(token_url: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            agent: http::build_agent(),
            token_url: token_url.into(),
            rpc_url: rpc_url.into(),
        }
    }

    fn rpc<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        token: Option<&str>,
    ) -> Result<T, CatalogError> {
        debug!(method, "calling myshows rpc");
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });
        let raw = http::post_json(&self.agent, &self.rpc_url, token, &request)
            .map_err(|failure| classify_failure(method, failure))?;
        let response: RpcResponse<T> = serde_json::from_str(&raw).map_err(|err| {
            CatalogError::Transient(format!("{method}: malformed response: {err}"))
        })?;

        if let Some(error) = response.error {
            let detail = format!("{method}: rpc error {} ({})", error.code, error.message);
            return Err(if is_auth_status(error.code) {
                CatalogError::Auth(detail)
            } else {
                CatalogError::Transient(detail)
            });
        }
        response
            .result
            .ok_or_else(|| CatalogError::Transient(format!("{method}: response has no result")))
    }
}

impl Default for MyShowsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog for MyShowsClient {
    fn issue_token(
        &self,
        client_id: &str,
        client_secret: &str,
        username: &str,
        password: &str,
    ) -> Result<String, CatalogError> {
        let fields = [
            ("grant_type", "password"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("username", username),
            ("password", password),
        ];
        let raw = http::post_form(&self.agent, &self.token_url, &fields).map_err(|failure| {
            match failure.status() {
                Some(400 | 401 | 403) => CatalogError::Auth(format!("token request: {failure}")),
                _ => CatalogError::Transient(format!("token request: {failure}")),
            }
        })?;
        let token: TokenResponse = serde_json::from_str(&raw).map_err(|err| {
            CatalogError::Transient(format!("token request: malformed response: {err}"))
        })?;
        Ok(token.access_token)
    }

    fn fetch_show_list(&self, token: &str) -> Result<Vec<ShowWithStatus>, CatalogError> {
        self.rpc("profile.Shows", json!({}), Some(token))
    }

    fn fetch_due_episodes(&self, token: &str) -> Result<Vec<EpisodeDescriptor>, CatalogError> {
        let due: Vec<DueEpisode> =
            self.rpc("lists.Episodes", json!({ "list": "next" }), Some(token))?;
        Ok(due.into_iter().map(DueEpisode::into_descriptor).collect())
    }

    fn set_watching(&self, token: &str, show_id: ShowId) -> Result<(), CatalogError> {
        let _: Value = self.rpc(
            "manage.SetShowStatus",
            json!({ "id": show_id, "status": "watching" }),
            Some(token),
        )?;
        Ok(())
    }

    fn search_shows(&self, query: &str) -> Result<Vec<Show>, CatalogError> {
        self.rpc("shows.Search", json!({ "query": { "search": query } }), None)
    }

    fn top_shows(&self, count: u32) -> Result<Vec<Show>, CatalogError> {
        let top: Vec<TopEntry> =
            self.rpc("shows.Top", json!({ "mode": "all", "count": count }), None)?;
        Ok(top.into_iter().map(|entry| entry.show).collect())
    }

    fn show_by_id(&self, show_id: ShowId) -> Result<Show, CatalogError> {
        self.rpc(
            "shows.GetById",
            json!({ "showId": show_id, "withEpisodes": false }),
            None,
        )
    }
}

impl DueEpisode {
    fn into_descriptor(self) -> EpisodeDescriptor {
        let show_title = if self.show.title.trim().is_empty() {
            self.show.title_original
        } else {
            self.show.title
        };
        EpisodeDescriptor {
            show_id: self.show.id,
            episode_id: self.episode.id,
            season: self.episode.season_number,
            episode: self.episode.episode_number,
            episode_image: non_empty(self.episode.image),
            show_image: non_empty(self.show.image),
            show_title,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|url| !url.trim().is_empty())
}

fn is_auth_status(code: i64) -> bool {
    code == 401 || code == 403
}

fn classify_failure(method: &str, failure: HttpFailure) -> CatalogError {
    match failure.status() {
        Some(status) if is_auth_status(i64::from(status)) => {
            CatalogError::Auth(format!("{method}: {failure}"))
        }
        _ => CatalogError::Transient(format!("{method}: {failure}")),
    }
}
