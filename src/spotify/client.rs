use std::time::Duration;

use http::StatusCode;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::SpotifyError;
use super::models::{Playlist, PlaylistPage, TokenGrant, TrackPage, UserProfile};
use crate::config::SpotifyConfig;

/// Field selection sent with every playlist-tracks request.
pub const TRACK_FIELDS: &str = "items(track(name,href,album(name,href)))";

/// Thin client over the accounts service and the Web API.
///
/// Holds one `reqwest::Client` so connections are pooled across requests.
pub struct SpotifyClient {
    http: reqwest::Client,
    config: SpotifyConfig,
}

impl SpotifyClient {
    pub fn new(config: &SpotifyConfig, timeout: Duration) -> Result<Self, SpotifyError> {
        info!(
            "Creating Spotify client for accounts='{}', api='{}'",
            config.accounts_url, config.api_url
        );
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Joins path segments onto a base URL, percent-encoding each segment.
    fn endpoint(base: &str, segments: &[&str]) -> Result<Url, SpotifyError> {
        let mut url = Url::parse(base).map_err(|e| SpotifyError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SpotifyError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Builds the URL the user agent is sent to for consent.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<String, SpotifyError> {
        let mut url = Self::endpoint(&self.config.accounts_url, &["authorize"])?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("scope", &self.config.scope)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state);
        Ok(url.into())
    }

    /// Exchanges an authorization code for an access/refresh token pair.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenGrant, SpotifyError> {
        debug!("Exchanging authorization code for redirect_uri='{}'", redirect_uri);
        self.request_token(&[
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    /// Trades a refresh token for a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, SpotifyError> {
        debug!("Requesting access token with refresh grant");
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenGrant, SpotifyError> {
        let url = Self::endpoint(&self.config.accounts_url, &["api", "token"])?;
        let resp = self
            .http
            .post(url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.json::<Value>().await.ok();
            warn!("Token endpoint responded with status {}", status);
            return Err(SpotifyError::TokenRejected { status, body });
        }

        resp.json::<TokenGrant>()
            .await
            .map_err(|e| SpotifyError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        access_token: &str,
    ) -> Result<T, SpotifyError> {
        debug!("GET {}", url.path());
        let resp = self.http.get(url).bearer_auth(access_token).send().await?;

        let status = resp.status();
        match status {
            s if s == StatusCode::UNAUTHORIZED || s == StatusCode::BAD_REQUEST => {
                Err(SpotifyError::Unauthorized(s))
            }
            s if !s.is_success() => Err(SpotifyError::Upstream(s)),
            _ => resp
                .json::<T>()
                .await
                .map_err(|e| SpotifyError::Decode(e.to_string())),
        }
    }

    /// `GET /me`
    pub async fn current_user(&self, access_token: &str) -> Result<UserProfile, SpotifyError> {
        let url = Self::endpoint(&self.config.api_url, &["me"])?;
        self.get_json(url, access_token).await
    }

    /// `GET /me/playlists`
    pub async fn playlists(&self, access_token: &str) -> Result<Vec<Playlist>, SpotifyError> {
        let url = Self::endpoint(&self.config.api_url, &["me", "playlists"])?;
        let page: PlaylistPage = self.get_json(url, access_token).await?;
        Ok(page.items)
    }

    /// `GET /playlists/{id}/tracks` restricted to [`TRACK_FIELDS`].
    pub async fn playlist_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
    ) -> Result<Vec<Value>, SpotifyError> {
        let mut url = Self::endpoint(&self.config.api_url, &["playlists", playlist_id, "tracks"])?;
        url.query_pairs_mut().append_pair("fields", TRACK_FIELDS);
        let page: TrackPage = self.get_json(url, access_token).await?;
        Ok(page.items)
    }
}
