use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful answer of the token endpoint, for both grant types.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Absent on refresh grants unless the refresh token was rotated.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// The subset of `GET /me` the relay needs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PlaylistPage {
    #[serde(default)]
    pub items: Vec<Playlist>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    #[serde(default)]
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlaylistOwner {
    pub id: String,
}

impl Playlist {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner.as_ref().is_some_and(|owner| owner.id == user_id)
    }
}

/// The reduced shape handed back to the browser for each playlist.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub name: String,
    pub id: String,
    pub href: String,
}

impl From<Playlist> for PlaylistSummary {
    fn from(playlist: Playlist) -> Self {
        PlaylistSummary {
            name: playlist.name,
            id: playlist.id,
            href: playlist.href,
        }
    }
}

/// Track items are forwarded without reshaping, so they stay untyped.
#[derive(Deserialize, Debug, Clone)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<Value>,
}

/// Keeps the playlists owned by `user_id`, reduced to `{name, id, href}`.
pub fn owned_playlists(playlists: Vec<Playlist>, user_id: &str) -> Vec<PlaylistSummary> {
    playlists
        .into_iter()
        .filter(|p| p.is_owned_by(user_id))
        .map(PlaylistSummary::from)
        .collect()
}
