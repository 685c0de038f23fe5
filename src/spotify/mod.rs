//! Outbound calls to the Spotify accounts service and Web API.

pub mod client;
pub mod error;
pub mod models;

pub use client::{SpotifyClient, TRACK_FIELDS};
pub use error::SpotifyError;
pub use models::{owned_playlists, Playlist, PlaylistSummary, TokenGrant, UserProfile};
