//! Spotify integration: OAuth2 credential lifecycle and the
//! recently-played history fetch.

pub mod client;
pub mod endpoints;
pub mod history;

pub use client::SpotifyClient;
pub use history::{PlayEvent, RecentlyPlayedPage};
