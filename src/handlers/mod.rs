pub mod spotify_auth;
pub mod tracks;
