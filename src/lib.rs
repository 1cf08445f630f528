pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod router;
pub mod service;
pub mod spotify;

pub use error::VaultError;
pub use spotify::client::SpotifyClient;
