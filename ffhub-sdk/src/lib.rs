//! Client SDK for FF Hub tournament listings.
//!
//! The hub has no server of its own. Tournament data is a single
//! `tournaments.json` document that clients read through a fallback chain
//! ([`source`]) and that the admin publishes by committing it to a GitHub
//! repository ([`github`]). Everything player-specific (profile, join
//! history, sync credentials) lives in a local key-value [`store`].

pub mod admin;
pub mod error;
pub mod gemini;
pub mod github;
pub mod model;
pub mod onboarding;
pub mod registration;
pub mod source;
pub mod store;

pub use error::{Error, Result};

use std::time::Duration;

/// Upper bound for one data or GitHub request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client whose requests give up after `timeout`.
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}
