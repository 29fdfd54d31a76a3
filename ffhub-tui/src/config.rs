//! Persistent configuration for ffhub-tui.
//!
//! Config file lives at `~/.config/ffhub/tui.toml`. Player data (profile,
//! join history, GitHub credentials) is kept in the SDK store next to it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use ffhub_sdk::source::{DATA_FILE, RepoLocation};

/// Mirror read when nothing else is configured.
pub const DEFAULT_MIRROR: &str = "username/repo@main:tournaments.json";

/// User configuration (persisted in tui.toml).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Local tournaments.json, tried first. Default: ./tournaments.json
    pub local_path: Option<PathBuf>,
    /// Origin URL serving tournaments.json, tried second.
    pub origin_url: Option<String>,
    /// GitHub mirror as `owner/repo[@branch][:path]`, tried last.
    pub mirror: Option<String>,
    /// Gemini model for strategy tips.
    pub gemini_model: Option<String>,
    /// Gemini model for payment screenshot checks.
    pub gemini_image_model: Option<String>,
    /// Shared admin passcode. Admin panel is disabled when unset.
    pub admin_passcode: Option<String>,
    /// Where the player store lives.
    pub store_path: Option<PathBuf>,
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ffhub")
}

fn config_path() -> PathBuf {
    config_dir().join("tui.toml")
}

pub fn log_path() -> PathBuf {
    config_dir().join("ffhub.log")
}

impl Config {
    pub fn load() -> Self {
        let path = config_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(s) => match toml::from_str(&s) {
                    Ok(c) => return c,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Bad config file")
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Can't read config file")
                }
            }
        }
        Self::default()
    }
}

/// Effective settings after merging CLI args > config file > defaults.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub local_path: PathBuf,
    pub origin_url: Option<String>,
    pub mirror: Option<RepoLocation>,
    pub gemini_key: Option<String>,
    pub gemini_model: Option<String>,
    pub gemini_image_model: Option<String>,
    pub admin_passcode: Option<String>,
    pub store_path: PathBuf,
}

impl Resolved {
    pub fn merge(cli: &super::Cli, config: &Config) -> Self {
        let local_path = cli.data.clone()
            .or_else(|| config.local_path.clone())
            .unwrap_or_else(|| PathBuf::from(DATA_FILE));

        let origin_url = cli.origin.clone().or_else(|| config.origin_url.clone());

        let mirror_spec = cli.mirror.clone()
            .or_else(|| config.mirror.clone())
            .unwrap_or_else(|| DEFAULT_MIRROR.to_string());
        let mirror = RepoLocation::parse(&mirror_spec);
        if mirror.is_none() {
            tracing::warn!(
                mirror = %mirror_spec,
                "Ignoring malformed mirror, expected owner/repo[@branch][:path]"
            );
        }

        let admin_passcode = cli.admin_passcode.clone()
            .or_else(|| config.admin_passcode.clone());

        let store_path = cli.store.clone()
            .or_else(|| config.store_path.clone())
            .unwrap_or_else(ffhub_sdk::store::default_path);

        Self {
            local_path,
            origin_url,
            mirror,
            gemini_key: cli.gemini_key.clone().filter(|k| !k.is_empty()),
            gemini_model: config.gemini_model.clone(),
            gemini_image_model: config.gemini_image_model.clone(),
            admin_passcode,
            store_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_overrides_config() {
        let cli = crate::Cli::parse_from([
            "ffhub-tui",
            "--data",
            "/srv/t.json",
            "--mirror",
            "hub/data@live",
            "--admin-passcode",
            "cli-pass",
        ]);
        let config = Config {
            local_path: Some(PathBuf::from("cfg.json")),
            origin_url: Some("https://hub.example/tournaments.json".into()),
            mirror: Some("other/repo".into()),
            admin_passcode: Some("cfg-pass".into()),
            ..Default::default()
        };
        let r = Resolved::merge(&cli, &config);
        assert_eq!(r.local_path, PathBuf::from("/srv/t.json"));
        assert_eq!(r.origin_url.as_deref(), Some("https://hub.example/tournaments.json"));
        assert_eq!(r.mirror, Some(RepoLocation::new("hub", "data", "live", "tournaments.json")));
        assert_eq!(r.admin_passcode.as_deref(), Some("cli-pass"));
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cli = crate::Cli::parse_from(["ffhub-tui"]);
        let r = Resolved::merge(&cli, &Config::default());
        assert_eq!(r.local_path, PathBuf::from("tournaments.json"));
        assert_eq!(r.mirror, RepoLocation::parse(DEFAULT_MIRROR));
        assert!(r.origin_url.is_none());
    }

    #[test]
    fn malformed_mirror_is_dropped() {
        let cli = crate::Cli::parse_from(["ffhub-tui", "--mirror", "not-a-repo"]);
        let r = Resolved::merge(&cli, &Config::default());
        assert!(r.mirror.is_none());
    }

    #[test]
    fn config_parses_from_toml() {
        let c: Config = toml::from_str(
            "origin_url = \"https://hub.example/tournaments.json\"\nadmin_passcode = \"x\"\n\
             gemini_image_model = \"vision\"\n",
        )
        .unwrap();
        assert_eq!(c.admin_passcode.as_deref(), Some("x"));
        let r = Resolved::merge(&crate::Cli::parse_from(["ffhub-tui"]), &c);
        assert_eq!(r.gemini_image_model.as_deref(), Some("vision"));
        assert!(r.gemini_model.is_none());
        assert!(c.mirror.is_none());
    }
}
