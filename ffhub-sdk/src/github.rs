//! Publishing the shared document to GitHub.
//!
//! Uses the repository contents API: read the current blob SHA, then PUT the
//! new base64 content with that SHA. GitHub rejects the write if the file
//! changed in between; that error is reported as-is and not retried.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::AppData;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "ffhub";

/// Sync credentials, persisted locally under the `gh_config` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

impl GitHubConfig {
    pub fn is_complete(&self) -> bool {
        !self.token.is_empty()
            && !self.owner.is_empty()
            && !self.repo.is_empty()
            && !self.path.is_empty()
    }

    fn branch(&self) -> &str {
        if self.branch.is_empty() { "main" } else { &self.branch }
    }
}

/// Result of a publish attempt, always displayable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub success: bool,
    pub message: String,
}

impl PublishOutcome {
    fn ok() -> Self {
        Self { success: true, message: "Successfully published to GitHub!".to_string() }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

#[derive(Deserialize)]
struct ContentsEntry {
    sha: String,
}

#[derive(Serialize)]
struct PutContents<'a> {
    message: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
    branch: &'a str,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

pub struct Publisher {
    config: Option<GitHubConfig>,
    api_base: String,
    http: reqwest::Client,
}

impl Publisher {
    pub fn new(config: Option<GitHubConfig>) -> Self {
        Self {
            config,
            api_base: DEFAULT_API_BASE.to_string(),
            http: crate::http_client(crate::REQUEST_TIMEOUT),
        }
    }

    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    fn config(&self) -> Result<&GitHubConfig> {
        self.config
            .as_ref()
            .filter(|c| c.is_complete())
            .ok_or(Error::MissingConfig("GitHub"))
    }

    fn contents_url(&self, cfg: &GitHubConfig) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            cfg.owner,
            cfg.repo,
            cfg.path.trim_start_matches('/')
        )
    }

    /// SHA of the file currently on the branch, `None` if it doesn't exist yet.
    pub async fn current_sha(&self) -> Result<Option<String>> {
        let cfg = self.config()?;
        let resp = self
            .http
            .get(self.contents_url(cfg))
            .query(&[("ref", cfg.branch())])
            .header("Authorization", format!("token {}", cfg.token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let entry: ContentsEntry = resp.json().await?;
            Ok(Some(entry.sha))
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            Err(Error::Metadata(status.as_u16()))
        }
    }

    /// Commit `data` as the new file contents.
    pub async fn try_publish(&self, data: &AppData) -> Result<()> {
        let cfg = self.config()?;
        let sha = self.current_sha().await?;
        let body = PutContents {
            message: format!(
                "Update tournaments via Admin Panel [{}]",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
            content: encode_content(data)?,
            sha: sha.clone(),
            branch: cfg.branch(),
        };

        tracing::info!(
            owner = %cfg.owner,
            repo = %cfg.repo,
            path = %cfg.path,
            sha = sha.as_deref().unwrap_or("<new>"),
            "Publishing tournament data"
        );

        let resp = self
            .http
            .put(self.contents_url(cfg))
            .header("Authorization", format!("token {}", cfg.token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let message = resp
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Failed to update GitHub.".to_string());
        Err(Error::Api { status: status.as_u16(), message })
    }

    /// Like [`Publisher::try_publish`], but folds every failure into a
    /// user-facing outcome.
    pub async fn publish(&self, data: &AppData) -> PublishOutcome {
        match self.try_publish(data).await {
            Ok(()) => PublishOutcome::ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Publish failed");
                match e {
                    Error::MissingConfig(_) => {
                        PublishOutcome::failed("GitHub configuration is missing.")
                    }
                    Error::Metadata(_) => {
                        PublishOutcome::failed("Failed to fetch existing file metadata.")
                    }
                    Error::Api { message, .. } => PublishOutcome::failed(message),
                    _ => PublishOutcome::failed("An unexpected error occurred during sync."),
                }
            }
        }
    }
}

/// Base64 of the pretty-printed UTF-8 JSON.
pub fn encode_content(data: &AppData) -> Result<String> {
    let json = data.to_pretty_json()?;
    Ok(base64::engine::general_purpose::STANDARD.encode(json.as_bytes()))
}
