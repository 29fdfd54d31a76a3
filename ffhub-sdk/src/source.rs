//! Tournament data loading.
//!
//! Sources are tried in order: a local `tournaments.json`, the origin URL,
//! then the raw copy in the GitHub mirror. The first one that answers with a
//! document that parses wins. If none does, the built-in dataset is used, so
//! loading never fails.

use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::model::AppData;

/// Default file name of the shared document.
pub const DATA_FILE: &str = "tournaments.json";

/// A file inside a GitHub repository at a given branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl RepoLocation {
    pub fn new(owner: &str, repo: &str, branch: &str, path: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            path: path.trim_start_matches('/').to_string(),
        }
    }

    /// Parse `owner/repo[@branch][:path]`. Branch defaults to `main`, path
    /// to `tournaments.json`.
    pub fn parse(spec: &str) -> Option<Self> {
        let (head, path) = match spec.split_once(':') {
            Some((h, p)) if !p.is_empty() => (h, p),
            Some((h, _)) => (h, DATA_FILE),
            None => (spec, DATA_FILE),
        };
        let (repo_part, branch) = match head.split_once('@') {
            Some((r, b)) if !b.is_empty() => (r, b),
            Some((r, _)) => (r, "main"),
            None => (head, "main"),
        };
        let (owner, repo) = repo_part.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self::new(owner, repo, branch, path))
    }

    pub fn raw_url(&self) -> String {
        self.raw_url_with_base("https://raw.githubusercontent.com")
    }

    pub fn raw_url_with_base(&self, base: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.branch,
            self.path
        )
    }
}

impl fmt::Display for RepoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}:{}", self.owner, self.repo, self.branch, self.path)
    }
}

/// One link in the fallback chain.
#[derive(Debug, Clone)]
pub enum Source {
    LocalFile(PathBuf),
    Url(String),
    Mirror {
        location: RepoLocation,
        /// Raw-content host. `None` means raw.githubusercontent.com.
        raw_base: Option<String>,
    },
}

impl Source {
    pub fn mirror(location: RepoLocation) -> Self {
        Source::Mirror { location, raw_base: None }
    }

    fn describe(&self) -> String {
        match self {
            Source::LocalFile(p) => p.display().to_string(),
            Source::Url(u) => u.clone(),
            Source::Mirror { location, raw_base } => match raw_base {
                Some(base) => location.raw_url_with_base(base),
                None => location.raw_url(),
            },
        }
    }
}

/// Where the loaded data came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Local(PathBuf),
    Remote(String),
    Fallback,
}

impl Origin {
    pub fn label(&self) -> String {
        match self {
            Origin::Local(p) => format!("local {}", p.display()),
            Origin::Remote(u) => format!("remote {u}"),
            Origin::Fallback => "built-in data".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub data: AppData,
    pub origin: Origin,
}

/// Ordered list of sources sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct SourceChain {
    http: reqwest::Client,
    sources: Vec<Source>,
}

impl Default for SourceChain {
    fn default() -> Self {
        Self::new(crate::http_client(crate::REQUEST_TIMEOUT))
    }
}

impl SourceChain {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http, sources: Vec::new() }
    }

    /// Local file, then origin URL (if any), then the mirror.
    pub fn standard(
        local: PathBuf,
        origin_url: Option<String>,
        mirror: Option<RepoLocation>,
    ) -> Self {
        let mut chain = Self::default().push(Source::LocalFile(local));
        if let Some(url) = origin_url {
            chain = chain.push(Source::Url(url));
        }
        if let Some(location) = mirror {
            chain = chain.push(Source::mirror(location));
        }
        chain
    }

    pub fn push(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Walk the chain. Never fails: exhausting it yields the built-in data.
    pub async fn load(&self) -> Loaded {
        for source in &self.sources {
            match self.fetch(source).await {
                Ok(data) => {
                    tracing::info!(
                        source = %source.describe(),
                        tournaments = data.tournaments.len(),
                        "Loaded tournament data"
                    );
                    let origin = match source {
                        Source::LocalFile(p) => Origin::Local(p.clone()),
                        other => Origin::Remote(other.describe()),
                    };
                    return Loaded { data, origin };
                }
                Err(e) => {
                    tracing::warn!(
                        source = %source.describe(),
                        error = %e,
                        "Data source unavailable"
                    );
                }
            }
        }
        tracing::warn!("Using built-in data as fail-safe");
        Loaded { data: AppData::fallback(), origin: Origin::Fallback }
    }

    /// Fetch and parse a single source.
    pub async fn fetch(&self, source: &Source) -> Result<AppData> {
        let body = match source {
            Source::LocalFile(path) => tokio::fs::read_to_string(path).await?,
            Source::Url(_) | Source::Mirror { .. } => self.fetch_url(&source.describe()).await?,
        };
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_url(&self, url: &str) -> Result<String> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: format!("GET {url}"),
            });
        }
        Ok(resp.text().await?)
    }
}
