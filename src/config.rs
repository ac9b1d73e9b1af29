//! Bot configuration
//!
//! Settings come from a TOML file (`--config`, else
//! `~/.config/reviewbot/config.toml`), then environment secrets, then
//! command-line flags. Validation happens when the pieces are resolved, so
//! a bad configuration fails before any request is touched.
//!
//! ```toml
//! [api]
//! platform = "obs"
//! url = "https://api.opensuse.org"
//! username = "factory-auto"
//!
//! [review]
//! group = "factory-auto"
//! mode = "fallback-onfail"
//! fallback_group = "factory-staging"
//!
//! [projects."openSUSE:Factory"]
//! request-age-min = 1800
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::http::Auth;
use crate::core::models::{ReviewMode, ReviewerIdentity};
use crate::core::services::engine::{DEFAULT_AGE_MIN_KEY, EngineConfig};
use crate::paths;

/// Environment variable overriding `[api] password`
pub const PASSWORD_ENV: &str = "REVIEWBOT_PASSWORD";
/// Environment variable overriding `[api] token`
pub const TOKEN_ENV: &str = "REVIEWBOT_TOKEN";

/// Fatal configuration problems
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("cannot read config {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML for [`Settings`]
    #[error("invalid config {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
    /// No API endpoint configured
    #[error("missing API URL (set [api] url or pass --apiurl)")]
    MissingApiUrl,
    /// Neither user nor group (nor API username) to review as
    #[error("missing reviewer (user or group)")]
    MissingReviewer,
    /// A fallback mode without anyone to fall back to
    #[error("review mode {0} needs --fallback-user or --fallback-group")]
    MissingFallback(ReviewMode),
    /// `[api] platform` names no known backend
    #[error("unknown platform {0:?} (use: obs, gitea, action)")]
    UnknownPlatform(String),
}

/// Which backend talks to the review platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    /// Open Build Service
    Obs,
    /// Gitea
    Gitea,
    /// CI workflow reviewing the pull request that triggered it
    Action,
}


impl std::str::FromStr for PlatformKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "obs" => Ok(Self::Obs),
            "gitea" => Ok(Self::Gitea),
            "action" => Ok(Self::Action),
            _ => Err(ConfigError::UnknownPlatform(s.to_string())),
        }
    }
}

/// `[api]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// `obs`, `gitea` or `action`
    pub platform: String,
    /// API root
    pub url: Option<String>,
    /// Login; also the default reviewer user
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
    /// Token (gitea)
    pub token: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            platform: "obs".to_string(),
            url: None,
            username: None,
            password: None,
            token: None,
        }
    }
}

/// `[review]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    /// Identity written into comment markers
    pub bot_name: String,
    /// Reviewer user
    pub user: Option<String>,
    /// Reviewer group
    pub group: Option<String>,
    /// Review policy
    pub mode: ReviewMode,
    /// Fallback reviewer user
    pub fallback_user: Option<String>,
    /// Fallback reviewer group
    pub fallback_group: Option<String>,
    /// Post audit comments
    pub comment: bool,
    /// Explicit minimum request age in seconds
    pub request_age_min: Option<i64>,
    /// Project config key for the minimum age
    pub request_age_min_key: String,
    /// Minimum age when nothing else is configured
    pub request_age_min_default: i64,
    /// Leave multi-action requests to a human
    pub only_one_action: bool,
    /// Accept submissions the target package already carries
    pub source_match: bool,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            bot_name: "ReviewBot".to_string(),
            user: None,
            group: None,
            mode: ReviewMode::default(),
            fallback_user: None,
            fallback_group: None,
            comment: true,
            request_age_min: None,
            request_age_min_key: DEFAULT_AGE_MIN_KEY.to_string(),
            request_age_min_default: 0,
            only_one_action: false,
            source_match: false,
        }
    }
}

/// Command-line overrides, applied over file values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--apiurl`
    pub apiurl: Option<String>,
    /// `--user`
    pub user: Option<String>,
    /// `--group`
    pub group: Option<String>,
    /// `--dry`
    pub dry: bool,
    /// `--review-mode`
    pub review_mode: Option<ReviewMode>,
    /// `--fallback-user`
    pub fallback_user: Option<String>,
    /// `--fallback-group`
    pub fallback_group: Option<String>,
}

/// Complete bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Platform endpoint and credentials
    pub api: ApiSettings,
    /// Reviewer identity and policy
    pub review: ReviewSettings,
    /// Local per-project values, keyed by project name
    pub projects: BTreeMap<String, toml::Table>,
    /// Decide and report only
    #[serde(skip)]
    pub dry_run: bool,
}

impl Settings {
    /// Load from `path`, or from the default location when `None`
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = paths::default_config();
                if path.exists() { Self::from_file(&path) } else { Ok(Self::default()) }
            },
        }
    }

    /// Parse the file at `path`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply secrets from the environment
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            self.api.password = Some(password);
        }
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            self.api.token = Some(token);
        }
        self
    }

    /// Apply command-line overrides
    #[must_use]
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(url) = &overrides.apiurl {
            self.api.url = Some(url.clone());
        }
        if overrides.user.is_some() || overrides.group.is_some() {
            self.review.user.clone_from(&overrides.user);
            self.review.group.clone_from(&overrides.group);
        }
        if let Some(mode) = overrides.review_mode {
            self.review.mode = mode;
        }
        if let Some(user) = &overrides.fallback_user {
            self.review.fallback_user = Some(user.clone());
        }
        if let Some(group) = &overrides.fallback_group {
            self.review.fallback_group = Some(group.clone());
        }
        self.dry_run |= overrides.dry;
        self
    }

    /// The configured backend
    pub fn platform(&self) -> Result<PlatformKind, ConfigError> {
        self.api.platform.parse()
    }

    /// The API root
    pub fn api_url(&self) -> Result<&str, ConfigError> {
        self.api
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingApiUrl)
    }

    /// Credentials for the configured backend
    ///
    /// Gitea prefers a token; otherwise basic auth is used when a username
    /// is set.
    #[must_use]
    pub fn auth(&self) -> Auth {
        if let (Ok(PlatformKind::Gitea), Some(token)) = (self.platform(), &self.api.token) {
            return Auth::Token(token.clone());
        }
        match &self.api.username {
            Some(user) => Auth::Basic {
                user: user.clone(),
                password: self.api.password.clone(),
            },
            None => Auth::None,
        }
    }

    /// Who the bot reviews as
    ///
    /// Without a configured user or group, the API username is used.
    pub fn reviewer(&self) -> Result<ReviewerIdentity, ConfigError> {
        let mut identity = ReviewerIdentity::new(self.review.user.clone(), self.review.group.clone());
        if identity.is_empty() {
            identity.user.clone_from(&self.api.username);
        }
        if identity.is_empty() {
            return Err(ConfigError::MissingReviewer);
        }
        Ok(identity)
    }

    /// Who gets delegated reviews
    #[must_use]
    pub fn fallback(&self) -> ReviewerIdentity {
        ReviewerIdentity::new(self.review.fallback_user.clone(), self.review.fallback_group.clone())
    }

    /// Validated engine settings
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let fallback = self.fallback();
        if self.review.mode.uses_fallback() && fallback.is_empty() {
            return Err(ConfigError::MissingFallback(self.review.mode));
        }

        let mut config = EngineConfig::new(self.review.bot_name.clone(), self.reviewer()?);
        config.fallback = fallback;
        config.review_mode = self.review.mode;
        config.dry_run = self.dry_run;
        config.comment = self.review.comment;
        config.only_one_action = self.review.only_one_action;
        config.request_age_min = self.review.request_age_min;
        config.request_age_min_key.clone_from(&self.review.request_age_min_key);
        config.request_age_min_default = self.review.request_age_min_default;
        Ok(config)
    }

    /// Local per-project values as strings
    #[must_use]
    pub fn project_values(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.projects
            .iter()
            .map(|(project, table)| {
                let values = table
                    .iter()
                    .map(|(key, value)| {
                        let value = match value {
                            toml::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (key.clone(), value)
                    })
                    .collect();
                (project.clone(), values)
            })
            .collect()
    }
}
