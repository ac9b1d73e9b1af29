//! Blocking HTTP client shared by the platform adapters

use log::debug;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Longest response body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Failure talking to a platform API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        /// HTTP method
        method: &'static str,
        /// Request URL
        url: String,
        /// Status code
        status: u16,
        /// Start of the response body
        body: String,
    },
    /// The request never got an answer
    #[error("{method} {url} failed: {source}")]
    Transport {
        /// HTTP method
        method: &'static str,
        /// Request URL
        url: String,
        /// Underlying error
        #[source]
        source: reqwest::Error,
    },
    /// The answer could not be parsed
    #[error("cannot decode response from {url}: {message}")]
    Decode {
        /// Request URL
        url: String,
        /// Parser message
        message: String,
    },
}

impl ApiError {
    /// Whether the server said the resource does not exist
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// How requests authenticate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Anonymous
    None,
    /// HTTP basic auth
    Basic {
        /// Login
        user: String,
        /// Password, if any
        password: Option<String>,
    },
    /// `Authorization: token <value>`
    Token(String),
}

/// API client bound to a base URL
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    base: Url,
    auth: Auth,
    trace_bodies: bool,
}

impl HttpClient {
    /// Create a client for the API at `base_url`
    ///
    /// With `trace_bodies` every response body is logged at debug level.
    pub fn new(base_url: &str, auth: Auth, trace_bodies: bool) -> anyhow::Result<Self> {
        let base = Url::parse(base_url).map_err(|e| anyhow::anyhow!("invalid API URL {base_url}: {e}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("invalid API URL {base_url}: not a base URL");
        }

        let client = Client::builder()
            .user_agent(concat!("reviewbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base,
            auth,
            trace_bodies,
        })
    }

    /// The API root
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// URL of `segments` below the API root, with `query` appended
    ///
    /// Segments are percent-encoded individually, so names containing `/`
    /// or `:` stay in one segment.
    #[must_use]
    pub fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// GET and return the body as text
    pub fn get_text(&self, url: Url) -> Result<String, ApiError> {
        self.send("GET", self.client.get(url.clone()), &url)
    }

    /// GET and decode a JSON body
    pub fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let builder = self.client.get(url.clone()).header(ACCEPT, "application/json");
        let text = self.send("GET", builder, &url)?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// POST a plain-text body
    pub fn post_text(&self, url: Url, body: &str) -> Result<String, ApiError> {
        self.send("POST", self.client.post(url.clone()).body(body.to_string()), &url)
    }

    /// POST a JSON body
    pub fn post_json<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<String, ApiError> {
        self.send("POST", self.client.post(url.clone()).json(body), &url)
    }

    /// DELETE a resource
    pub fn delete(&self, url: Url) -> Result<String, ApiError> {
        self.send("DELETE", self.client.delete(url.clone()), &url)
    }

    fn send(&self, method: &'static str, builder: RequestBuilder, url: &Url) -> Result<String, ApiError> {
        let builder = match &self.auth {
            Auth::None => builder,
            Auth::Basic { user, password } => builder.basic_auth(user, password.as_deref()),
            Auth::Token(token) => builder.header(AUTHORIZATION, format!("token {token}")),
        };

        debug!("{method} {url}");
        let transport = |source| ApiError::Transport {
            method,
            url: url.to_string(),
            source,
        };
        let response = builder.send().map_err(transport)?;
        let status = response.status();
        let body = response.text().map_err(transport)?;

        if self.trace_bodies {
            debug!("{method} {url} -> {status}\n{body}");
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        Ok(body)
    }
}
