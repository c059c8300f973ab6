//! HTTP seam between the client logic and the network.
//!
//! Everything above this module talks to a [`Transport`]. The production
//! implementation is [`HttpTransport`], a blocking `reqwest` client with basic
//! credentials; tests substitute an in-memory one.

use std::fmt;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::error::FetchError;

/// Default request timeout shared by every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Query parameters. Keys may repeat (`dimension=...&dimension=...`).
pub type Query = [(&'static str, String)];

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Turn anything but HTTP 200 into a [`FetchError::Status`].
    pub fn into_ok_body(self) -> Result<String, FetchError> {
        if self.is_ok() {
            Ok(self.body)
        } else {
            Err(FetchError::Status {
                status: self.status,
                message: self.body,
            })
        }
    }
}

/// A blocking GET against the DHIS2 server.
///
/// `path` is absolute from the server root, e.g. `/api/me`.
pub trait Transport {
    fn get(&self, path: &str, query: &Query) -> Result<HttpResponse, FetchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, path: &str, query: &Query) -> Result<HttpResponse, FetchError> {
        (**self).get(path, query)
    }
}

/// Connection settings for [`HttpTransport`].
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL without trailing slashes.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Blocking `reqwest` transport with HTTP Basic credentials.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let base_url = config.trimmed_base_url().to_string();
        Url::parse(&base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &Query) -> Result<Url, FetchError> {
        let raw = format!("{}{path}", self.base_url);
        let mut url = Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str, query: &Query) -> Result<HttpResponse, FetchError> {
        let url = self.url(path, query)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;
        debug!(status, bytes = body.len(), "response from {}", path);
        Ok(HttpResponse { status, body })
    }
}
