//! Error types for the DHIS2 client.

use thiserror::Error;

/// Login failed. Fatal to the login attempt only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The server answered with something other than HTTP 200.
    #[error("authentication rejected (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        message: String,
    },

    /// The server could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The `/api/me` body could not be decoded.
    #[error("invalid user profile: {0}")]
    InvalidProfile(String),

    /// The HTTP client could not be built (bad base URL, TLS setup).
    #[error("client configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    /// Returns a short message suitable for a login prompt.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Rejected { status: 401, .. } => "Identifiants invalides.",
            Self::Rejected { .. } => "Le serveur a refusé la connexion.",
            Self::Network(_) => "Impossible de joindre le serveur DHIS2.",
            Self::InvalidProfile(_) => "Réponse inattendue du serveur.",
            Self::Configuration(_) => "Configuration de connexion invalide.",
        }
    }
}

impl From<FetchError> for AuthError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Status { status, message } => Self::Rejected { status, message },
            FetchError::Network(message) => Self::Network(message),
            FetchError::JsonParse(message) => Self::InvalidProfile(message),
            FetchError::InvalidUrl(message) => Self::Configuration(message),
        }
    }
}

/// A request failed. Soft: callers keep what they already have and surface
/// the failure as a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// Transport failure: timeout, refused connection, TLS.
    #[error("network error: {0}")]
    Network(String),

    /// Non-200 response.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Returns whether a retry could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::JsonParse(_) | Self::InvalidUrl(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

/// A data payload could not be turned into a table. Moves the resolver on
/// to its next source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Json(String),

    /// The payload parsed but holds no rows.
    #[error("no data rows")]
    NoRows,

    /// Neither a `rows` nor a `data` payload, or rows without cells.
    #[error("unrecognized data format")]
    UnrecognizedShape,
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Resolving one dashboard item failed. Always converted into an error
/// table before it leaves the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Erreur génération données: {0}")]
    Generator(String),
}
