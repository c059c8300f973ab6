//! The DHIS2 client and its login call.

use std::fmt;

use dhis_model::UserProfile;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{AuthError, FetchError};
use crate::resolver::ResolverOptions;
use crate::synthetic::{SeededGenerator, SyntheticSource};
use crate::transport::{ClientConfig, HttpTransport, Query, Transport};

const ME_PATH: &str = "/api/me";
const ME_FIELDS: &str = "id,name,displayName,email,organisationUnits[id,name]";

/// Typed access to the DHIS2 endpoints the viewer reads.
///
/// The catalog and resolver operations live in their own modules as further
/// `impl` blocks on this type.
pub struct Dhis2Client<T = HttpTransport> {
    pub(crate) transport: T,
    pub(crate) synthetic: Box<dyn SyntheticSource>,
    pub(crate) options: ResolverOptions,
}

impl Dhis2Client<HttpTransport> {
    /// Build a client backed by a blocking HTTP transport.
    pub fn new(config: &ClientConfig) -> Result<Self, AuthError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(transport))
    }
}

impl<T: Transport> Dhis2Client<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            synthetic: Box::new(SeededGenerator),
            options: ResolverOptions::default(),
        }
    }

    /// Replace the source used when no live endpoint returns rows.
    #[must_use]
    pub fn with_synthetic(mut self, source: impl SyntheticSource + 'static) -> Self {
        self.synthetic = Box::new(source);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// `GET /api/me`. Anything but HTTP 200 is an [`AuthError`].
    pub fn current_user(&self) -> Result<UserProfile, AuthError> {
        let user: UserProfile = self.get_json(ME_PATH, &[("fields", ME_FIELDS.to_string())])?;
        info!(user = %user.display_name, id = %user.id, "authenticated");
        Ok(user)
    }

    /// GET `path` and decode a 200 body as `D`.
    pub(crate) fn get_json<D: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
    ) -> Result<D, FetchError> {
        let body = self.transport.get(path, query)?.into_ok_body()?;
        let value = serde_json::from_str(&body)?;
        debug!(path, "decoded response");
        Ok(value)
    }
}

impl<T> fmt::Debug for Dhis2Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dhis2Client")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
