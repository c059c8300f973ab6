//! Per-login session state.

use dhis_model::{Dashboard, UserProfile};
use tracing::info;

use crate::catalog::{CatalogFilter, CatalogListing};
use crate::client::Dhis2Client;
use crate::error::{AuthError, FetchError};
use crate::transport::{ClientConfig, HttpTransport, Transport};

/// Browsing state kept between calls of one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Dashboards of the last listing, in listing order.
    pub dashboards: Vec<Dashboard>,
    /// Page number of the last listing (from 1).
    pub page: usize,
    /// Dashboard whose details were last loaded.
    pub selected: Option<Dashboard>,
}

/// An authenticated client together with who is logged in.
///
/// Created only by a successful login; dropping it or calling
/// [`Session::logout`] ends the session.
#[derive(Debug)]
pub struct Session<T = HttpTransport> {
    client: Dhis2Client<T>,
    user: UserProfile,
    state: SessionState,
}

/// Log in over HTTP with `config`.
pub fn connect(config: &ClientConfig) -> Result<Session, AuthError> {
    Session::open(Dhis2Client::new(config)?)
}

impl<T: Transport> Session<T> {
    /// Authenticate with `client` and start a session.
    pub fn open(client: Dhis2Client<T>) -> Result<Self, AuthError> {
        let user = client.current_user()?;
        Ok(Self {
            client,
            user,
            state: SessionState {
                page: 1,
                ..SessionState::default()
            },
        })
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn client(&self) -> &Dhis2Client<T> {
        &self.client
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// List a page of dashboards and remember it.
    pub fn list_dashboards(
        &mut self,
        filter: &CatalogFilter,
        page: usize,
        page_size: usize,
    ) -> CatalogListing {
        let listing = self
            .client
            .list_dashboards(&self.user, filter, page, page_size);
        self.state.dashboards = listing.page.items.clone();
        self.state.page = listing.page.page;
        listing
    }

    /// Load the details of dashboard `id` and make it the selection.
    pub fn select_dashboard(&mut self, id: &str) -> Result<&Dashboard, FetchError> {
        let dashboard = self.client.dashboard(id, &self.user)?;
        Ok(self.state.selected.insert(dashboard))
    }

    /// Forget cached listings and the selection; stay logged in.
    pub fn reset(&mut self) {
        self.state = SessionState {
            page: 1,
            ..SessionState::default()
        };
    }

    /// End the session, handing back the client.
    pub fn logout(self) -> Dhis2Client<T> {
        info!(user = %self.user.display_name, "logged out");
        self.client
    }
}
