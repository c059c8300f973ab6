//! Blocking client for the DHIS2 web API, as used by the dashboard viewer.
//!
//! # Modules
//!
//! - [`client`]: [`Dhis2Client`] and login (`/api/me`)
//! - [`catalog`]: dashboard listing, paging, sorting
//! - [`resolver`]: item data resolution with its fallback chain
//! - [`synthetic`]: placeholder datasets
//! - [`session`]: per-login state
//! - [`transport`]: the HTTP seam
//!
//! # Example
//!
//! ```no_run
//! use dhis_client::{CatalogFilter, ClientConfig, connect};
//!
//! let config = ClientConfig::new("https://play.dhis2.org/demo", "admin", "district");
//! let mut session = connect(&config)?;
//! let listing = session.list_dashboards(&CatalogFilter::default(), 1, 20);
//! for dashboard in &listing.page.items {
//!     println!("{}", dashboard.name);
//! }
//! # Ok::<(), dhis_client::AuthError>(())
//! ```

#![deny(unsafe_code)]

pub mod catalog;
pub mod client;
pub mod error;
pub mod parse;
pub mod resolver;
pub mod session;
pub mod synthetic;
pub mod transport;

pub use catalog::{
    CatalogFilter, CatalogListing, CatalogStats, FETCH_ALL_PAGE_SIZE, MAX_CATALOG_PAGES,
    SortOrder,
};
pub use client::Dhis2Client;
pub use error::{AuthError, FetchError, ParseError, ResolveError};
pub use resolver::{ResolvedItem, ResolverOptions, SeriesData, SeriesSource, error_item};
pub use session::{Session, SessionState, connect};
pub use synthetic::{SeededGenerator, SyntheticCategory, SyntheticDataset, SyntheticSource};
pub use transport::{ClientConfig, DEFAULT_TIMEOUT, HttpResponse, HttpTransport, Query, Transport};
