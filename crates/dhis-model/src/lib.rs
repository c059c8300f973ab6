//! Data model shared by the DHIS2 dashboard viewer crates.
//!
//! - [`dashboard`]: dashboards, items, owners and the share-scope rule
//! - [`table`]: [`ResolvedTable`], the uniform shape every item resolves to
//! - [`page`]: page-number pagination
//! - [`filter`]: column and row filters applied before analysis

#![deny(unsafe_code)]

pub mod dashboard;
pub mod filter;
pub mod page;
pub mod table;

#[cfg(feature = "polars")]
mod frame;

pub use dashboard::{
    ContentRef, Dashboard, DashboardItem, ItemKind, ItemTypeSummary, OrgUnitRef, Owner,
    ScopeFilter, ShareScope, UserProfile, classify_share_scope,
};
pub use filter::{FilterError, RowFilter, TableFilter};
pub use page::{PageResult, total_pages};
pub use table::{
    CellValue, Column, ColumnKind, DEFAULT_TABLE_NAME, Records, ResolvedTable,
    dedupe_column_names, format_datetime, format_numeric, parse_number,
};
