//! Dashboard catalog: listing, paging, details, sorting.

use std::cmp::Reverse;

use dhis_model::{Dashboard, PageResult, ScopeFilter, UserProfile};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::Dhis2Client;
use crate::error::FetchError;
use crate::transport::Transport;

/// Upper bound on pages read when fetching the whole catalog.
pub const MAX_CATALOG_PAGES: usize = 50;

/// Page size used when fetching the whole catalog.
pub const FETCH_ALL_PAGE_SIZE: usize = 200;

const DASHBOARDS_PATH: &str = "/api/dashboards";
const LIST_FIELDS: &str = "*,user[id,name,organisationUnits[id,name]],dashboardItems[*]";
const DETAIL_FIELDS: &str = "id,name,description,created,lastUpdated,\
user[id,name,organisationUnits[id,name]],\
dashboardItems[*,visualization[id,name,type],map[id,name],text,chart[id,name,type]]";

/// What the caller wants listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub scope: ScopeFilter,
    pub search_text: Option<String>,
}

impl CatalogFilter {
    pub fn new(scope: ScopeFilter, search_text: Option<String>) -> Self {
        Self { scope, search_text }
    }

    /// The trimmed search text, `None` when blank.
    pub fn search(&self) -> Option<&str> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// One page of dashboards plus the soft failure that cut the listing short, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogListing {
    pub page: PageResult<Dashboard>,
    pub warning: Option<FetchError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pager {
    #[serde(default)]
    page_count: Option<usize>,
    #[serde(default)]
    total: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct DashboardPage {
    #[serde(default)]
    pager: Option<Pager>,
    #[serde(default)]
    dashboards: Vec<Dashboard>,
}

impl<T: Transport> Dhis2Client<T> {
    /// List dashboards visible to `user`.
    ///
    /// Scope `all` is paged by the server. The other scopes need the owner of
    /// every dashboard, so the whole catalog is fetched, filtered and paged
    /// locally. Failures never abort the listing.
    pub fn list_dashboards(
        &self,
        user: &UserProfile,
        filter: &CatalogFilter,
        page: usize,
        page_size: usize,
    ) -> CatalogListing {
        let page = page.max(1);
        let page_size = page_size.max(1);

        if filter.scope == ScopeFilter::All {
            return match self.fetch_page(filter.search(), page, page_size) {
                Ok(response) => {
                    let mut dashboards = response.dashboards;
                    classify_all(&mut dashboards, user);
                    let total = response
                        .pager
                        .and_then(|pager| pager.total)
                        .unwrap_or(dashboards.len());
                    info!(page, total, "listed dashboards");
                    CatalogListing {
                        page: PageResult::from_server(dashboards, page, page_size, total),
                        warning: None,
                    }
                }
                Err(err) => {
                    warn!("dashboard listing failed: {err}");
                    CatalogListing {
                        page: PageResult::paginate(Vec::new(), page, page_size),
                        warning: Some(err),
                    }
                }
            };
        }

        let (all, warning) = self.fetch_all_dashboards(user, filter.search());
        let matching: Vec<Dashboard> = all
            .into_iter()
            .filter(|dashboard| filter.scope.matches(dashboard.share_scope))
            .collect();
        info!(scope = ?filter.scope, total = matching.len(), "listed dashboards");
        CatalogListing {
            page: PageResult::paginate(matching, page, page_size),
            warning,
        }
    }

    /// Every dashboard matching `search`, classified for `user`.
    ///
    /// Reads pages of [`FETCH_ALL_PAGE_SIZE`] until the server's page count
    /// is reached, a page comes back empty, or [`MAX_CATALOG_PAGES`] pages
    /// have been read. A failing page stops the loop; what was read so far
    /// is returned together with the error.
    pub fn fetch_all_dashboards(
        &self,
        user: &UserProfile,
        search: Option<&str>,
    ) -> (Vec<Dashboard>, Option<FetchError>) {
        let mut dashboards = Vec::new();
        let mut warning = None;

        for page in 1..=MAX_CATALOG_PAGES {
            let response = match self.fetch_page(search, page, FETCH_ALL_PAGE_SIZE) {
                Ok(response) => response,
                Err(err) => {
                    warn!(page, "stopping catalog fetch: {err}");
                    warning = Some(err);
                    break;
                }
            };
            if response.dashboards.is_empty() {
                break;
            }
            dashboards.extend(response.dashboards);

            let page_count = response.pager.and_then(|pager| pager.page_count);
            if page_count.is_none_or(|count| page >= count) {
                break;
            }
            if page == MAX_CATALOG_PAGES {
                warn!("catalog truncated at {MAX_CATALOG_PAGES} pages");
            }
        }

        classify_all(&mut dashboards, user);
        debug!(count = dashboards.len(), "fetched catalog");
        (dashboards, warning)
    }

    /// Full details of one dashboard, items expanded.
    pub fn dashboard(&self, id: &str, user: &UserProfile) -> Result<Dashboard, FetchError> {
        let path = format!("{DASHBOARDS_PATH}/{id}");
        let mut dashboard: Dashboard = self.get_json(&path, &[("fields", DETAIL_FIELDS.to_string())])?;
        dashboard.classify(user);
        Ok(dashboard)
    }

    fn fetch_page(
        &self,
        search: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<DashboardPage, FetchError> {
        let mut query = vec![
            ("fields", LIST_FIELDS.to_string()),
            ("paging", "true".to_string()),
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
            ("order", "name:asc".to_string()),
        ];
        if let Some(text) = search {
            query.push(("filter", format!("name:ilike:{text}")));
        }
        self.get_json(DASHBOARDS_PATH, &query)
    }
}

fn classify_all(dashboards: &mut [Dashboard], user: &UserProfile) {
    for dashboard in dashboards {
        dashboard.classify(user);
    }
}

/// Client-side orderings of a dashboard list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    /// Most recently created first; undated dashboards last.
    CreatedDesc,
    /// Most items first.
    ItemCountDesc,
}

impl SortOrder {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NameAsc => "Nom (A-Z)",
            Self::NameDesc => "Nom (Z-A)",
            Self::CreatedDesc => "Date de création (récent)",
            Self::ItemCountDesc => "Nombre d'éléments",
        }
    }

    /// Stable sort in place.
    pub fn apply(&self, dashboards: &mut [Dashboard]) {
        match self {
            Self::NameAsc => dashboards.sort_by_cached_key(|d| d.name.to_lowercase()),
            Self::NameDesc => dashboards.sort_by_cached_key(|d| Reverse(d.name.to_lowercase())),
            Self::CreatedDesc => {
                dashboards.sort_by(|a, b| match (&a.created, &b.created) {
                    (Some(a), Some(b)) => b.cmp(a),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                });
            }
            Self::ItemCountDesc => dashboards.sort_by_key(|d| Reverse(d.items.len())),
        }
    }
}

/// Headline numbers for a dashboard list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CatalogStats {
    pub dashboards: usize,
    pub owned: usize,
    pub items: usize,
}

impl CatalogStats {
    pub fn from_dashboards(dashboards: &[Dashboard]) -> Self {
        Self {
            dashboards: dashboards.len(),
            owned: dashboards.iter().filter(|d| d.is_owner).count(),
            items: dashboards.iter().map(|d| d.items.len()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard(name: &str, created: Option<&str>, items: usize) -> Dashboard {
        let items: Vec<_> = (0..items)
            .map(|_| serde_json::json!({"text": "x"}))
            .collect();
        let mut value = serde_json::json!({
            "id": name,
            "name": name,
            "dashboardItems": items,
        });
        if let Some(created) = created {
            value["created"] = serde_json::json!(created);
        }
        serde_json::from_value(value).expect("dashboard")
    }

    fn names(dashboards: &[Dashboard]) -> Vec<&str> {
        dashboards.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn sort_orders() {
        let mut list = vec![
            dashboard("beta", Some("2024-01-01T00:00:00"), 1),
            dashboard("Alpha", None, 3),
            dashboard("gamma", Some("2024-06-01T00:00:00"), 2),
        ];
        SortOrder::NameAsc.apply(&mut list);
        assert_eq!(names(&list), vec!["Alpha", "beta", "gamma"]);
        SortOrder::NameDesc.apply(&mut list);
        assert_eq!(names(&list), vec!["gamma", "beta", "Alpha"]);
        SortOrder::CreatedDesc.apply(&mut list);
        assert_eq!(names(&list), vec!["gamma", "beta", "Alpha"]);
        SortOrder::ItemCountDesc.apply(&mut list);
        assert_eq!(names(&list), vec!["Alpha", "gamma", "beta"]);
    }

    #[test]
    fn stats_count_owned_and_items() {
        let mut list = vec![dashboard("a", None, 2), dashboard("b", None, 5)];
        list[0].is_owner = true;
        let stats = CatalogStats::from_dashboards(&list);
        assert_eq!(
            stats,
            CatalogStats {
                dashboards: 2,
                owned: 1,
                items: 7
            }
        );
    }

    #[test]
    fn blank_search_is_ignored() {
        let filter = CatalogFilter::new(ScopeFilter::All, Some("   ".to_string()));
        assert_eq!(filter.search(), None);
        let filter = CatalogFilter::new(ScopeFilter::All, Some(" ANC ".to_string()));
        assert_eq!(filter.search(), Some("ANC"));
    }
}
