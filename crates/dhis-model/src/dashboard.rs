//! Dashboards, dashboard items and the users that own them.
//!
//! The upstream DHIS2 JSON is loose: item content lives in whichever of the
//! `visualization`, `chart`, `map` or `text` fields happens to be set. The
//! types here turn that into a closed sum type at deserialization time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to an organisation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnitRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Owner of a dashboard as embedded in the catalog response (`user[...]`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "organisationUnits")]
    pub org_units: Vec<OrgUnitRef>,
}

/// The authenticated user, as returned by `/api/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawUser")]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    /// Primary organisation unit: the first entry of the upstream list.
    pub org_unit: Option<OrgUnitRef>,
}

impl UserProfile {
    /// Identifier of the primary organisation unit, if any.
    pub fn org_id(&self) -> Option<&str> {
        self.org_unit.as_ref().map(|unit| unit.id.as_str())
    }
}

#[derive(Deserialize)]
struct RawUser {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "displayName")]
    display_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, rename = "organisationUnits")]
    org_units: Vec<OrgUnitRef>,
}

impl From<RawUser> for UserProfile {
    fn from(raw: RawUser) -> Self {
        let display_name = raw
            .display_name
            .or(raw.name)
            .unwrap_or_else(|| raw.id.clone());
        Self {
            id: raw.id,
            display_name,
            email: raw.email.filter(|email| !email.is_empty()),
            org_unit: raw.org_units.into_iter().next(),
        }
    }
}

/// Where a dashboard sits relative to the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareScope {
    /// Owned by the current user.
    Personal,
    /// Owned by someone in the current user's primary organisation unit.
    Organization,
    /// Anything else the user can see.
    #[default]
    Shared,
}

impl ShareScope {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Organization => "organization",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for ShareScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a dashboard owner relative to the current user.
///
/// Ownership always wins: an owner id equal to `user_id` is `Personal` no
/// matter what organisation units either side carries.
pub fn classify_share_scope(owner: &Owner, user_id: &str, user_org_id: Option<&str>) -> ShareScope {
    if !owner.id.is_empty() && owner.id == user_id {
        return ShareScope::Personal;
    }
    match user_org_id {
        Some(org_id) if owner.org_units.iter().any(|unit| unit.id == org_id) => {
            ShareScope::Organization
        }
        _ => ShareScope::Shared,
    }
}

/// Scope filter requested by a caller listing dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeFilter {
    #[default]
    All,
    Personal,
    Organization,
    Shared,
}

impl ScopeFilter {
    #[must_use]
    pub fn matches(&self, scope: ShareScope) -> bool {
        match self {
            Self::All => true,
            Self::Personal => scope == ShareScope::Personal,
            Self::Organization => scope == ShareScope::Organization,
            Self::Shared => scope == ShareScope::Shared,
        }
    }
}

/// Identifier, name and subtype of a visualization, chart or map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// DHIS2 subtype such as `PIVOT_TABLE` or `COLUMN`.
    #[serde(default, rename = "type")]
    pub subtype: Option<String>,
}

/// One renderable unit of a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawItem")]
pub enum DashboardItem {
    Visualization(ContentRef),
    Chart(ContentRef),
    Map(ContentRef),
    Text { content: String },
    Other { item_type: Option<String> },
}

/// Coarse kind reported alongside a resolved item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Visualization,
    Chart,
    Map,
    Text,
    Other,
    Error,
}

impl ItemKind {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Visualization => "Visualisation",
            Self::Chart => "Chart",
            Self::Map => "Map",
            Self::Text => "Text",
            Self::Other => "Données génériques",
            Self::Error => "Erreur",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl DashboardItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Visualization(_) => ItemKind::Visualization,
            Self::Chart(_) => ItemKind::Chart,
            Self::Map(_) => ItemKind::Map,
            Self::Text { .. } => ItemKind::Text,
            Self::Other { .. } => ItemKind::Other,
        }
    }

    /// Human-readable name, falling back to a per-kind default.
    pub fn display_name(&self) -> String {
        match self {
            Self::Visualization(content) => content_name(content, "Visualisation"),
            Self::Chart(content) => content_name(content, "Graphique"),
            Self::Map(content) => content_name(content, "Carte"),
            Self::Text { .. } => "Texte".to_string(),
            Self::Other { .. } => "Élément".to_string(),
        }
    }

    /// Upstream identifier of the referenced content, when there is one.
    pub fn content_id(&self) -> Option<&str> {
        match self {
            Self::Visualization(content) | Self::Chart(content) | Self::Map(content) => {
                Some(content.id.as_str()).filter(|id| !id.is_empty())
            }
            Self::Text { .. } | Self::Other { .. } => None,
        }
    }

    /// Whether resolving this item can yield tabular data worth exporting.
    /// Text items count once they hold more than whitespace.
    pub fn has_tabular_data(&self) -> bool {
        match self {
            Self::Visualization(_) | Self::Chart(_) | Self::Map(_) => true,
            Self::Text { content } => !content.trim().is_empty(),
            Self::Other { .. } => false,
        }
    }
}

fn content_name(content: &ContentRef, fallback: &str) -> String {
    content
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(default)]
    visualization: Option<ContentRef>,
    #[serde(default)]
    chart: Option<ContentRef>,
    #[serde(default)]
    map: Option<ContentRef>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "type")]
    item_type: Option<String>,
}

impl From<RawItem> for DashboardItem {
    fn from(raw: RawItem) -> Self {
        if let Some(content) = raw.visualization {
            Self::Visualization(content)
        } else if let Some(content) = raw.chart {
            Self::Chart(content)
        } else if let Some(content) = raw.map {
            Self::Map(content)
        } else if let Some(content) = raw.text {
            Self::Text { content }
        } else {
            Self::Other {
                item_type: raw.item_type,
            }
        }
    }
}

/// A dashboard snapshot with the classification computed at fetch time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Dashboard {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default, rename = "lastUpdated")]
    pub last_updated: Option<String>,
    #[serde(default, rename = "user")]
    pub owner: Option<Owner>,
    #[serde(default, rename = "dashboardItems")]
    pub items: Vec<DashboardItem>,
    #[serde(skip)]
    pub is_owner: bool,
    #[serde(skip)]
    pub share_scope: ShareScope,
}

impl Dashboard {
    /// Recompute `is_owner` and `share_scope` for `user`.
    pub fn classify(&mut self, user: &UserProfile) {
        let owner = self.owner.clone().unwrap_or_default();
        self.share_scope = classify_share_scope(&owner, &user.id, user.org_id());
        self.is_owner = self.share_scope == ShareScope::Personal;
    }

    /// The creation date (first ten characters of the timestamp), if known.
    pub fn created_date(&self) -> Option<&str> {
        self.created
            .as_deref()
            .map(|created| created.get(..10).unwrap_or(created))
    }

    pub fn item_summary(&self) -> ItemTypeSummary {
        ItemTypeSummary::from_items(&self.items)
    }
}

/// Count of dashboard items per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ItemTypeSummary {
    pub visualizations: usize,
    pub charts: usize,
    pub maps: usize,
    pub texts: usize,
    pub others: usize,
}

impl ItemTypeSummary {
    pub fn from_items(items: &[DashboardItem]) -> Self {
        let mut summary = Self::default();
        for item in items {
            match item {
                DashboardItem::Visualization(_) => summary.visualizations += 1,
                DashboardItem::Chart(_) => summary.charts += 1,
                DashboardItem::Map(_) => summary.maps += 1,
                DashboardItem::Text { .. } => summary.texts += 1,
                DashboardItem::Other { .. } => summary.others += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.visualizations + self.charts + self.maps + self.texts + self.others
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(id: &str, orgs: &[&str]) -> Owner {
        Owner {
            id: id.to_string(),
            name: None,
            org_units: orgs
                .iter()
                .map(|org| OrgUnitRef {
                    id: (*org).to_string(),
                    name: None,
                })
                .collect(),
        }
    }

    #[test]
    fn owner_match_is_personal_regardless_of_orgs() {
        assert_eq!(
            classify_share_scope(&owner("U1", &["OU9"]), "U1", Some("OU1")),
            ShareScope::Personal
        );
        assert_eq!(
            classify_share_scope(&owner("U1", &[]), "U1", None),
            ShareScope::Personal
        );
    }

    #[test]
    fn shared_org_unit_is_organization() {
        assert_eq!(
            classify_share_scope(&owner("U2", &["OU3", "OU1"]), "U1", Some("OU1")),
            ShareScope::Organization
        );
        assert_eq!(
            classify_share_scope(&owner("U2", &["OU3"]), "U1", Some("OU1")),
            ShareScope::Shared
        );
        assert_eq!(
            classify_share_scope(&owner("U2", &["OU1"]), "U1", None),
            ShareScope::Shared
        );
    }

    #[test]
    fn item_variant_follows_populated_field() {
        let json = r#"[
            {"visualization": {"id": "v1", "name": "ANC coverage", "type": "PIVOT_TABLE"}},
            {"chart": {"id": "c1", "type": "COLUMN"}},
            {"map": {"id": "m1", "name": "Cases"}},
            {"text": "hello"},
            {"type": "RESOURCES"}
        ]"#;
        let items: Vec<DashboardItem> = serde_json::from_str(json).expect("parse items");
        let kinds: Vec<ItemKind> = items.iter().map(DashboardItem::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ItemKind::Visualization,
                ItemKind::Chart,
                ItemKind::Map,
                ItemKind::Text,
                ItemKind::Other
            ]
        );
        assert_eq!(items[0].display_name(), "ANC coverage");
        assert_eq!(items[1].display_name(), "Graphique");
        assert_eq!(items[0].content_id(), Some("v1"));
        assert_eq!(items[3].content_id(), None);
    }

    #[test]
    fn null_fields_do_not_select_a_variant() {
        let item: DashboardItem =
            serde_json::from_str(r#"{"visualization": null, "map": {"id": "m1"}}"#)
                .expect("parse item");
        assert_eq!(item.kind(), ItemKind::Map);
    }

    #[test]
    fn tabular_data_includes_non_blank_text() {
        let json = r#"[
            {"chart": {"id": "c1"}},
            {"text": "Couverture en hausse"},
            {"text": "  "},
            {"type": "MESSAGES"}
        ]"#;
        let items: Vec<DashboardItem> = serde_json::from_str(json).expect("parse items");
        let flags: Vec<bool> = items.iter().map(DashboardItem::has_tabular_data).collect();
        assert_eq!(flags, vec![true, true, false, false]);
    }

    #[test]
    fn user_profile_takes_first_org_unit() {
        let json = r#"{
            "id": "U1",
            "name": "Awa Ndiaye",
            "email": "awa@example.org",
            "organisationUnits": [{"id": "OU1", "name": "Dakar"}, {"id": "OU2", "name": "Thiès"}]
        }"#;
        let user: UserProfile = serde_json::from_str(json).expect("parse user");
        assert_eq!(user.display_name, "Awa Ndiaye");
        assert_eq!(user.org_id(), Some("OU1"));
    }

    #[test]
    fn dashboard_classification_sets_owner_flag() {
        let json = r#"{
            "id": "D1",
            "name": "ANC",
            "created": "2024-03-01T10:00:00.000",
            "user": {"id": "U1"},
            "dashboardItems": [{"text": "note"}, {"map": {"id": "m"}}]
        }"#;
        let mut dashboard: Dashboard = serde_json::from_str(json).expect("parse dashboard");
        let user = UserProfile {
            id: "U1".to_string(),
            display_name: "me".to_string(),
            email: None,
            org_unit: None,
        };
        dashboard.classify(&user);
        assert!(dashboard.is_owner);
        assert_eq!(dashboard.share_scope, ShareScope::Personal);
        assert_eq!(dashboard.created_date(), Some("2024-03-01"));
        let summary = dashboard.item_summary();
        assert_eq!(summary.texts, 1);
        assert_eq!(summary.maps, 1);
        assert_eq!(summary.total(), 2);
    }
}
