//! Widget model: identity, kind, content and placement.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::GridRect;

/// Opaque, stable widget identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::borrow::Borrow<str> for WidgetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetKind {
    #[serde(rename = "user-table", alias = "table")]
    Table,
    #[serde(rename = "user-stats", alias = "stats")]
    Stats,
    #[serde(rename = "user-activity", alias = "activity")]
    Activity,
    #[serde(rename = "user-growth", alias = "growth")]
    Growth,
    #[serde(rename = "user-locations", alias = "locations")]
    Locations,
    #[serde(rename = "custom")]
    Custom,
}

impl WidgetKind {
    pub fn label(self) -> &'static str {
        match self {
            WidgetKind::Table => "table",
            WidgetKind::Stats => "stats",
            WidgetKind::Activity => "activity",
            WidgetKind::Growth => "growth",
            WidgetKind::Locations => "locations",
            WidgetKind::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerTier {
    #[serde(rename = "VIP")]
    Vip,
    Premium,
    #[serde(rename = "Básico", alias = "Basic")]
    Basic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u32,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub tier: CustomerTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub users: Vec<Customer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    pub total_users: u32,
    pub active_users: u32,
    pub new_users_today: u32,
    pub admin_users: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub user: String,
    pub action: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityData {
    pub activities: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub users: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthData {
    pub monthly: Vec<MonthlyCount>,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationShare {
    pub country: String,
    pub users: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationsData {
    pub locations: Vec<LocationShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BTreeMap<String, MetricValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

/// Widget content, keyed by [`WidgetKind`].
///
/// Serialized without a tag because the kind travels next to it in the
/// widget record. Variants are tried in declaration order, so the all-optional
/// custom payload must stay last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WidgetData {
    Table(TableData),
    Stats(StatsData),
    Activity(ActivityData),
    Growth(GrowthData),
    Locations(LocationsData),
    Custom(CustomData),
}

impl WidgetData {
    pub fn kind(&self) -> WidgetKind {
        match self {
            WidgetData::Table(_) => WidgetKind::Table,
            WidgetData::Stats(_) => WidgetKind::Stats,
            WidgetData::Activity(_) => WidgetKind::Activity,
            WidgetData::Growth(_) => WidgetKind::Growth,
            WidgetData::Locations(_) => WidgetKind::Locations,
            WidgetData::Custom(_) => WidgetKind::Custom,
        }
    }

    /// Number of rows a paged renderer walks through, if the content pages.
    pub fn paged_len(&self) -> Option<usize> {
        match self {
            WidgetData::Table(table) => Some(table.users.len()),
            WidgetData::Activity(activity) => Some(activity.activities.len()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: WidgetId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub data: WidgetData,
    pub visible: bool,
    #[serde(flatten)]
    pub rect: GridRect,
}

impl Widget {
    pub fn new(
        id: impl Into<WidgetId>,
        title: impl Into<String>,
        data: WidgetData,
        rect: GridRect,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: data.kind(),
            data,
            visible: true,
            rect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_serializes_flat_position_and_wire_kind() {
        let widget = Widget::new(
            "widget-9",
            "Notes",
            WidgetData::Custom(CustomData {
                message: Some("hi".into()),
                ..CustomData::default()
            }),
            GridRect::new(1, 2, 3, 4),
        );
        let json = serde_json::to_value(&widget).unwrap();
        assert_eq!(json["type"], "custom");
        assert_eq!(json["x"], 1);
        assert_eq!(json["h"], 4);
        assert_eq!(json["data"]["message"], "hi");
        let back: Widget = serde_json::from_value(json).unwrap();
        assert_eq!(back, widget);
    }

    #[test]
    fn untagged_data_resolves_by_shape() {
        let stats: WidgetData = serde_json::from_str(
            r#"{"totalUsers":1,"activeUsers":2,"newUsersToday":3,"adminUsers":4}"#,
        )
        .unwrap();
        assert_eq!(stats.kind(), WidgetKind::Stats);
        let growth: WidgetData =
            serde_json::from_str(r#"{"monthly":[],"percentage":2.5}"#).unwrap();
        assert_eq!(growth.kind(), WidgetKind::Growth);
        let custom: WidgetData = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(custom.kind(), WidgetKind::Custom);
    }

    #[test]
    fn short_kind_names_are_accepted() {
        let kind: WidgetKind = serde_json::from_str("\"locations\"").unwrap();
        assert_eq!(kind, WidgetKind::Locations);
    }
}
