//! Persisted layout snapshots and the hydration merge.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::widget::{Widget, WidgetId};

/// Serialized form written under the storage key:
/// `{"state": {"widgets": [...], "widgetPagination": {...}}}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: SnapshotState,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotState {
    pub widgets: Vec<Widget>,
    #[serde(rename = "widgetPagination", default)]
    pub widget_pagination: BTreeMap<WidgetId, u32>,
}

impl Snapshot {
    pub fn new(widgets: Vec<Widget>, widget_pagination: BTreeMap<WidgetId, u32>) -> Self {
        Self {
            state: SnapshotState {
                widgets,
                widget_pagination,
            },
        }
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.state.widgets
    }

    pub fn pagination(&self) -> &BTreeMap<WidgetId, u32> {
        &self.state.widget_pagination
    }

    /// Encode as compact JSON. Field and map ordering are fixed, so equal
    /// snapshots always encode to identical bytes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Overlay a persisted snapshot onto the seed.
///
/// Each seed widget takes `rect` and `visible` from the snapshot entry with
/// the same id; seed widgets the snapshot does not mention keep their
/// defaults. Snapshot entries with no seed counterpart are dropped because
/// the widget set is fixed. Seed order is preserved.
pub fn merge_defaults(seed: &[Widget], snapshot: Option<&Snapshot>) -> Vec<Widget> {
    let Some(snapshot) = snapshot else {
        return seed.to_vec();
    };
    let overrides: BTreeMap<&WidgetId, &Widget> = snapshot
        .widgets()
        .iter()
        .map(|widget| (&widget.id, widget))
        .collect();

    let seed_ids: BTreeSet<&WidgetId> = seed.iter().map(|w| &w.id).collect();
    for stale in overrides.keys().filter(|id| !seed_ids.contains(*id)) {
        tracing::debug!(widget_id = %stale, "dropping persisted widget unknown to the seed");
    }

    seed.iter()
        .map(|default| match overrides.get(&default.id) {
            Some(stored) => Widget {
                rect: stored.rect,
                visible: stored.visible,
                ..default.clone()
            },
            None => default.clone(),
        })
        .collect()
}

/// Pagination cursors restored from a snapshot, limited to known widgets
/// and floored at page 1.
pub fn merge_pagination(seed: &[Widget], snapshot: Option<&Snapshot>) -> BTreeMap<WidgetId, u32> {
    let Some(snapshot) = snapshot else {
        return BTreeMap::new();
    };
    snapshot
        .pagination()
        .iter()
        .filter(|(id, _)| seed.iter().any(|w| &w.id == *id))
        .map(|(id, page)| (id.clone(), (*page).max(1)))
        .collect()
}
