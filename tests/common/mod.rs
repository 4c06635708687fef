//! Shared test utilities and fixtures.

#![allow(dead_code, unused_imports)]

pub mod mock_server;

use clay_widgets::cache::{CacheKey, EntryState, RecordCache};
use clay_widgets::client::{MemoryClient, RecordClient};
use clay_widgets::config::CacheConfig;
use clay_widgets::record_widget;
use clay_widgets::widget::NoDerive;
use clay_widgets::widgets::{NumberWidget, TextWidget};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

record_widget! {
    /// Minimal two-field record.
    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    pub struct Contact {
        name: String => Name(TextWidget),
        qty: f64 => Qty(NumberWidget),
    }

    #[derive(Debug, Clone)]
    pub widget ContactWidget {
        state: ContactState,
        action: ContactAction,
        derive: NoDerive,
    }
}

pub fn contact_widget() -> ContactWidget {
    ContactWidget::new(TextWidget::new("Name").required(), NumberWidget::new("Qty"))
}

pub fn cache_config() -> CacheConfig {
    CacheConfig {
        fetch_timeout_ms: 1_000,
        subscriber_buffer: 16,
    }
}

/// Cache over `client` on the current runtime.
pub fn memory_cache(client: &Arc<MemoryClient>) -> RecordCache {
    RecordCache::new(Arc::clone(client) as Arc<dyn RecordClient>, &cache_config())
        .expect("tests run inside a Tokio runtime")
}

pub fn rate_json(id: &str, hours: f64, materials: f64, increment: f64) -> Value {
    json!({
        "id": id,
        "name": id.to_uppercase(),
        "unit": "m2",
        "hours_ratio": hours,
        "materials_ratio": materials,
        "unit_increment": increment,
    })
}

/// A store with rates `paint`, `tile` and the retired `legacy`.
pub fn seeded_client() -> Arc<MemoryClient> {
    let client = MemoryClient::new();
    client.insert("rate", "paint", rate_json("paint", 0.25, 0.4, 0.5));
    client.insert("rate", "tile", rate_json("tile", 1.5, 2.0, 1.0));
    let mut legacy = rate_json("legacy", 1.0, 1.0, 0.0);
    legacy["retired"] = json!(true);
    client.insert("rate", "legacy", legacy);
    Arc::new(client)
}

pub fn empty_lookup() -> HashMap<CacheKey, EntryState> {
    HashMap::new()
}
