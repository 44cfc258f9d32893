//! Collaborator contracts between the page controllers and the
//! surrounding application.
//!
//! The controllers never talk to the transport directly; they consume
//! these traits and the REST client (or a test double) provides them.

use serde::Deserialize;

use crate::query::ListQuery;

/// One page of a server-side filtered, paginated collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            pages: 0,
        }
    }
}

/// Read side of a collection endpoint. Fetch must be safely re-invocable
/// with the same or modified parameters.
#[allow(async_fn_in_trait)]
pub trait CollectionSource<T> {
    async fn fetch(&self, query: &ListQuery) -> Result<Page<T>, String>;
}

/// Per-record update: persists one record's new value. Any `Err` is that
/// record's failure; sibling updates are unaffected.
#[allow(async_fn_in_trait)]
pub trait EntityUpdate<V> {
    async fn update(&self, id: &str, value: V) -> Result<(), String>;
}

/// Row deletion for the table pages.
#[allow(async_fn_in_trait)]
pub trait RowDelete {
    async fn delete(&self, id: &str) -> Result<(), String>;
}

/// Fire-and-forget user messaging. Controllers surface at most one success
/// and one error message per operation, never one per record.
pub trait NotificationSink {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Sink for headless use: messages go to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn success(&self, message: &str) {
        tracing::info!(message, "notify");
    }

    fn error(&self, message: &str) {
        tracing::error!(message, "notify");
    }
}
