//! Special-items page: weekday promotion schedule with batch save.
//!
//! The page loads the special-items collection, seeds the draft engine, and
//! lets the operator toggle weekday checkboxes freely. Nothing is persisted
//! until Save, which flushes only the changed items. Successfully saved
//! items are reconciled immediately; failed items keep their edits and the
//! operator sees a single error toast, not one per item.

use std::collections::HashSet;

use tracing::warn;

use crate::collab::{CollectionSource, EntityUpdate, NotificationSink};
use crate::engine::{DraftEngine, SaveReport};
use crate::models::SpecialItem;
use crate::query::ListQuery;
use crate::vocab::Weekday;

pub const SPECIAL_ITEMS_PATH: &str = "/api/admin/special-items";

pub struct SpecialItemsPage<S, U, N> {
    source: S,
    update: U,
    notify: N,
    engine: DraftEngine<Weekday>,
    pub query: ListQuery,
    items: Vec<SpecialItem>,
    total: u64,
    pages: u32,
    saving: bool,
}

impl<S, U, N> SpecialItemsPage<S, U, N>
where
    S: CollectionSource<SpecialItem>,
    U: EntityUpdate<HashSet<Weekday>>,
    N: NotificationSink,
{
    pub fn new(source: S, update: U, notify: N) -> Self {
        Self {
            source,
            update,
            notify,
            engine: DraftEngine::new(),
            query: ListQuery::default(),
            items: Vec::new(),
            total: 0,
            pages: 0,
            saving: false,
        }
    }

    async fn reload(&mut self) -> Result<(), String> {
        let page = self.source.fetch(&self.query).await?;
        self.total = page.total;
        self.pages = page.pages;
        self.items = page.items;
        self.engine.seed(&self.items);
        Ok(())
    }

    /// Fetch the current page and reseed the engine. Any unsaved edits for
    /// items that dropped off the page are discarded by the reseed.
    pub async fn refresh(&mut self) -> Result<(), String> {
        if let Err(error) = self.reload().await {
            self.notify.error(&error);
            return Err(error);
        }
        Ok(())
    }

    pub async fn set_page(&mut self, page: u32) -> Result<(), String> {
        self.query.set_page(page);
        self.refresh().await
    }

    pub async fn set_search(&mut self, term: &str) -> Result<(), String> {
        self.query.set_search(term);
        self.refresh().await
    }

    pub fn items(&self) -> &[SpecialItem] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page_count(&self) -> u32 {
        self.pages
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Whether the given item's checkbox for `day` is currently on.
    pub fn day_enabled(&self, id: &str, day: Weekday) -> bool {
        self.engine
            .draft_tokens(id)
            .map(|days| days.contains(&day))
            .unwrap_or(false)
    }

    pub fn is_dirty(&self, id: &str) -> bool {
        self.engine.is_dirty(id)
    }

    /// Number of items with pending edits; drives the Save button badge.
    pub fn dirty_count(&self) -> usize {
        self.engine.dirty_ids().len()
    }

    pub fn toggle_day(&mut self, id: &str, day: Weekday) {
        self.engine.toggle(id, day);
    }

    /// Flush pending edits. The Save trigger stays disabled while a save is
    /// outstanding; a call during that window is a no-op.
    ///
    /// All items saved: one success toast, then a refetch reseeds the page.
    /// Any item failed: one error toast; reconciled items stay reconciled
    /// and failed items stay dirty for the next save.
    pub async fn save(&mut self) -> SaveReport {
        if self.saving {
            return SaveReport::default();
        }
        self.saving = true;

        let update = &self.update;
        let report = self
            .engine
            .save(|id, days| async move { update.update(&id, days).await })
            .await;
        self.saving = false;

        if report.is_noop() {
            return report;
        }

        if report.all_succeeded() {
            self.notify
                .success(&format!("Updated {} special item(s)", report.saved.len()));
            if let Err(error) = self.reload().await {
                // The save itself is already reconciled; a stale table is
                // the only consequence.
                warn!(error = %error, "post-save refresh failed");
            }
        } else {
            self.notify.error(&format!(
                "Failed to update {} of {} special item(s)",
                report.failed.len(),
                report.attempted
            ));
        }
        report
    }
}
