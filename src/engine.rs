//! Draft reconciliation engine for batch-editable dashboard pages.
//!
//! Pages that stage edits behind an explicit Save button (the special-items
//! weekday schedule) load a collection, keep a baseline snapshot of what the
//! server last confirmed, and let the user mutate a draft copy. Saving
//! flushes only the records whose draft differs from the baseline, each one
//! independently: successes are reconciled into the baseline, failures keep
//! their edits and stay dirty for the next save.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::hash::Hash;

use futures::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;

/// A member of a fixed attribute vocabulary (e.g. the weekday codes a
/// special item can be promoted on).
pub trait Token: Clone + Eq + Hash {
    /// Parse one raw token as the backend sent it. Unknown tokens return
    /// `None` and are dropped during seeding.
    fn parse(raw: &str) -> Option<Self>;

    /// Canonical wire spelling of the token.
    fn as_str(&self) -> &'static str;
}

/// A record that can seed the engine: an id plus the raw attribute tokens
/// exactly as the backend sent them.
pub trait Draftable {
    fn draft_id(&self) -> &str;
    fn raw_tokens(&self) -> &[String];
}

/// Outcome of one [`DraftEngine::save`] call.
///
/// `save` never fails as a whole; it reports which records were attempted
/// and how each dispatch settled. An empty report means there was nothing
/// to save.
#[derive(Debug, Clone, Default)]
pub struct SaveReport {
    /// Number of dirty records dispatched.
    pub attempted: usize,
    /// Ids whose update was acknowledged and reconciled into the baseline.
    pub saved: Vec<String>,
    /// Ids whose update was rejected, with the per-id error message.
    pub failed: Vec<(String, String)>,
}

impl SaveReport {
    /// True when there was nothing dirty to dispatch.
    pub fn is_noop(&self) -> bool {
        self.attempted == 0
    }

    /// True when every dispatched record was acknowledged.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Draft/baseline state for one page of records.
///
/// The baseline holds the last attribute sets known to match the server and
/// is written only by [`seed`](Self::seed) and by per-record save
/// acknowledgements. The draft holds the user's edits. A record is dirty
/// when its draft and baseline differ as sets; token order never matters.
pub struct DraftEngine<T: Token> {
    baseline: HashMap<String, HashSet<T>>,
    draft: HashMap<String, HashSet<T>>,
}

impl<T: Token> Default for DraftEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> DraftEngine<T> {
    pub fn new() -> Self {
        Self {
            baseline: HashMap::new(),
            draft: HashMap::new(),
        }
    }

    /// Replace both maps from a freshly fetched page of records.
    ///
    /// Tokens outside the vocabulary are dropped. Records previously
    /// tracked but absent from `records` are forgotten, discarding any
    /// unsaved edits they had; newly visible records start clean.
    pub fn seed<R: Draftable>(&mut self, records: &[R]) {
        let mut baseline: HashMap<String, HashSet<T>> = HashMap::with_capacity(records.len());
        for record in records {
            let mut tokens = HashSet::new();
            let mut dropped = 0usize;
            for raw in record.raw_tokens() {
                match T::parse(raw) {
                    Some(token) => {
                        tokens.insert(token);
                    }
                    None => dropped += 1,
                }
            }
            if dropped > 0 {
                warn!(
                    id = record.draft_id(),
                    dropped, "seed: dropped unrecognized attribute tokens"
                );
            }
            baseline.insert(record.draft_id().to_string(), tokens);
        }

        let lost = self
            .dirty_ids()
            .into_iter()
            .filter(|id| !baseline.contains_key(id))
            .count();
        if lost > 0 {
            warn!(
                count = lost,
                "seed: discarding unsaved edits for records no longer visible"
            );
        }

        self.draft = baseline.clone();
        self.baseline = baseline;
    }

    /// Flip one token in a record's draft set. Unseeded ids are a no-op;
    /// the caller only offers toggles for visible rows.
    pub fn toggle(&mut self, id: &str, token: T) {
        let Some(tokens) = self.draft.get_mut(id) else {
            return;
        };
        if !tokens.remove(&token) {
            tokens.insert(token);
        }
    }

    /// Current draft set for a record, if seeded.
    pub fn draft_tokens(&self, id: &str) -> Option<&HashSet<T>> {
        self.draft.get(id)
    }

    /// Last server-confirmed set for a record, if seeded.
    pub fn baseline_tokens(&self, id: &str) -> Option<&HashSet<T>> {
        self.baseline.get(id)
    }

    pub fn is_dirty(&self, id: &str) -> bool {
        match (self.draft.get(id), self.baseline.get(id)) {
            (Some(draft), Some(baseline)) => draft != baseline,
            (Some(_), None) => true,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.draft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draft.is_empty()
    }

    /// Ids whose draft differs from the baseline, recomputed on every call.
    /// Sorted so the result is deterministic.
    pub fn dirty_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .draft
            .iter()
            .filter(|&(id, tokens)| self.baseline.get(id) != Some(tokens))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Dispatch every dirty record through `dispatch`, all concurrently.
    ///
    /// Each outcome is independent: an acknowledged id has its baseline
    /// advanced to the draft, a rejected id keeps both maps untouched and
    /// stays dirty. With nothing dirty, `dispatch` is never invoked and an
    /// empty report is returned immediately.
    pub async fn save<F, Fut>(&mut self, dispatch: F) -> SaveReport
    where
        F: Fn(String, HashSet<T>) -> Fut,
        Fut: Future<Output = Result<(), String>>,
    {
        let dirty = self.dirty_ids();
        if dirty.is_empty() {
            return SaveReport::default();
        }

        let batch = Uuid::new_v4();
        debug!(batch = %batch, pending = dirty.len(), "dispatching draft saves");

        let outcomes = join_all(dirty.iter().map(|id| {
            let fut = dispatch(
                id.clone(),
                self.draft.get(id).cloned().unwrap_or_default(),
            );
            let id = id.clone();
            async move { (id, fut.await) }
        }))
        .await;

        let mut report = SaveReport {
            attempted: dirty.len(),
            ..SaveReport::default()
        };
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => {
                    if let Some(tokens) = self.draft.get(&id) {
                        self.baseline.insert(id.clone(), tokens.clone());
                    }
                    report.saved.push(id);
                }
                Err(error) => {
                    warn!(batch = %batch, id = %id, error = %error, "draft save failed, record stays dirty");
                    report.failed.push((id, error));
                }
            }
        }

        debug!(
            batch = %batch,
            saved = report.saved.len(),
            failed = report.failed.len(),
            "draft save batch settled"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::Weekday;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Row {
        id: String,
        days: Vec<String>,
    }

    impl Row {
        fn new(id: &str, days: &[&str]) -> Self {
            Self {
                id: id.to_string(),
                days: days.iter().map(|d| d.to_string()).collect(),
            }
        }
    }

    impl Draftable for Row {
        fn draft_id(&self) -> &str {
            &self.id
        }
        fn raw_tokens(&self) -> &[String] {
            &self.days
        }
    }

    fn days(tokens: &[Weekday]) -> HashSet<Weekday> {
        tokens.iter().copied().collect()
    }

    #[test]
    fn seed_is_idempotent() {
        let rows = vec![Row::new("1", &["mon"]), Row::new("2", &[])];
        let mut engine: DraftEngine<Weekday> = DraftEngine::new();

        engine.seed(&rows);
        assert!(engine.dirty_ids().is_empty());
        let first_draft = engine.draft_tokens("1").cloned();

        engine.seed(&rows);
        assert!(engine.dirty_ids().is_empty());
        assert_eq!(engine.draft_tokens("1").cloned(), first_draft);
        assert_eq!(engine.baseline_tokens("1"), engine.draft_tokens("1"));
    }

    #[test]
    fn seed_drops_unrecognized_tokens() {
        let rows = vec![Row::new("1", &["mon", "funday", "TUE", " wed "])];
        let mut engine: DraftEngine<Weekday> = DraftEngine::new();
        engine.seed(&rows);

        assert_eq!(
            engine.draft_tokens("1"),
            Some(&days(&[Weekday::Mon, Weekday::Tue, Weekday::Wed]))
        );
        assert!(engine.dirty_ids().is_empty());
    }

    #[test]
    fn seed_forgets_vanished_records_and_their_edits() {
        let mut engine: DraftEngine<Weekday> = DraftEngine::new();
        engine.seed(&[Row::new("1", &["mon"]), Row::new("2", &[])]);
        engine.toggle("2", Weekday::Tue);
        assert_eq!(engine.dirty_ids(), vec!["2".to_string()]);

        engine.seed(&[Row::new("1", &["mon"])]);
        assert!(engine.dirty_ids().is_empty());
        assert!(engine.draft_tokens("2").is_none());
        assert!(engine.baseline_tokens("2").is_none());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn toggle_twice_restores_the_draft() {
        let mut engine: DraftEngine<Weekday> = DraftEngine::new();
        engine.seed(&[Row::new("1", &["mon", "fri"])]);
        let before = engine.draft_tokens("1").cloned().unwrap();

        engine.toggle("1", Weekday::Wed);
        assert!(engine.is_dirty("1"));
        engine.toggle("1", Weekday::Wed);
        assert_eq!(engine.draft_tokens("1").cloned().unwrap(), before);
        assert!(!engine.is_dirty("1"));
    }

    #[test]
    fn toggle_on_unseeded_id_is_a_noop() {
        let mut engine: DraftEngine<Weekday> = DraftEngine::new();
        engine.seed(&[Row::new("1", &["mon"])]);
        engine.toggle("missing", Weekday::Mon);
        assert!(engine.dirty_ids().is_empty());
        assert!(engine.draft_tokens("missing").is_none());
    }

    #[test]
    fn dirty_detection_ignores_token_order() {
        // Baseline mon,tue; draft rebuilt as tue,mon via toggles.
        let mut engine: DraftEngine<Weekday> = DraftEngine::new();
        engine.seed(&[Row::new("1", &["mon", "tue"])]);
        engine.toggle("1", Weekday::Mon);
        engine.toggle("1", Weekday::Tue);
        engine.toggle("1", Weekday::Tue);
        engine.toggle("1", Weekday::Mon);
        assert!(engine.dirty_ids().is_empty());
    }

    #[tokio::test]
    async fn save_reconciles_only_touched_successful_ids() {
        let mut engine: DraftEngine<Weekday> = DraftEngine::new();
        engine.seed(&[
            Row::new("a", &["mon"]),
            Row::new("b", &["tue"]),
            Row::new("c", &["wed"]),
        ]);
        engine.toggle("b", Weekday::Fri);
        engine.toggle("c", Weekday::Sat);

        let report = engine
            .save(|id, _tokens| async move {
                if id == "c" {
                    Err("validation failed".to_string())
                } else {
                    Ok(())
                }
            })
            .await;

        assert_eq!(report.attempted, 2);
        assert_eq!(report.saved, vec!["b".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "c");

        // a untouched, b reconciled, c still dirty with its edit intact.
        assert!(!engine.is_dirty("a"));
        assert_eq!(
            engine.baseline_tokens("b"),
            Some(&days(&[Weekday::Tue, Weekday::Fri]))
        );
        assert!(!engine.is_dirty("b"));
        assert!(engine.is_dirty("c"));
        assert_eq!(
            engine.draft_tokens("c"),
            Some(&days(&[Weekday::Wed, Weekday::Sat]))
        );
        assert_eq!(engine.baseline_tokens("c"), Some(&days(&[Weekday::Wed])));
        assert_eq!(engine.dirty_ids(), vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn save_with_nothing_dirty_never_dispatches() {
        let mut engine: DraftEngine<Weekday> = DraftEngine::new();
        engine.seed(&[Row::new("1", &["mon"])]);

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let report = engine
            .save(move |_id, _tokens| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        assert!(report.is_noop());
        assert!(report.all_succeeded());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn full_success_scenario() {
        let mut engine: DraftEngine<Weekday> = DraftEngine::new();
        engine.seed(&[Row::new("1", &["mon"]), Row::new("2", &[])]);
        engine.toggle("2", Weekday::Tue);
        assert_eq!(engine.dirty_ids(), vec!["2".to_string()]);

        let report = engine.save(|_id, _tokens| async { Ok(()) }).await;

        assert!(report.all_succeeded());
        assert!(!report.is_noop());
        assert_eq!(engine.baseline_tokens("2"), Some(&days(&[Weekday::Tue])));
        assert!(engine.dirty_ids().is_empty());
    }

    #[tokio::test]
    async fn failure_scenario_keeps_edit_and_baseline() {
        let mut engine: DraftEngine<Weekday> = DraftEngine::new();
        engine.seed(&[Row::new("1", &["mon"]), Row::new("2", &[])]);
        engine.toggle("2", Weekday::Tue);

        let report = engine
            .save(|_id, _tokens| async { Err("boom".to_string()) })
            .await;

        assert!(!report.all_succeeded());
        assert_eq!(engine.dirty_ids(), vec!["2".to_string()]);
        assert_eq!(engine.draft_tokens("2"), Some(&days(&[Weekday::Tue])));
        assert_eq!(engine.baseline_tokens("2"), Some(&days(&[])));
    }

    #[tokio::test]
    async fn failed_ids_are_retried_by_the_next_save() {
        let mut engine: DraftEngine<Weekday> = DraftEngine::new();
        engine.seed(&[Row::new("1", &[])]);
        engine.toggle("1", Weekday::Sun);

        let report = engine
            .save(|_id, _tokens| async { Err("offline".to_string()) })
            .await;
        assert_eq!(report.failed.len(), 1);

        let report = engine.save(|_id, _tokens| async { Ok(()) }).await;
        assert_eq!(report.saved, vec!["1".to_string()]);
        assert!(engine.dirty_ids().is_empty());
    }
}
