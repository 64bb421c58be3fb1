//! Document lifecycle entry points composed over the tree and result caches.
//!
//! [`ComplexityService`] is what an editor integration drives: it forwards
//! open/change/close notifications to the [`DocumentTreeCache`], answers
//! complexity requests through the [`ResultCache`] and coalesces edit bursts
//! with a [`Debouncer`]. None of its methods return errors; failures are
//! logged and degrade to an empty or last-good result.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{CacheStats, Computed, ResultCache, SharedComplexities};
use crate::complexity::compute_complexity;
use crate::config::CognilensConfig;
use crate::core::Result;
use crate::debounce::Debouncer;
use crate::document::{ContentChange, DocumentTreeCache};
use crate::parsing::{SyntaxParser, TreeSitterParsers};

pub struct ComplexityService {
    trees: Mutex<DocumentTreeCache>,
    results: ResultCache,
    debouncer: Debouncer,
}

impl ComplexityService {
    pub fn new(parsers: Arc<dyn SyntaxParser>, config: &CognilensConfig) -> Self {
        Self {
            trees: Mutex::new(DocumentTreeCache::with_aliases(
                parsers,
                config.languages.clone(),
            )),
            results: ResultCache::new(),
            debouncer: Debouncer::new(config.revalidation.debounce()),
        }
    }

    /// Service backed by tree-sitter parsers for every supported language.
    pub fn with_tree_sitter(config: &CognilensConfig) -> Result<Self> {
        let parsers = TreeSitterParsers::new()?;
        Ok(Self::new(Arc::new(parsers), config))
    }

    pub fn on_open(&self, uri: &str, language_id: &str, version: i32, text: &str) {
        // A reopened document may carry different text under a reused version.
        self.results.evict(uri);
        if let Err(e) = self.trees.lock().open(uri, language_id, version, text) {
            warn!(uri, language_id, error = %e, "Document not tracked");
        }
    }

    pub fn on_change(&self, uri: &str, version: i32, changes: &[ContentChange]) {
        if let Err(e) = self.trees.lock().change(uri, version, changes) {
            warn!(uri, version, error = %e, "Change not applied");
        }
    }

    pub fn on_close(&self, uri: &str) {
        self.debouncer.cancel(uri);
        self.trees.lock().close(uri);
        self.results.evict(uri);
    }

    /// Complexity of `uri` at `version`, computed at most once per version.
    pub async fn get_complexity(&self, uri: &str, version: i32) -> SharedComplexities {
        self.results
            .get(uri, version, move || async move { self.compute_current(uri, version) })
            .await
    }

    /// Recompute after the quiet period, then hand the result to `on_ready`.
    ///
    /// Scheduling again for the same URI before the period elapses replaces
    /// the pending run.
    pub fn schedule_revalidation<F>(self: &Arc<Self>, uri: &str, version: i32, on_ready: F)
    where
        F: FnOnce(SharedComplexities) + Send + 'static,
    {
        let service = Arc::clone(self);
        let key = uri.to_string();
        self.debouncer.schedule(uri, async move {
            let complexities = service.get_complexity(&key, version).await;
            on_ready(complexities);
        });
    }

    pub fn document_version(&self, uri: &str) -> Option<i32> {
        self.trees.lock().version(uri)
    }

    pub fn is_open(&self, uri: &str) -> bool {
        self.trees.lock().contains(uri)
    }

    pub fn result_stats(&self) -> CacheStats {
        self.results.stats()
    }

    pub fn pending_revalidations(&self) -> usize {
        self.debouncer.pending()
    }

    /// Score the tracked tree. A tree at a different version than requested
    /// (the change notification has not arrived yet, or a newer one has) is
    /// still scored for the caller but never cached under `version`.
    fn compute_current(&self, uri: &str, version: i32) -> Computed {
        let trees = self.trees.lock();

        let Some(scored) = trees.with_document(uri, |doc| {
            let complexities = compute_complexity(doc.tree(), doc.text(), doc.language().id());
            (doc.version(), complexities)
        }) else {
            warn!(uri, version, "No tree for requested document");
            return Computed::Uncacheable(Vec::new());
        };

        match scored {
            (tracked, complexities) if tracked == version => Computed::Current(complexities),
            (tracked, complexities) => {
                debug!(uri, tracked, requested = version, "Scored tree at a different version");
                Computed::Uncacheable(complexities)
            }
        }
    }
}
