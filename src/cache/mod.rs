//! Version-keyed memoization of complexity results.
//!
//! A document URI has at most one settled entry (the last version computed)
//! and at most one in-flight computation. Concurrent requests for the version
//! that is already in flight await the same `OnceCell` instead of starting a
//! second computation. When the computation settles it is cached only if its
//! registration is still the live one: a newer version's request or a closed
//! document discards it. A request for a version older than the registered or
//! settled one is computed for its caller alone and never cached.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::core::MethodComplexity;

/// Complexity list shared between the cache and every requester.
pub type SharedComplexities = Arc<Vec<MethodComplexity>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    version: i32,
    complexities: SharedComplexities,
}

/// Output of a compute function passed to [`ResultCache::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Computed {
    /// Scored from the requested version; eligible for caching.
    Current(Vec<MethodComplexity>),
    /// Scored from some other state of the document; handed to the
    /// requesters of this computation but never cached.
    Uncacheable(Vec<MethodComplexity>),
}

impl Computed {
    fn is_cacheable(&self) -> bool {
        matches!(self, Self::Current(_))
    }

    fn into_complexities(self) -> Vec<MethodComplexity> {
        match self {
            Self::Current(complexities) | Self::Uncacheable(complexities) => complexities,
        }
    }
}

impl From<Vec<MethodComplexity>> for Computed {
    fn from(complexities: Vec<MethodComplexity>) -> Self {
        Self::Current(complexities)
    }
}

#[derive(Debug)]
struct Outcome {
    complexities: SharedComplexities,
    cacheable: bool,
}

type Slot = Arc<OnceCell<Outcome>>;

#[derive(Debug, Clone)]
struct InFlight {
    version: i32,
    cell: Slot,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
    /// Requests that awaited a computation another caller had started.
    pub joined: usize,
    /// Settled results dropped because a newer request or a close superseded them.
    pub discarded: usize,
}

#[derive(Debug, Default)]
pub struct ResultCache {
    settled: DashMap<String, CacheEntry>,
    in_flight: Mutex<HashMap<String, InFlight>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    joined: AtomicUsize,
    discarded: AtomicUsize,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settled result for exactly this version, if any.
    pub fn cached(&self, uri: &str, version: i32) -> Option<SharedComplexities> {
        self.settled
            .get(uri)
            .filter(|entry| entry.version == version)
            .map(|entry| Arc::clone(&entry.complexities))
    }

    /// Return the result for `(uri, version)`, computing it at most once.
    ///
    /// `compute` runs only when neither a settled result nor an in-flight
    /// computation exists for this version. Older versions than the one
    /// registered or settled are computed without being shared or cached.
    pub async fn get<F, Fut, R>(&self, uri: &str, version: i32, compute: F) -> SharedComplexities
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
        R: Into<Computed>,
    {
        let cell = {
            let mut in_flight = self.in_flight.lock();

            if let Some(hit) = self.cached(uri, version) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return hit;
            }

            let newer_registered = in_flight
                .get(uri)
                .map(|pending| pending.version)
                .into_iter()
                .chain(self.settled.get(uri).map(|entry| entry.version))
                .any(|newer| newer > version);

            match in_flight.get(uri) {
                Some(pending) if pending.version == version => {
                    self.joined.fetch_add(1, Ordering::Relaxed);
                    debug!(uri, version, "Joining in-flight computation");
                    Some(Arc::clone(&pending.cell))
                }
                _ if newer_registered => None,
                _ => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    let cell = Arc::new(OnceCell::new());
                    let superseded = in_flight.insert(
                        uri.to_string(),
                        InFlight {
                            version,
                            cell: Arc::clone(&cell),
                        },
                    );
                    if let Some(old) = superseded {
                        debug!(uri, old = old.version, new = version, "Superseding in-flight computation");
                    }
                    Some(cell)
                }
            }
        };

        let Some(cell) = cell else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            self.discarded.fetch_add(1, Ordering::Relaxed);
            debug!(uri, version, "Computing outdated version without caching");
            let computed: Computed = compute().await.into();
            return Arc::new(computed.into_complexities());
        };

        let outcome = cell
            .get_or_init(|| async move {
                let computed: Computed = compute().await.into();
                Outcome {
                    cacheable: computed.is_cacheable(),
                    complexities: Arc::new(computed.into_complexities()),
                }
            })
            .await;
        let complexities = Arc::clone(&outcome.complexities);

        self.settle(uri, version, &cell, outcome.cacheable, &complexities);
        complexities
    }

    fn settle(
        &self,
        uri: &str,
        version: i32,
        cell: &Slot,
        cacheable: bool,
        complexities: &SharedComplexities,
    ) {
        let mut in_flight = self.in_flight.lock();

        let registered = in_flight
            .get(uri)
            .is_some_and(|pending| Arc::ptr_eq(&pending.cell, cell));
        if registered {
            in_flight.remove(uri);
        }

        if !cacheable {
            if registered {
                self.discarded.fetch_add(1, Ordering::Relaxed);
                debug!(uri, version, "Result not scored from requested version, not caching");
            }
            return;
        }

        if !registered {
            // Another requester of the same computation may have settled it.
            if self.cached(uri, version).is_none() {
                self.discarded.fetch_add(1, Ordering::Relaxed);
                debug!(uri, version, "Discarding superseded result");
            }
            return;
        }

        let newer_settled = self
            .settled
            .get(uri)
            .is_some_and(|entry| entry.version > version);
        if newer_settled {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            debug!(uri, version, "Discarding result older than settled entry");
            return;
        }

        self.settled.insert(
            uri.to_string(),
            CacheEntry {
                version,
                complexities: Arc::clone(complexities),
            },
        );
    }

    /// Drop the settled and in-flight state of a closed document.
    pub fn evict(&self, uri: &str) {
        self.in_flight.lock().remove(uri);
        self.settled.remove(uri);
    }

    pub fn clear(&self) {
        self.in_flight.lock().clear();
        self.settled.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.settled.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            joined: self.joined.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}
