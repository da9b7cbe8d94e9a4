use crate::error::{CacheError, ProductionError, Result};
use crate::producer::ContentProducer;
use disclosure_index::{Descriptor, MetadataIndex};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;

type Outcome = std::result::Result<Arc<CacheEntry>, ProductionError>;

/// Materialized payload. Written once, never replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub id: String,
    pub content: Arc<str>,
    pub created_ms: u64,
}

/// One successful production call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogRecord {
    pub id: String,
    pub timestamp_ms: u64,
    pub latency: Duration,
}

impl AccessLogRecord {
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStatistics {
    /// Descriptors in the index
    pub total_known: usize,

    /// Identifiers with a stored entry
    pub total_cached: usize,

    /// UTF-8 size of every stored payload
    pub total_cached_bytes: usize,

    /// Production calls recorded in the access log
    pub access_count: usize,

    /// Sum of recorded production latencies
    pub total_latency_ms: f64,
}

/// Outcome of a best-effort [`ContentCache::preload`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadReport {
    pub loaded: Vec<String>,
    pub missing: Vec<String>,
    pub failed: Vec<String>,
}

enum Slot {
    Ready(Arc<CacheEntry>),
    /// Production in flight; the outcome is published to every receiver
    Pending(watch::Receiver<Option<Outcome>>),
}

impl Slot {
    fn entry(&self) -> Option<&Arc<CacheEntry>> {
        match self {
            Self::Ready(entry) => Some(entry),
            Self::Pending(_) => None,
        }
    }
}

enum Claim {
    Hit(Arc<CacheEntry>),
    Wait(watch::Receiver<Option<Outcome>>),
    Produce(watch::Sender<Option<Outcome>>),
}

/// Lazily materialized payloads keyed by descriptor id.
///
/// The first caller for an id produces it. Callers arriving while that
/// production is in flight wait for its outcome, success or error, instead of
/// calling the producer themselves. Other ids proceed independently. The map
/// lock is only held to inspect or update a slot, never across an `.await`.
pub struct ContentCache {
    index: Arc<MetadataIndex>,
    producer: Arc<dyn ContentProducer>,
    slots: Mutex<HashMap<String, Slot>>,
    access_log: Mutex<Vec<AccessLogRecord>>,
}

impl ContentCache {
    pub fn new(index: Arc<MetadataIndex>, producer: Arc<dyn ContentProducer>) -> Self {
        Self {
            index,
            producer,
            slots: Mutex::new(HashMap::new()),
            access_log: Mutex::new(Vec::new()),
        }
    }

    pub fn index(&self) -> &Arc<MetadataIndex> {
        &self.index
    }

    /// Return the payload for `id`, producing it on first use.
    ///
    /// A hit has no side effects. A miss consults the index, calls the
    /// producer, stores the entry and appends one access log record. Failed
    /// production stores nothing: callers already waiting on that call get
    /// the same error, and a later call tries again.
    pub async fn materialize(&self, id: &str) -> Result<Arc<str>> {
        if let Some(entry) = self.entry(id) {
            log::debug!("Cache hit: {id}");
            return Ok(Arc::clone(&entry.content));
        }

        let descriptor = self
            .index
            .get(id)
            .ok_or_else(|| CacheError::NotFound(id.to_string()))?;

        loop {
            let mut receiver = match self.claim(id) {
                Claim::Hit(entry) => return Ok(Arc::clone(&entry.content)),
                Claim::Produce(sender) => return self.produce(descriptor, sender).await,
                Claim::Wait(receiver) => receiver,
            };

            log::debug!("Waiting on in-flight production of {id}");
            let outcome = receiver
                .wait_for(Option::is_some)
                .await
                .ok()
                .and_then(|shared| (*shared).clone());
            match outcome {
                Some(Ok(entry)) => return Ok(Arc::clone(&entry.content)),
                Some(Err(source)) => {
                    return Err(CacheError::ProductionFailed {
                        id: id.to_string(),
                        source,
                    })
                }
                // The producing call was dropped before it finished
                None => continue,
            }
        }
    }

    /// Stored entry for `id`, without producing anything
    pub fn entry(&self, id: &str) -> Option<Arc<CacheEntry>> {
        lock(&self.slots).get(id).and_then(Slot::entry).cloned()
    }

    pub fn is_cached(&self, id: &str) -> bool {
        self.entry(id).is_some()
    }

    /// Materialize `ids` in order. Unknown ids and producer failures are
    /// logged and reported, never raised.
    pub async fn preload<I, S>(&self, ids: I) -> PreloadReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = PreloadReport::default();
        for id in ids {
            let id = id.as_ref();
            match self.materialize(id).await {
                Ok(_) => report.loaded.push(id.to_string()),
                Err(CacheError::NotFound(_)) => {
                    log::warn!("Preload skipped unknown id {id}");
                    report.missing.push(id.to_string());
                }
                Err(err) => {
                    log::warn!("Preload failed for {id}: {err}");
                    report.failed.push(id.to_string());
                }
            }
        }
        log::info!(
            "Preload finished: {} loaded, {} missing, {} failed",
            report.loaded.len(),
            report.missing.len(),
            report.failed.len()
        );
        report
    }

    /// Consistent snapshot: an entry and its access log record appear together.
    pub fn statistics(&self) -> CacheStatistics {
        let slots = lock(&self.slots);
        let (total_cached, total_cached_bytes) = slots
            .values()
            .filter_map(Slot::entry)
            .fold((0usize, 0usize), |(count, bytes), entry| {
                (count + 1, bytes + entry.content.len())
            });

        let (access_count, total_latency) = {
            let log = lock(&self.access_log);
            (log.len(), log.iter().map(|r| r.latency).sum::<Duration>())
        };
        drop(slots);

        CacheStatistics {
            total_known: self.index.len(),
            total_cached,
            total_cached_bytes,
            access_count,
            total_latency_ms: total_latency.as_secs_f64() * 1000.0,
        }
    }

    /// Snapshot of the access log in append order
    pub fn access_log(&self) -> Vec<AccessLogRecord> {
        lock(&self.access_log).clone()
    }

    fn claim(&self, id: &str) -> Claim {
        let mut slots = lock(&self.slots);
        match slots.entry(id.to_string()) {
            Entry::Occupied(slot) => match slot.get() {
                Slot::Ready(entry) => Claim::Hit(Arc::clone(entry)),
                Slot::Pending(receiver) => Claim::Wait(receiver.clone()),
            },
            Entry::Vacant(slot) => {
                let (sender, receiver) = watch::channel(None);
                slot.insert(Slot::Pending(receiver));
                Claim::Produce(sender)
            }
        }
    }

    async fn produce(
        &self,
        descriptor: &Descriptor,
        sender: watch::Sender<Option<Outcome>>,
    ) -> Result<Arc<str>> {
        let mut in_flight = InFlight {
            slots: &self.slots,
            id: &descriptor.id,
            settled: false,
        };

        log::info!("Materializing {}", descriptor.id);
        let start = Instant::now();
        let produced = self.producer.produce(descriptor).await;
        let latency = start.elapsed();

        let outcome = match produced {
            Ok(content) => {
                let entry = Arc::new(CacheEntry {
                    id: descriptor.id.clone(),
                    content: Arc::from(content),
                    created_ms: unix_ms_now(),
                });
                {
                    let mut slots = lock(&self.slots);
                    slots.insert(descriptor.id.clone(), Slot::Ready(Arc::clone(&entry)));
                    lock(&self.access_log).push(AccessLogRecord {
                        id: descriptor.id.clone(),
                        timestamp_ms: entry.created_ms,
                        latency,
                    });
                }
                log::info!(
                    "Materialized {} ({} bytes, {:.1} ms)",
                    entry.id,
                    entry.content.len(),
                    latency.as_secs_f64() * 1000.0
                );
                Ok(entry)
            }
            Err(source) => {
                log::warn!("Content production failed for {}: {source}", descriptor.id);
                lock(&self.slots).remove(&descriptor.id);
                Err(source)
            }
        };
        in_flight.settled = true;
        sender.send_replace(Some(outcome.clone()));

        outcome
            .map(|entry| Arc::clone(&entry.content))
            .map_err(|source| CacheError::ProductionFailed {
                id: descriptor.id.clone(),
                source,
            })
    }
}

/// Clears a pending slot when its producing call is dropped mid-flight, so a
/// waiting caller can take over.
struct InFlight<'a> {
    slots: &'a Mutex<HashMap<String, Slot>>,
    id: &'a str,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut slots = lock(self.slots);
        if matches!(slots.get(self.id), Some(Slot::Pending(_))) {
            slots.remove(self.id);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unix_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
