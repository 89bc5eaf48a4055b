//! Per-run address memo with in-flight request deduplication

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

use super::GeocodeError;
use crate::record::Coordinates;

pub type CacheEntry = Result<Coordinates, GeocodeError>;

/// One slot per normalized address. The first caller for a key runs the
/// lookup; concurrent callers for the same key wait on the same slot.
#[derive(Default)]
pub struct GeocodeCache {
  entries: Mutex<HashMap<String, Arc<OnceCell<CacheEntry>>>>,
  requests: AtomicUsize,
}

pub struct CacheLookup {
  pub entry: CacheEntry,
  pub hit: bool,
}

impl GeocodeCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn get_or_resolve<F, Fut>(&self, key: &str, resolve: F) -> CacheLookup
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = CacheEntry>,
  {
    let slot = {
      let mut entries = self.entries.lock().await;
      Arc::clone(entries.entry(key.to_string()).or_default())
    };

    let fetched = AtomicBool::new(false);
    let fetched_flag = &fetched;
    let requests = &self.requests;
    let entry = slot
      .get_or_init(|| async move {
        fetched_flag.store(true, Ordering::Relaxed);
        requests.fetch_add(1, Ordering::Relaxed);
        resolve().await
      })
      .await
      .clone();

    CacheLookup { entry, hit: !fetched.load(Ordering::Relaxed) }
  }

  /// Outbound lookups issued so far
  pub fn requests(&self) -> usize {
    self.requests.load(Ordering::Relaxed)
  }

  pub async fn len(&self) -> usize {
    self.entries.lock().await.len()
  }

  pub async fn get(&self, key: &str) -> Option<CacheEntry> {
    let entries = self.entries.lock().await;
    entries.get(key).and_then(|slot| slot.get().cloned())
  }
}
