//! The in-memory store: a value table plus an expiration index, guarded
//! as a single consistency domain behind one mutex. Every operation takes
//! the lock for its full duration, so store calls are linearizable with
//! respect to each other.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::Duration,
};

use thiserror::Error;
use tokio::{sync::Mutex, time::Instant};
use tracing::debug;

/// The store engine shared between connection tasks and the sweeper.
pub type SharedStore = Arc<Mutex<KeyValueStore>>;

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("operation against a key holding the wrong kind of value")]
    WrongType,
}

/// A key maps to exactly one of these at a time; writing a scalar over a
/// list (or creating a list where a scalar expired) replaces the prior
/// value entirely.
#[derive(Debug, PartialEq, Clone)]
pub enum StoredValue {
    Scalar(String),
    List(VecDeque<String>),
}

#[derive(Debug, Default)]
pub struct KeyValueStore {
    entries: HashMap<String, StoredValue>,
    expirations: HashMap<String, Instant>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves the value stored at `key`.
    ///
    /// Performs the lazy-expiry check first: if the key carries an
    /// expiration instant that is not in the future, both the value and
    /// the expiration entry are removed and `None` is returned. This
    /// check runs on every get, independently of the background sweeper.
    pub fn get(&mut self, key: &str) -> Option<&StoredValue> {
        self.evict_if_expired(key);
        self.entries.get(key)
    }

    /// Stores a scalar value at `key`, overwriting any existing value of
    /// either type.
    ///
    /// A positive `ttl` records an expiration instant of now + ttl; `None`
    /// (or a zero ttl upstream) clears any prior expiration rather than
    /// preserving it.
    pub fn set_scalar(&mut self, key: String, value: String, ttl: Option<Duration>) {
        // A ttl too large to resolve to an instant degrades to "no
        // expiration" rather than panicking mid-write; the dispatcher
        // rejects such ttls before they reach the store.
        let expiration = ttl
            .filter(|ttl| !ttl.is_zero())
            .and_then(|ttl| Instant::now().checked_add(ttl));

        self.entries.insert(key.clone(), StoredValue::Scalar(value));

        match expiration {
            Some(expiration) => {
                self.expirations.insert(key, expiration);
            }
            None => {
                self.expirations.remove(&key);
            }
        }
    }

    /// Appends `values`, in order, to the end of the list at `key`,
    /// creating the list if the key is absent. Returns the new length.
    pub fn rpush(&mut self, key: String, values: Vec<String>) -> Result<usize, StoreError> {
        let list = self.list_for_push(key)?;

        for value in values {
            list.push_back(value);
        }

        Ok(list.len())
    }

    /// Prepends `values` to the front of the list at `key`, preserving
    /// their relative order: pushing `[a, b]` yields `[a, b, ...existing]`.
    /// Creates the list if the key is absent. Returns the new length.
    pub fn lpush(&mut self, key: String, values: Vec<String>) -> Result<usize, StoreError> {
        let list = self.list_for_push(key)?;

        for value in values.into_iter().rev() {
            list.push_front(value);
        }

        Ok(list.len())
    }

    /// Returns the elements of the list at `key` between the signed
    /// indices `start` and `stop`, inclusive. Negative indices count from
    /// the end (-1 is the last element); out-of-bounds indices are clamped
    /// into range, and a clamped start past the clamped stop yields an
    /// empty vector. An absent key also yields an empty vector.
    pub fn lrange(
        &mut self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, StoreError> {
        self.evict_if_expired(key);

        let list = match self.entries.get(key) {
            Some(StoredValue::List(list)) => list,
            Some(StoredValue::Scalar(_)) => return Err(StoreError::WrongType),
            None => return Ok(Vec::new()),
        };

        let length = list.len() as isize;

        if length == 0 {
            return Ok(Vec::new());
        }

        let start = clamp_index(start, length);
        let stop = clamp_index(stop, length);

        if start > stop {
            return Ok(Vec::new());
        }

        Ok(list
            .range(start as usize..=stop as usize)
            .cloned()
            .collect())
    }

    /// Evicts every key whose recorded expiration instant is at or before
    /// `now`, and drops stale expiration entries whose key no longer
    /// exists in the value table. Returns the number of evicted keys.
    pub fn remove_expired(&mut self, now: Instant) -> usize {
        let expired = self
            .expirations
            .iter()
            .filter(|(_, &expiration)| expiration <= now)
            .map(|(key, _)| key.clone())
            .collect::<Vec<String>>();

        let mut evicted = 0;

        for key in expired {
            self.expirations.remove(&key);

            if self.entries.remove(&key).is_some() {
                evicted += 1;
            }
        }

        self.expirations
            .retain(|key, _| self.entries.contains_key(key));

        evicted
    }

    /// Number of live entries in the value table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn list_for_push(&mut self, key: String) -> Result<&mut VecDeque<String>, StoreError> {
        self.evict_if_expired(&key);

        match self
            .entries
            .entry(key)
            .or_insert_with(|| StoredValue::List(VecDeque::new()))
        {
            StoredValue::List(list) => Ok(list),
            StoredValue::Scalar(_) => Err(StoreError::WrongType),
        }
    }

    fn evict_if_expired(&mut self, key: &str) {
        if let Some(&expiration) = self.expirations.get(key) {
            if expiration <= Instant::now() {
                self.entries.remove(key);
                self.expirations.remove(key);
            }
        }
    }
}

/// Resolves a signed list index against `length` and clamps it into
/// `[0, length - 1]`. Negative indices count from the end of the list.
fn clamp_index(index: isize, length: isize) -> isize {
    let resolved = if index < 0 { length + index } else { index };

    resolved.clamp(0, length - 1)
}

/// Runs the background expiry sweeper for the lifetime of the process.
///
/// Each tick locks the store once and evicts every key past its
/// expiration instant. This is purely an eager-cleanup pass; expiration
/// correctness does not depend on it, since reads perform the same check
/// lazily.
pub async fn run_expiry_sweeper(store: SharedStore, period: Duration) {
    let mut ticker = tokio::time::interval(period);

    loop {
        ticker.tick().await;

        let mut store_guard = store.lock().await;
        let evicted = store_guard.remove_expired(Instant::now());

        if evicted > 0 {
            debug!(evicted, "expiry sweeper evicted keys");
        }
    }
}
