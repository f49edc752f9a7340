// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::time::{Duration, Instant};

use crate::{Category, CollectionProvider, CollectionSnapshot, QueryKey};

/// Fetches tried per invalidation before the cache stops retrying on its own.
pub const MAX_FETCH_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Client-side copy of one collection, refetched on the next read after invalidation.
#[derive(Debug, Clone)]
pub struct QueryCache {
    key: QueryKey,
    items: Vec<Category>,
    fetched: bool,
    stale: bool,
    failed: bool,
    failures: u32,
    retry_at: Option<Instant>,
    invalidations: usize,
}

impl QueryCache {
    pub fn new(key: QueryKey) -> Self {
        Self {
            key,
            items: Vec::new(),
            fetched: false,
            stale: true,
            failed: false,
            failures: 0,
            retry_at: None,
            invalidations: 0,
        }
    }

    pub fn refresh_with<F>(&mut self, fetch: F) -> Result<bool>
    where
        F: FnOnce() -> Result<Vec<Category>>,
    {
        self.refresh_at(Instant::now(), fetch)
    }

    /// Runs `fetch` when the cache is stale and no retry delay is pending.
    ///
    /// A failed fetch keeps the previous rows and schedules a retry with doubling
    /// delay. After [`MAX_FETCH_ATTEMPTS`] failures the cache stays failed until
    /// the next invalidation.
    pub fn refresh_at<F>(&mut self, now: Instant, fetch: F) -> Result<bool>
    where
        F: FnOnce() -> Result<Vec<Category>>,
    {
        if !self.stale {
            return Ok(false);
        }
        if let Some(retry_at) = self.retry_at
            && now < retry_at
        {
            return Ok(false);
        }
        match fetch() {
            Ok(items) => {
                tracing::debug!(query = self.key.as_str(), rows = items.len(), "query refreshed");
                self.items = items;
                self.fetched = true;
                self.stale = false;
                self.failed = false;
                self.failures = 0;
                self.retry_at = None;
                Ok(true)
            }
            Err(error) => {
                self.failed = true;
                self.failures += 1;
                if self.failures >= MAX_FETCH_ATTEMPTS {
                    self.stale = false;
                    self.retry_at = None;
                } else {
                    self.retry_at = Some(now + RETRY_BASE_DELAY * 2u32.pow(self.failures - 1));
                }
                tracing::warn!(
                    query = self.key.as_str(),
                    attempt = self.failures,
                    retrying = self.stale,
                    "query fetch failed"
                );
                Err(error)
            }
        }
    }

    pub fn items(&self) -> &[Category] {
        &self.items
    }

    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    pub const fn has_failed(&self) -> bool {
        self.failed
    }

    pub const fn invalidation_count(&self) -> usize {
        self.invalidations
    }
}

impl CollectionProvider for QueryCache {
    fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot {
            items: self.items.clone(),
            is_loading: !self.fetched && !self.failed,
        }
    }

    fn invalidate(&mut self, key: QueryKey) {
        if key != self.key {
            return;
        }
        self.stale = true;
        self.failed = false;
        self.failures = 0;
        self.retry_at = None;
        self.invalidations += 1;
        tracing::debug!(query = key.as_str(), "query invalidated");
    }
}
