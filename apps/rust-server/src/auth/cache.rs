// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped claim cache.
//!
//! Claims of a verified token live here only while the request that verified
//! it is in flight. The gate admits the claims right after verification and
//! holds a [`ClaimGuard`] across the handler; dropping the guard releases the
//! entry whether the handler returned, panicked or was cancelled.
//!
//! A single `RwLock` protects the whole map: claim lookups share the read
//! lock, admission and eviction take the write lock. No lock is held across
//! an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use super::claims::Claims;

struct Entry {
    claims: Claims,
    /// In-flight requests currently bearing this token.
    holders: usize,
}

/// Process-wide map from raw bearer token to its verified claims.
#[derive(Clone, Default)]
pub struct ClaimCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl ClaimCache {
    pub fn new() -> Self {
        Self::default()
    }

    // The map stays consistent even if a holder panicked, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `claims` for `token`, replacing any previous claims.
    ///
    /// The entry is not tied to a request; it stays until [`ClaimCache::evict`].
    pub fn insert(&self, token: impl Into<String>, claims: Claims) {
        self.write()
            .entry(token.into())
            .and_modify(|entry| entry.claims = claims.clone())
            .or_insert(Entry { claims, holders: 0 });
    }

    /// Store `claims` for the lifetime of the returned guard.
    ///
    /// Two requests bearing the same token each hold the entry; it is removed
    /// when the last of them finishes.
    pub fn admit(&self, token: impl Into<String>, claims: Claims) -> ClaimGuard {
        let token = token.into();
        {
            let mut entries = self.write();
            let entry = entries.entry(token.clone()).or_insert(Entry {
                claims: Claims::default(),
                holders: 0,
            });
            entry.claims = claims;
            entry.holders += 1;
        }
        ClaimGuard {
            cache: self.clone(),
            token,
        }
    }

    /// Claim `key` of `token`, or `None` when either is unknown.
    pub fn lookup(&self, token: &str, key: &str) -> Option<Value> {
        self.read()
            .get(token)
            .and_then(|entry| entry.claims.get(key))
            .cloned()
    }

    /// Remove the entry for `token` regardless of who holds it.
    pub fn evict(&self, token: &str) {
        self.write().remove(token);
    }

    pub fn contains(&self, token: &str) -> bool {
        self.read().contains_key(token)
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn release(&self, token: &str) {
        let mut entries = self.write();
        if let Some(entry) = entries.get_mut(token) {
            entry.holders = entry.holders.saturating_sub(1);
            if entry.holders == 0 {
                entries.remove(token);
            }
        }
    }
}

/// Keeps a token's claims cached until dropped.
#[must_use = "claims are evicted as soon as the guard is dropped"]
pub struct ClaimGuard {
    cache: ClaimCache,
    token: String,
}

impl ClaimGuard {
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        self.cache.release(&self.token);
    }
}
