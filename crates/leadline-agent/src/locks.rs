// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-lead mutual exclusion.
//!
//! The CRM field has no compare-and-swap, so every read-modify-write of a
//! lead's transcript runs under that lead's lock. This only serializes
//! writers inside one process.

use std::sync::Arc;

use dashmap::DashMap;
use leadline_core::LeadId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily created async mutex per lead. An entry lives only while some
/// caller holds or waits on it.
#[derive(Debug, Default)]
pub struct LeadLocks {
    locks: DashMap<LeadId, Arc<Mutex<()>>>,
}

impl LeadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `lead_id`. Released when the guard drops.
    pub async fn acquire(&self, lead_id: &LeadId) -> LeadGuard<'_> {
        let lock = self
            .locks
            .entry(lead_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        LeadGuard {
            registry: self,
            lead_id: lead_id.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Number of leads currently held or waited on.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one lead's transcript.
pub struct LeadGuard<'a> {
    registry: &'a LeadLocks,
    lead_id: LeadId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LeadGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters clone the Arc under the shard lock before awaiting, so a
        // count of one means nobody else can reach this mutex.
        self.registry
            .locks
            .remove_if(&self.lead_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
