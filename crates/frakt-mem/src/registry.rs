//! Live-allocation registry with RAII accounting guards.
//!
//! Record lifecycle mirrors the two-phase reclamation the manager runs:
//! dropping a guard releases the accounted bytes immediately and marks the
//! record dead; dead records stay visible until the next maintenance sweep
//! removes them. Revocation (pressure handling) releases the accounting of
//! a *live* low-priority record and raises a flag its owner can observe.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use frakt_core::budget::AllocationPriority;

/// Registry entry handle. Per-manager counter, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AllocationId(u64);

impl AllocationId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AllocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alloc({})", self.0)
    }
}

struct Record {
    bytes: u64,
    priority: AllocationPriority,
    created_at: Instant,
    description: String,
    /// False once the owning guard dropped.
    live: bool,
    /// False once the bytes were released (by drop or revocation).
    accounted: bool,
    revoked: Arc<AtomicBool>,
}

/// Read-only view of one registry record.
#[derive(Debug, Clone)]
pub struct AllocationSnapshot {
    pub id: AllocationId,
    pub bytes: u64,
    pub priority: AllocationPriority,
    pub age: std::time::Duration,
    pub description: String,
    pub live: bool,
}

struct RegistryInner {
    records: Mutex<HashMap<AllocationId, Record>>,
    used: AtomicU64,
    peak: AtomicU64,
    next_id: AtomicU64,
    total_allocations: AtomicU64,
    total_deallocations: AtomicU64,
}

impl RegistryInner {
    fn release(&self, id: AllocationId) {
        let mut records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(record) = records.get_mut(&id) {
            if record.accounted {
                self.used.fetch_sub(record.bytes, Ordering::AcqRel);
                record.accounted = false;
            }
            record.live = false;
        }
        self.total_deallocations.fetch_add(1, Ordering::Relaxed);
    }

    fn record_peak(&self, used: u64) {
        let mut cur = self.peak.load(Ordering::Relaxed);
        while used > cur {
            match self
                .peak
                .compare_exchange(cur, used, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(observed) => cur = observed,
            }
        }
    }
}

/// Thread-safe allocation registry shared by all computations that use the
/// same [`ResourceManager`](crate::ResourceManager).
#[derive(Clone)]
pub struct AllocationRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for AllocationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocationRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                records: Mutex::new(HashMap::new()),
                used: AtomicU64::new(0),
                peak: AtomicU64::new(0),
                next_id: AtomicU64::new(0),
                total_allocations: AtomicU64::new(0),
                total_deallocations: AtomicU64::new(0),
            }),
        }
    }

    /// Try to account `bytes` against `capacity` and register the
    /// allocation. Returns the RAII guard on success, `None` when the
    /// accounted total would exceed the capacity.
    pub fn try_register(
        &self,
        bytes: u64,
        capacity: u64,
        priority: AllocationPriority,
        description: impl Into<String>,
    ) -> Option<AllocationGuard> {
        loop {
            let cur = self.inner.used.load(Ordering::Relaxed);
            let next = cur.checked_add(bytes)?;
            if next > capacity {
                return None;
            }
            if self
                .inner
                .used
                .compare_exchange(cur, next, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                self.inner.record_peak(next);
                break;
            }
        }

        let id = AllocationId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let revoked = Arc::new(AtomicBool::new(false));
        let record = Record {
            bytes,
            priority,
            created_at: Instant::now(),
            description: description.into(),
            live: true,
            accounted: true,
            revoked: Arc::clone(&revoked),
        };
        match self.inner.records.lock() {
            Ok(mut records) => {
                records.insert(id, record);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(id, record);
            }
        }
        self.inner.total_allocations.fetch_add(1, Ordering::Relaxed);

        Some(AllocationGuard {
            inner: Arc::clone(&self.inner),
            id,
            bytes,
            revoked,
        })
    }

    /// Remove records whose guard already dropped. Returns how many were
    /// removed.
    pub fn sweep_dead(&self) -> usize {
        let mut records = match self.inner.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = records.len();
        records.retain(|_, record| record.live);
        before - records.len()
    }

    /// Revoke every live `Low`-priority record: release its accounting and
    /// raise its owner-visible flag. Returns how many were revoked.
    pub fn revoke_low_priority(&self) -> usize {
        let mut records = match self.inner.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut revoked = 0;
        for record in records.values_mut() {
            if record.live && record.accounted && record.priority == AllocationPriority::Low {
                self.inner.used.fetch_sub(record.bytes, Ordering::AcqRel);
                record.accounted = false;
                record.revoked.store(true, Ordering::Release);
                revoked += 1;
            }
        }
        revoked
    }

    pub fn used_bytes(&self) -> u64 {
        self.inner.used.load(Ordering::Relaxed)
    }

    pub fn peak_bytes(&self) -> u64 {
        self.inner.peak.load(Ordering::Relaxed)
    }

    pub fn total_allocations(&self) -> u64 {
        self.inner.total_allocations.load(Ordering::Relaxed)
    }

    pub fn total_deallocations(&self) -> u64 {
        self.inner.total_deallocations.load(Ordering::Relaxed)
    }

    /// Count of live records.
    pub fn active_count(&self) -> usize {
        match self.inner.records.lock() {
            Ok(records) => records.values().filter(|r| r.live).count(),
            Err(poisoned) => poisoned.into_inner().values().filter(|r| r.live).count(),
        }
    }

    /// Snapshot of every record still in the registry (live and dead).
    pub fn snapshot(&self) -> Vec<AllocationSnapshot> {
        let records = match self.inner.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut out: Vec<AllocationSnapshot> = records
            .iter()
            .map(|(id, record)| AllocationSnapshot {
                id: *id,
                bytes: record.bytes,
                priority: record.priority,
                age: record.created_at.elapsed(),
                description: record.description.clone(),
                live: record.live,
            })
            .collect();
        out.sort_by_key(|s| s.id);
        out
    }
}

/// RAII accounting guard. Dropping it releases the accounted bytes and
/// marks the registry record dead (panic-safe).
pub struct AllocationGuard {
    inner: Arc<RegistryInner>,
    id: AllocationId,
    bytes: u64,
    revoked: Arc<AtomicBool>,
}

impl AllocationGuard {
    pub fn id(&self) -> AllocationId {
        self.id
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// True once the manager revoked this allocation under pressure. The
    /// owner should drop the buffer at the next safe point.
    pub fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::Acquire)
    }
}

impl fmt::Debug for AllocationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocationGuard")
            .field("id", &self.id)
            .field("bytes", &self.bytes)
            .field("revoked", &self.is_revoked())
            .finish()
    }
}

impl Drop for AllocationGuard {
    fn drop(&mut self) {
        self.inner.release(self.id);
        // NOTE: no logging here to keep the drop path fast.
    }
}
