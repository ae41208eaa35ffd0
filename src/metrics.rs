use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing inventory activity.
#[derive(Default)]
pub struct InventoryMetrics {
    items_registered: AtomicU64,
    items_updated: AtomicU64,
    items_deleted: AtomicU64,
    photos_stored: AtomicU64,
    photo_cleanup_failures: AtomicU64,
}

impl InventoryMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful registration.
    pub fn record_registration(&self) {
        self.items_registered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a field or photo update.
    pub fn record_update(&self) {
        self.items_updated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a deleted item.
    pub fn record_deletion(&self) {
        self.items_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a photo written to disk.
    pub fn record_photo_stored(&self) {
        self.photos_stored.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a photo file that could not be removed.
    pub fn record_cleanup_failure(&self) {
        self.photo_cleanup_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            items_registered: self.items_registered.load(Ordering::Relaxed),
            items_updated: self.items_updated.load(Ordering::Relaxed),
            items_deleted: self.items_deleted.load(Ordering::Relaxed),
            photos_stored: self.photos_stored.load(Ordering::Relaxed),
            photo_cleanup_failures: self.photo_cleanup_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of inventory counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Items registered since startup.
    pub items_registered: u64,
    /// Field and photo updates applied since startup.
    pub items_updated: u64,
    /// Items deleted since startup.
    pub items_deleted: u64,
    /// Photo files written since startup.
    pub photos_stored: u64,
    /// Photo files that could not be removed during update or delete.
    pub photo_cleanup_failures: u64,
}
