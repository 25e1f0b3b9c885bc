//! Catalog suppliers - memoized accessors for provider inventories
//!
//! The resolution core never talks to the ARM REST layer directly; it pulls
//! locations, images and hardware profiles through `Supplier` collaborators
//! that the transport layer implements. `Memoized` wraps such a supplier in a
//! shared snapshot cache so concurrent builds see a consistent (possibly
//! stale) view and at most one refresh is in flight at a time.

mod image_cache;

pub use image_cache::{ImageCache, ImageLoader};

use crate::Result;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A lazy value source, the Rust spelling of Guava's `Supplier`.
///
/// Closures returning `Result<T>` implement this, which is how tests and the
/// transport layer usually provide catalogs.
pub trait Supplier<T>: Send + Sync {
    fn get(&self) -> Result<T>;
}

impl<T, F> Supplier<T> for F
where
    F: Fn() -> Result<T> + Send + Sync,
{
    fn get(&self) -> Result<T> {
        self()
    }
}

/// Snapshot cache over a set-valued supplier.
///
/// Readers get an `Arc` snapshot without blocking behind a refresh once one
/// exists; the refresh mutex guarantees at most one concurrent fetch.
pub struct Memoized<T> {
    source: Box<dyn Supplier<Vec<T>>>,
    snapshot: RwLock<Option<Arc<Vec<T>>>>,
    refresh: Mutex<()>,
}

impl<T> Memoized<T> {
    pub fn new(source: impl Supplier<Vec<T>> + 'static) -> Self {
        Self {
            source: Box::new(source),
            snapshot: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Return the cached snapshot, fetching it on first use.
    pub fn get(&self) -> Result<Arc<Vec<T>>> {
        if let Some(snapshot) = self.snapshot.read().clone() {
            return Ok(snapshot);
        }

        let _guard = self.refresh.lock();
        // Another caller may have refreshed while we waited for the guard.
        if let Some(snapshot) = self.snapshot.read().clone() {
            return Ok(snapshot);
        }

        let fresh = Arc::new(self.source.get()?);
        *self.snapshot.write() = Some(fresh.clone());
        tracing::debug!(entries = fresh.len(), "catalog snapshot refreshed");
        Ok(fresh)
    }

    /// Drop the snapshot so the next `get` refetches.
    pub fn invalidate(&self) {
        *self.snapshot.write() = None;
    }
}

impl<T: Send + Sync> Supplier<Arc<Vec<T>>> for Memoized<T> {
    fn get(&self) -> Result<Arc<Vec<T>>> {
        Memoized::get(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_memoized_fetches_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let memo = Memoized::new(move || -> Result<Vec<i32>> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1, 2, 3])
        });

        assert_eq!(*memo.get().unwrap(), vec![1, 2, 3]);
        assert_eq!(*memo.get().unwrap(), vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let memo = Memoized::new(move || -> Result<Vec<usize>> {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![n])
        });

        assert_eq!(*memo.get().unwrap(), vec![0]);
        memo.invalidate();
        assert_eq!(*memo.get().unwrap(), vec![1]);
    }

    #[test]
    fn test_supplier_error_propagates() {
        let memo: Memoized<i32> = Memoized::new(|| -> Result<Vec<i32>> {
            Err(Error::Transport("listing locations failed".into()))
        });
        assert!(matches!(memo.get(), Err(Error::Transport(_))));
        // A failed fetch must not poison the cache.
        assert!(memo.get().is_err());
    }

    #[test]
    fn test_concurrent_readers_share_snapshot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let memo = Arc::new(Memoized::new(move || -> Result<Vec<String>> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["westus".to_string(), "eastus".to_string()])
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = memo.clone();
                std::thread::spawn(move || memo.get().unwrap().len())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 2);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
