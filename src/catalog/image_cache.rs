//! Keyed image cache with refresh-on-miss
//!
//! Backs the fallback lookup in image resolution: when an explicit image id
//! is not in the memoized image set, the cache asks the provider for that
//! single image, at most once per key at a time.

use crate::models::Image;
use crate::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Fetches a single image from the provider by id.
#[cfg_attr(test, mockall::automock)]
pub trait ImageLoader: Send + Sync {
    /// Look the image up at the source. `Ok(None)` means the provider does
    /// not know the id; transport failures propagate as errors.
    fn load(&self, id: &str) -> Result<Option<Image>>;
}

/// `id -> Image` cache, keyed case-insensitively, refreshing on miss.
pub struct ImageCache {
    loader: Box<dyn ImageLoader>,
    entries: Mutex<HashMap<String, Image>>,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ImageCache {
    pub fn new(loader: impl ImageLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            entries: Mutex::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Get the image for `id`, loading it from the provider on a miss.
    /// At most one load per key runs at a time; losers of the race see the
    /// winner's entry.
    pub fn get(&self, id: &str) -> Result<Option<Image>> {
        let key = id.to_lowercase();

        if let Some(image) = self.entries.lock().get(&key).cloned() {
            return Ok(Some(image));
        }

        let guard = self.key_guard(&key);
        let _held = guard.lock();

        // The winner of the race may have populated the entry already.
        if let Some(image) = self.entries.lock().get(&key).cloned() {
            return Ok(Some(image));
        }

        tracing::debug!(image_id = %id, "image cache miss, refreshing");
        match self.loader.load(id)? {
            Some(image) => {
                self.entries.lock().insert(key, image.clone());
                Ok(Some(image))
            }
            None => Ok(None),
        }
    }

    /// Seed an entry without going through the loader.
    pub fn put(&self, image: Image) {
        self.entries.lock().insert(image.id.to_lowercase(), image);
    }

    /// Forget an entry.
    pub fn evict(&self, id: &str) {
        self.entries.lock().remove(&id.to_lowercase());
    }

    fn key_guard(&self, key: &str) -> Arc<Mutex<()>> {
        self.inflight
            .lock()
            .entry(key.to_string())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageProperties;
    use mockall::predicate::eq;

    fn image(id: &str) -> Image {
        Image::new(id, id, ImageProperties::default())
    }

    #[test]
    fn test_miss_loads_then_caches() {
        let mut loader = MockImageLoader::new();
        loader
            .expect_load()
            .with(eq("custom-img"))
            .times(1)
            .returning(|id| Ok(Some(image(id))));

        let cache = ImageCache::new(loader);
        assert!(cache.get("custom-img").unwrap().is_some());
        // Second hit must not reach the loader (times(1) above enforces it).
        assert!(cache.get("custom-img").unwrap().is_some());
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut loader = MockImageLoader::new();
        loader
            .expect_load()
            .times(1)
            .returning(|id| Ok(Some(image(id))));

        let cache = ImageCache::new(loader);
        assert!(cache.get("Custom-Img").unwrap().is_some());
        assert!(cache.get("CUSTOM-IMG").unwrap().is_some());
    }

    #[test]
    fn test_unknown_id_stays_a_miss() {
        let mut loader = MockImageLoader::new();
        loader.expect_load().times(2).returning(|_| Ok(None));

        let cache = ImageCache::new(loader);
        assert!(cache.get("nope").unwrap().is_none());
        // Misses are not negatively cached; the provider is asked again.
        assert!(cache.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_put_short_circuits_loader() {
        let mut loader = MockImageLoader::new();
        loader.expect_load().times(0);

        let cache = ImageCache::new(loader);
        cache.put(image("seeded"));
        assert!(cache.get("SEEDED").unwrap().is_some());
    }

    #[test]
    fn test_evict_forces_reload() {
        let mut loader = MockImageLoader::new();
        loader
            .expect_load()
            .times(1)
            .returning(|id| Ok(Some(image(id))));

        let cache = ImageCache::new(loader);
        cache.put(image("img"));
        cache.evict("img");
        assert!(cache.get("img").unwrap().is_some());
    }
}
