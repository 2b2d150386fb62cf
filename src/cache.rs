use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;

use ahash::AHasher;
use lru::LruCache;

use crate::text::{LabelBitmap, LabelStyle, TextRasterizer};

/// Rasterized captions keyed by text and style, so both copies of a tile share one bitmap.
pub struct LabelCache {
    labels: LruCache<u64, Arc<LabelBitmap>>,
}

impl LabelCache {
    pub fn new(size: NonZeroUsize) -> Self {
        Self {
            labels: LruCache::new(size),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn key(text: &str, style: &LabelStyle) -> u64 {
        let mut hasher = AHasher::default();
        text.hash(&mut hasher);
        style.hash_into(&mut hasher);
        hasher.finish()
    }

    pub fn get(&mut self, text: &str, style: &LabelStyle) -> Option<Arc<LabelBitmap>> {
        self.labels.get(&Self::key(text, style)).cloned()
    }

    /// Returns the cached bitmap, rasterizing it on a miss.
    pub fn get_or_rasterize(
        &mut self,
        rasterizer: &mut TextRasterizer,
        text: &str,
        style: &LabelStyle,
    ) -> Arc<LabelBitmap> {
        let key = Self::key(text, style);
        if let Some(bitmap) = self.labels.get(&key) {
            return bitmap.clone();
        }

        let bitmap = Arc::new(rasterizer.rasterize(text, style));
        self.labels.put(key, bitmap.clone());
        bitmap
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_depends_on_text_and_style() {
        let style = LabelStyle::default();
        let other = LabelStyle {
            outline_px: 0,
            ..LabelStyle::default()
        };
        assert_eq!(LabelCache::key("A", &style), LabelCache::key("A", &style));
        assert_ne!(LabelCache::key("A", &style), LabelCache::key("B", &style));
        assert_ne!(LabelCache::key("A", &style), LabelCache::key("A", &other));
    }

    #[test]
    fn empty_text_is_cached_once() {
        let mut cache = LabelCache::new(NonZeroUsize::new(4).unwrap());
        let mut rasterizer = TextRasterizer::new();
        let style = LabelStyle::default();

        let first = cache.get_or_rasterize(&mut rasterizer, "", &style);
        let second = cache.get_or_rasterize(&mut rasterizer, "", &style);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }
}
