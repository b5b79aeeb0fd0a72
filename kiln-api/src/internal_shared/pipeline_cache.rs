use crate::KilnResult;
use fnv::FnvHashMap;
use std::sync::Mutex;

/// Hash-keyed cache of finalized pipelines, one per device context. Keyed by the hash of
/// the full state blob, so finalizing two identical defs produces one native pipeline.
/// Unbounded, pipelines live until `clear()` at device teardown.
pub(crate) struct PipelineCache<T: Clone> {
    cache: Mutex<FnvHashMap<u64, T>>,
}

impl<T: Clone> PipelineCache<T> {
    pub fn new() -> Self {
        PipelineCache {
            cache: Mutex::new(Default::default()),
        }
    }

    pub fn get_or_create<F: FnOnce() -> KilnResult<T>>(
        &self,
        hash: u64,
        create: F,
    ) -> KilnResult<T> {
        let mut guard = self.cache.lock().unwrap();
        if let Some(cached) = guard.get(&hash) {
            log::debug!("pipeline cache hit for hash {:#018x}", hash);
            return Ok(cached.clone());
        }

        log::debug!("pipeline cache miss for hash {:#018x}", hash);
        let created = (create)()?;
        guard.insert(hash, created.clone());
        Ok(created)
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.cache.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identical_hashes_create_once() {
        let cache = PipelineCache::<u32>::new();
        let mut creates = 0;
        for _ in 0..3 {
            let value = cache
                .get_or_create(42, || {
                    creates += 1;
                    Ok(7)
                })
                .unwrap();
            assert_eq!(value, 7);
        }
        assert_eq!(creates, 1);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn failed_create_inserts_nothing() {
        let cache = PipelineCache::<u32>::new();
        let result = cache.get_or_create(1, || Err("boom".into()));
        assert!(result.is_err());
        assert_eq!(cache.len(), 0);
    }
}
