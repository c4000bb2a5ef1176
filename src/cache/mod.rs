//! On-disk cache of oracle replies, keyed by an md5 digest of the request.

use std::{fs, path::PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use crate::{
    config::Config,
    llm::{GenerationOptions, LanguageModel},
};

#[derive(Debug, Clone)]
pub struct RequestCache {
    length: usize,
    cache_path: PathBuf,
}

impl RequestCache {
    pub fn from_config(cfg: &Config) -> Self {
        let len = cfg.get_usize("CACHE_LENGTH").unwrap_or(100);
        Self::new(cfg.cache_path(), len)
    }

    pub fn new(cache_path: PathBuf, length: usize) -> Self {
        let _ = fs::create_dir_all(&cache_path);
        Self { length, cache_path }
    }

    pub fn key_for(&self, model: &str, system: &str, prompt: &str, opts: &GenerationOptions) -> String {
        let payload = serde_json::json!({
            "model": model,
            "system": system,
            "prompt": prompt,
            "options": opts,
        });
        let data = serde_json::to_vec(&payload).unwrap_or_default();
        let digest = md5::compute(data);
        format!("{:x}", digest)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let p = self.cache_path.join(key);
        fs::read_to_string(p).ok()
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let p = self.cache_path.join(key);
        fs::write(p, value)?;
        self.prune()?;
        Ok(())
    }

    fn prune(&self) -> Result<()> {
        let mut entries: Vec<_> = fs::read_dir(&self.cache_path)?.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());
        if entries.len() > self.length {
            let to_delete = entries.len() - self.length;
            for entry in entries.iter().take(to_delete) {
                let _ = fs::remove_file(entry.path());
            }
        }
        Ok(())
    }
}

/// Wraps a model so identical requests are answered from disk.
pub struct CachedModel<M> {
    inner: M,
    cache: RequestCache,
}

impl<M: LanguageModel> CachedModel<M> {
    pub fn new(inner: M, cache: RequestCache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<M: LanguageModel> LanguageModel for CachedModel<M> {
    async fn generate(&self, system: &str, prompt: &str, opts: &GenerationOptions) -> Result<String> {
        let key = self.cache.key_for(self.inner.model_name(), system, prompt, opts);
        if let Some(hit) = self.cache.get(&key) {
            log::debug!("oracle cache hit {}", key);
            return Ok(hit);
        }
        let text = self.inner.generate(system, prompt, opts).await?;
        if !text.is_empty() {
            if let Err(e) = self.cache.set(&key, &text) {
                log::warn!("could not store oracle reply: {}", e);
            }
        }
        Ok(text)
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LanguageModel for Counting {
        async fn generate(&self, _system: &str, prompt: &str, _opts: &GenerationOptions) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("echo: {prompt}"))
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn second_identical_call_hits_cache() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let model = CachedModel::new(
            Counting { calls: AtomicUsize::new(0) },
            RequestCache::new(dir.path().to_path_buf(), 10),
        );
        let opts = GenerationOptions::default();
        let a = model.generate("sys", "hello", &opts).await?;
        let b = model.generate("sys", "hello", &opts).await?;
        assert_eq!(a, b);
        assert_eq!(model.inner.calls.load(Ordering::SeqCst), 1);

        let hotter = GenerationOptions { temperature: 1.0, ..opts };
        model.generate("sys", "hello", &hotter).await?;
        assert_eq!(model.inner.calls.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[test]
    fn prune_keeps_at_most_length() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let cache = RequestCache::new(dir.path().to_path_buf(), 2);
        for i in 0..5 {
            cache.set(&format!("k{i}"), "v")?;
        }
        assert_eq!(fs::read_dir(dir.path())?.count(), 2);
        Ok(())
    }
}
