//! Per-cycle memoisation of platform lookups
//!
//! Entries are valid for one polling cycle only. The runner owns the
//! [`SessionCache`] and calls [`SessionCache::invalidate`] after every cycle.
//! Errors are never cached.

use std::cell::RefCell;
use std::collections::HashMap;

use log::debug;

use crate::core::models::SourceInfo;
use crate::core::ports::{ProjectConfig, SourceInfoProvider};

type SourceKey = (String, String, Option<String>);
type HistoryKey = (String, String, usize);
type ConfigKey = (String, String);

/// Memoised lookups for one cycle
#[derive(Debug, Default)]
pub struct SessionCache {
    source_info: RefCell<HashMap<SourceKey, Option<SourceInfo>>>,
    history: RefCell<HashMap<HistoryKey, Vec<String>>>,
    project_config: RefCell<HashMap<ConfigKey, Option<String>>>,
}

impl SessionCache {
    /// Empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry
    pub fn invalidate(&self) {
        debug!("invalidating session cache ({} entries)", self.len());
        self.source_info.borrow_mut().clear();
        self.history.borrow_mut().clear();
        self.project_config.borrow_mut().clear();
    }

    /// Number of cached entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.source_info.borrow().len() + self.history.borrow().len() + self.project_config.borrow().len()
    }

    /// Whether the cache holds nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source metadata lookups memoised in a [`SessionCache`]
pub struct CachedSources<'a> {
    inner: &'a dyn SourceInfoProvider,
    cache: &'a SessionCache,
}

impl std::fmt::Debug for CachedSources<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSources").field("cache", &self.cache).finish_non_exhaustive()
    }
}

impl<'a> CachedSources<'a> {
    /// Wrap `inner`
    #[must_use]
    pub fn new(inner: &'a dyn SourceInfoProvider, cache: &'a SessionCache) -> Self {
        Self { inner, cache }
    }
}

impl SourceInfoProvider for CachedSources<'_> {
    fn source_info(
        &self,
        project: &str,
        package: &str,
        revision: Option<&str>,
    ) -> anyhow::Result<Option<SourceInfo>> {
        let key = (project.to_string(), package.to_string(), revision.map(String::from));
        if let Some(hit) = self.cache.source_info.borrow().get(&key) {
            return Ok(hit.clone());
        }

        let info = self.inner.source_info(project, package, revision)?;
        self.cache.source_info.borrow_mut().insert(key, info.clone());
        Ok(info)
    }

    fn package_history(&self, project: &str, package: &str, limit: usize) -> anyhow::Result<Vec<String>> {
        let key = (project.to_string(), package.to_string(), limit);
        if let Some(hit) = self.cache.history.borrow().get(&key) {
            return Ok(hit.clone());
        }

        let history = self.inner.package_history(project, package, limit)?;
        self.cache.history.borrow_mut().insert(key, history.clone());
        Ok(history)
    }
}

/// Project configuration lookups memoised in a [`SessionCache`]
pub struct CachedProjectConfig<'a> {
    inner: &'a dyn ProjectConfig,
    cache: &'a SessionCache,
}

impl std::fmt::Debug for CachedProjectConfig<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedProjectConfig").field("cache", &self.cache).finish_non_exhaustive()
    }
}

impl<'a> CachedProjectConfig<'a> {
    /// Wrap `inner`
    #[must_use]
    pub fn new(inner: &'a dyn ProjectConfig, cache: &'a SessionCache) -> Self {
        Self { inner, cache }
    }
}

impl ProjectConfig for CachedProjectConfig<'_> {
    fn get(&self, project: &str, key: &str) -> anyhow::Result<Option<String>> {
        let cache_key = (project.to_string(), key.to_string());
        if let Some(hit) = self.cache.project_config.borrow().get(&cache_key) {
            return Ok(hit.clone());
        }

        let value = self.inner.get(project, key)?;
        self.cache.project_config.borrow_mut().insert(cache_key, value.clone());
        Ok(value)
    }
}
