//! Layered per-project configuration
//!
//! Local `[projects."<name>"]` tables from the config file win over the
//! platform's remote configuration.

use std::collections::BTreeMap;

use log::debug;

use crate::core::ports::ProjectConfig;

/// Local values first, then the remote source
pub struct LayeredProjectConfig<'a> {
    local: &'a BTreeMap<String, BTreeMap<String, String>>,
    remote: &'a dyn ProjectConfig,
}

impl std::fmt::Debug for LayeredProjectConfig<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredProjectConfig")
            .field("local", &self.local)
            .finish_non_exhaustive()
    }
}

impl<'a> LayeredProjectConfig<'a> {
    /// Layer `local` over `remote`
    #[must_use]
    pub const fn new(local: &'a BTreeMap<String, BTreeMap<String, String>>, remote: &'a dyn ProjectConfig) -> Self {
        Self { local, remote }
    }
}

impl ProjectConfig for LayeredProjectConfig<'_> {
    fn get(&self, project: &str, key: &str) -> anyhow::Result<Option<String>> {
        if let Some(value) = self.local.get(project).and_then(|table| table.get(key)) {
            debug!("{project}: {key} = {value} (local)");
            return Ok(Some(value.clone()));
        }
        self.remote.get(project, key)
    }
}
