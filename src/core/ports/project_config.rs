//! Per-project configuration port

/// Key/value configuration attached to a target project
pub trait ProjectConfig {
    /// Value of `key` for `project`, if set
    fn get(&self, project: &str, key: &str) -> anyhow::Result<Option<String>>;
}
