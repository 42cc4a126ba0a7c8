// ── Source registry ──
//
// Ordered, immutable list of candidate upstream sources. Position is
// priority: the orchestrator always walks front to back.

use odinsight_api::{Query, SourceDescriptor};

use crate::error::CoreError;

#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<SourceDescriptor>) -> Self {
        Self { sources }
    }

    /// An empty registry: every query falls back to synthetic data.
    pub fn empty() -> Self {
        Self::default()
    }

    /// ICP dashboard first, mempool.space second.
    pub fn builtin() -> Result<Self, CoreError> {
        Ok(Self::new(vec![
            SourceDescriptor::icp_dashboard()?,
            SourceDescriptor::mempool_space()?,
        ]))
    }

    /// Register a source at the lowest priority.
    pub fn push(&mut self, source: SourceDescriptor) {
        self.sources.push(source);
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.iter()
    }

    /// Sources declaring an endpoint for `query`, in priority order.
    pub fn serving(&self, query: Query) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.iter().filter(move |s| s.supports(query))
    }

    pub fn get(&self, name: &str) -> Option<&SourceDescriptor> {
        self.sources.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl FromIterator<SourceDescriptor> for SourceRegistry {
    fn from_iter<I: IntoIterator<Item = SourceDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn builtin_order_is_priority() {
        let registry = SourceRegistry::builtin().unwrap();
        let names: Vec<_> = registry.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["ICP Dashboard", "Mempool.space"]);
    }

    #[test]
    fn builtin_sources_do_not_serve_addresses() {
        let registry = SourceRegistry::builtin().unwrap();
        assert_eq!(registry.serving(Query::Summary).count(), 2);
        assert_eq!(registry.serving(Query::Addresses).count(), 0);
    }

    #[test]
    fn push_appends_lowest_priority() {
        let mut registry = SourceRegistry::builtin().unwrap();
        let mut extra = SourceDescriptor::icp_dashboard().unwrap();
        extra.name = "Mirror".into();
        registry.push(extra);
        assert_eq!(registry.iter().last().unwrap().name, "Mirror");
        assert!(registry.get("Mirror").is_some());
    }
}
