use crate::{hierarchy::db::HierarchyDb, topic::db::TopicDb};

/// Shared handle to the storage layer, cloned into every handler.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub hierarchy: HierarchyDb,
    pub topics: TopicDb,
}

impl Catalog {
    pub fn new(hierarchy: HierarchyDb, topics: TopicDb) -> Self {
        Self { hierarchy, topics }
    }
}
