//! Camera-area mapping snapshot.
//!
//! The mapping from (project, area) to contributing camera positions is
//! derived from project configuration, loaded once at startup, and replaced
//! wholesale by an explicit reload. Requests read an immutable `Arc`
//! snapshot; nothing is mutated in place.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;

use occu_models::{AreaMapping, ProjectMapping};

use crate::error::EngineError;
use crate::store::{ProjectStore, StoreError};

/// Immutable view of every project's camera-area mappings.
#[derive(Debug, Default)]
pub struct MappingSnapshot {
    projects: HashMap<String, ProjectMapping>,
}

impl MappingSnapshot {
    pub fn new(projects: HashMap<String, ProjectMapping>) -> Self {
        Self { projects }
    }

    /// Resolve an area, distinguishing an unknown project from an unknown
    /// area within a known project.
    pub fn resolve(&self, project_id: &str, area_id: &str) -> Result<&AreaMapping, EngineError> {
        let project = self
            .projects
            .get(project_id)
            .ok_or_else(|| EngineError::ProjectNotFound(project_id.to_string()))?;

        project
            .get_area(area_id)
            .ok_or_else(|| EngineError::AreaNotFound {
                project_id: project_id.to_string(),
                area_id: area_id.to_string(),
            })
    }

    pub fn stats(&self) -> MappingStats {
        MappingStats {
            projects: self.projects.len(),
            areas: self.projects.values().map(|p| p.areas.len()).sum(),
        }
    }
}

/// Summary of a loaded snapshot, returned by the reload operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MappingStats {
    pub projects: usize,
    pub areas: usize,
}

/// Holder of the current snapshot.
///
/// Readers clone the `Arc` under a brief read lock; a reload builds the new
/// snapshot outside the lock and swaps it in. In-flight requests keep using
/// the snapshot they started with.
pub struct MappingCache {
    inner: RwLock<Arc<MappingSnapshot>>,
}

impl MappingCache {
    pub fn new(snapshot: MappingSnapshot) -> Self {
        Self {
            inner: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Load the initial snapshot from the project store.
    pub async fn load(store: &dyn ProjectStore) -> Result<Self, StoreError> {
        let projects = store.camera_mappings().await?;
        Ok(Self::new(MappingSnapshot::new(projects)))
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<MappingSnapshot> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Rebuild the snapshot from the project store and swap it in.
    pub async fn reload(&self, store: &dyn ProjectStore) -> Result<MappingStats, StoreError> {
        let projects = store.camera_mappings().await?;
        let snapshot = Arc::new(MappingSnapshot::new(projects));
        let stats = snapshot.stats();

        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = snapshot;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use occu_models::{AreaMapping, CameraPosition};

    fn snapshot_with_one_area() -> MappingSnapshot {
        let mut areas = HashMap::new();
        areas.insert(
            "entrance".to_string(),
            AreaMapping {
                area_id: "entrance".to_string(),
                cameras: vec![CameraPosition {
                    camera_id: "cam1".to_string(),
                    position: "standard".to_string(),
                    enable_masking: false,
                }],
            },
        );

        let mut projects = HashMap::new();
        projects.insert(
            "demo".to_string(),
            ProjectMapping {
                project_id: "demo".to_string(),
                areas,
            },
        );
        MappingSnapshot::new(projects)
    }

    #[test]
    fn test_resolve_success() {
        let snapshot = snapshot_with_one_area();
        let area = snapshot.resolve("demo", "entrance").unwrap();
        assert_eq!(area.cameras.len(), 1);
    }

    #[test]
    fn test_resolve_unknown_project() {
        let snapshot = snapshot_with_one_area();
        let err = snapshot.resolve("nope", "entrance").unwrap_err();
        assert!(matches!(err, EngineError::ProjectNotFound(p) if p == "nope"));
    }

    #[test]
    fn test_resolve_unknown_area_in_known_project() {
        let snapshot = snapshot_with_one_area();
        let err = snapshot.resolve("demo", "roof").unwrap_err();
        assert!(matches!(
            err,
            EngineError::AreaNotFound { project_id, area_id }
                if project_id == "demo" && area_id == "roof"
        ));
    }

    #[test]
    fn test_stats() {
        let snapshot = snapshot_with_one_area();
        assert_eq!(
            snapshot.stats(),
            MappingStats {
                projects: 1,
                areas: 1
            }
        );
    }

    #[test]
    fn test_cache_swap() {
        let cache = MappingCache::new(snapshot_with_one_area());
        let before = cache.snapshot();
        assert!(before.resolve("demo", "entrance").is_ok());

        // Swap in an empty snapshot; the old Arc stays valid for holders.
        *cache.inner.write().unwrap() = Arc::new(MappingSnapshot::default());
        assert!(cache.snapshot().resolve("demo", "entrance").is_err());
        assert!(before.resolve("demo", "entrance").is_ok());
    }
}
