use std::collections::BTreeMap;

use foundation::ProjectId;

pub mod layer;
pub mod project;
pub mod source;

pub use layer::*;
pub use project::*;
pub use source::*;

/// Errors surfaced while loading project documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Corrupt(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Corrupt(msg) => write!(f, "project document corrupt: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Holds the projects the application has already materialized.
pub trait ProjectStore {
    fn get(&self, id: &str) -> Option<Project>;
    fn upsert(&mut self, project: Project);
    fn delete(&mut self, id: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    projects: BTreeMap<ProjectId, Project>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and stores a project document, returning its id.
    pub fn upsert_json(&mut self, raw: &str) -> Result<ProjectId, CatalogError> {
        let project = Project::from_json_str(raw)?;
        let id = project.id.clone();
        self.upsert(project);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn get(&self, id: &str) -> Option<Project> {
        self.projects.get(id).cloned()
    }

    fn upsert(&mut self, project: Project) {
        self.projects.insert(project.id.clone(), project);
    }

    fn delete(&mut self, id: &str) -> bool {
        self.projects.remove(id).is_some()
    }
}
