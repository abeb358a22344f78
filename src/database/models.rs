/*!
 * Database entity models.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::screenplay::Scene;
use crate::session::{AnalysisResults, PlanTask, TaskCompletion};

/// Saved screenplay project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Unique project identifier (UUID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form notes
    pub description: String,
    /// SHA256 of the imported source file
    pub source_hash: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl ProjectRecord {
    /// Create a new project record with a fresh id
    pub fn new(name: impl Into<String>, source_hash: Option<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            source_hash,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl fmt::Display for ProjectRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}  (updated {})", self.id, self.name, self.updated_at)
    }
}

/// Stored scene row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    /// Database ID
    pub id: i64,
    /// Project this scene belongs to
    pub project_id: String,
    /// Scene identifier as detected in the script
    pub scene_id: String,
    /// Heading line
    pub header: String,
    /// Body text
    pub content: String,
    /// Position in the script
    pub original_index: i64,
}

impl SceneRecord {
    /// Build a row for `scene` (without database ID)
    pub fn from_scene(project_id: &str, scene: &Scene) -> Self {
        Self {
            id: 0, // Will be assigned by database
            project_id: project_id.to_string(),
            scene_id: scene.id.clone(),
            header: scene.header.clone(),
            content: scene.content.clone(),
            original_index: scene.original_index as i64,
        }
    }

    /// Convert back into a scene
    pub fn into_scene(self) -> Scene {
        Scene::new(
            self.scene_id,
            self.header,
            self.content,
            usize::try_from(self.original_index).unwrap_or_default(),
        )
    }
}

/// Stored analysis of a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Database ID
    pub id: i64,
    /// Project the analysis belongs to
    pub project_id: String,
    /// Reports and shared points
    pub results: AnalysisResults,
    /// When the analysis was stored
    pub created_at: String,
}

/// Stored action plan of a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlanRecord {
    /// Database ID
    pub id: i64,
    /// Project the plan belongs to
    pub project_id: String,
    /// Strategy the plan was derived from
    pub user_strategy: String,
    /// Task groups
    pub plan: Vec<PlanTask>,
    /// Subtask completion
    pub task_completion: TaskCompletion,
    pub created_at: String,
    pub updated_at: String,
}

impl ActionPlanRecord {
    /// Share of subtasks done
    pub fn progress(&self) -> crate::session::PlanProgress {
        crate::session::PlanProgress::measure(&self.plan, &self.task_completion)
    }
}
