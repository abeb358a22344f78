/*!
 * Editing session module.
 *
 * This module provides:
 * - The in-memory session holding the scene list being edited
 * - Per-scene undo history and edit tracking
 * - Attached analysis results and a rewrite action plan with task completion
 * - API cost counters
 * - JSON file persistence of the session between runs
 */

pub mod models;
pub mod plan;
pub mod store;

// Re-export main types
pub use models::{CostStats, ScriptSession};
pub use plan::{
    subtask_key, AnalysisResults, PlanProgress, PlanTask, SceneTask, SummaryPoint, TaskCompletion,
};
pub use store::SessionStore;
