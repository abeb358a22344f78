/*!
 * Database module for persistent storage of screenplay projects.
 *
 * This module provides SQLite-based persistence for:
 * - Named projects tied to an imported source file
 * - The scene list of each project, in script order
 * - The latest analysis and action plan (with task completion) of each project
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::{ActionPlanRecord, AnalysisRecord, ProjectRecord, SceneRecord};
pub use repository::Repository;
