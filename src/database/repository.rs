/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for project, scene, analysis and
 * action plan persistence, abstracting away the SQL details and providing
 * type-safe access. Analysis and plan payloads are stored as JSON text.
 */

use anyhow::{Context, Result};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use super::connection::DatabaseConnection;
use super::models::{ActionPlanRecord, AnalysisRecord, ProjectRecord, SceneRecord};
use crate::errors::StorageError;
use crate::screenplay::Scene;
use crate::session::{AnalysisResults, PlanTask, TaskCompletion};

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Project Operations
    // =========================================================================

    /// Insert a new project
    pub async fn create_project(&self, project: &ProjectRecord) -> Result<()> {
        let project = project.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO projects (id, name, description, source_hash, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        project.id,
                        project.name,
                        project.description,
                        project.source_hash,
                        project.created_at,
                        project.updated_at,
                    ],
                )?;
                debug!("Created project {} ({})", project.id, project.name);
                Ok(())
            })
            .await
    }

    /// Get a project by ID
    pub async fn get_project(&self, project_id: &str) -> Result<Option<ProjectRecord>> {
        let project_id = project_id.to_string();

        self.db
            .execute_async(move |conn| Self::get_project_sync(conn, &project_id))
            .await
    }

    /// Get a project by ID (synchronous version for use within transactions)
    fn get_project_sync(conn: &Connection, project_id: &str) -> Result<Option<ProjectRecord>> {
        let result = conn
            .query_row(
                r#"
                SELECT id, name, description, source_hash, created_at, updated_at
                FROM projects WHERE id = ?1
                "#,
                [project_id],
                Self::map_project_row,
            )
            .optional()?;

        Ok(result)
    }

    // Fails with ProjectNotFound unless the project exists
    fn require_project(conn: &Connection, project_id: &str) -> Result<()> {
        match Self::get_project_sync(conn, project_id)? {
            Some(_) => Ok(()),
            None => Err(StorageError::ProjectNotFound(project_id.to_string()).into()),
        }
    }

    // Bump updated_at so the project sorts first in list_projects
    fn touch_project(conn: &Connection, project_id: &str) -> Result<()> {
        conn.execute(
            "UPDATE projects SET updated_at = ?1 WHERE id = ?2",
            params![chrono::Utc::now().to_rfc3339(), project_id],
        )?;
        Ok(())
    }

    fn map_project_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRecord> {
        Ok(ProjectRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            source_hash: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    /// List all projects, most recently updated first
    pub async fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, name, description, source_hash, created_at, updated_at
                    FROM projects
                    ORDER BY updated_at DESC, rowid DESC
                    "#,
                )?;

                let projects = stmt
                    .query_map([], Self::map_project_row)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(projects)
            })
            .await
    }

    /// Rename a project and/or change its description
    pub async fn update_project(
        &self,
        project_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<()> {
        let project_id = project_id.to_string();
        let name = name.map(str::to_string);
        let description = description.map(str::to_string);

        self.db
            .execute_async(move |conn| {
                let now = chrono::Utc::now().to_rfc3339();
                let updated = conn.execute(
                    r#"
                    UPDATE projects
                    SET name = COALESCE(?1, name),
                        description = COALESCE(?2, description),
                        updated_at = ?3
                    WHERE id = ?4
                    "#,
                    params![name, description, now, project_id],
                )?;

                if updated == 0 {
                    return Err(StorageError::ProjectNotFound(project_id).into());
                }
                Ok(())
            })
            .await
    }

    /// Delete a project with its scenes, analysis and plan. Returns whether a project was removed.
    pub async fn delete_project(&self, project_id: &str) -> Result<bool> {
        let project_id = project_id.to_string();

        self.db
            .execute_async(move |conn| {
                // Dependent rows go with ON DELETE CASCADE
                let deleted = conn.execute("DELETE FROM projects WHERE id = ?1", [&project_id])?;
                debug!("Deleted project {} ({} rows)", project_id, deleted);
                Ok(deleted > 0)
            })
            .await
    }

    /// Find the most recently updated project imported from a file with this hash
    pub async fn find_project_by_hash(&self, source_hash: &str) -> Result<Option<ProjectRecord>> {
        let source_hash = source_hash.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        r#"
                        SELECT id, name, description, source_hash, created_at, updated_at
                        FROM projects
                        WHERE source_hash = ?1
                        ORDER BY updated_at DESC
                        LIMIT 1
                        "#,
                        [&source_hash],
                        Self::map_project_row,
                    )
                    .optional()?;

                Ok(result)
            })
            .await
    }

    // =========================================================================
    // Scene Operations
    // =========================================================================

    /// Replace all scenes of a project in a single transaction
    pub async fn save_scenes(&self, project_id: &str, scenes: &[Scene]) -> Result<usize> {
        let project_id = project_id.to_string();
        let records: Vec<SceneRecord> = scenes
            .iter()
            .map(|scene| SceneRecord::from_scene(&project_id, scene))
            .collect();

        self.db
            .transaction_async(move |tx| {
                Self::require_project(tx, &project_id)?;
                tx.execute("DELETE FROM scenes WHERE project_id = ?1", [&project_id])?;

                let mut stmt = tx.prepare(
                    r#"
                    INSERT INTO scenes (project_id, scene_id, header, content, original_index)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )?;

                for record in &records {
                    stmt.execute(params![
                        record.project_id,
                        record.scene_id,
                        record.header,
                        record.content,
                        record.original_index,
                    ])?;
                }

                Self::touch_project(tx, &project_id)?;
                debug!("Saved {} scenes for project {}", records.len(), project_id);
                Ok(records.len())
            })
            .await
    }

    /// Get a project's scenes in script order
    pub async fn get_scenes(&self, project_id: &str) -> Result<Vec<Scene>> {
        let project_id = project_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, project_id, scene_id, header, content, original_index
                    FROM scenes
                    WHERE project_id = ?1
                    ORDER BY original_index ASC
                    "#,
                )?;

                let scenes = stmt
                    .query_map([&project_id], |row| {
                        Ok(SceneRecord {
                            id: row.get(0)?,
                            project_id: row.get(1)?,
                            scene_id: row.get(2)?,
                            header: row.get(3)?,
                            content: row.get(4)?,
                            original_index: row.get(5)?,
                        })
                    })?
                    .map(|record| record.map(SceneRecord::into_scene))
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(scenes)
            })
            .await
    }

    // =========================================================================
    // Analysis Operations
    // =========================================================================

    /// Store the analysis of a project, replacing any earlier one
    pub async fn save_analysis(&self, project_id: &str, results: &AnalysisResults) -> Result<()> {
        let project_id = project_id.to_string();
        let creative = results.creative.clone();
        let marketing = results.marketing.clone();
        let summary = serde_json::to_string(&results.summary)
            .context("Failed to serialize analysis summary")?;

        self.db
            .transaction_async(move |tx| {
                Self::require_project(tx, &project_id)?;
                tx.execute("DELETE FROM analysis_results WHERE project_id = ?1", [&project_id])?;
                tx.execute(
                    r#"
                    INSERT INTO analysis_results (project_id, creative_report, marketing_report, summary, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                    params![project_id, creative, marketing, summary, chrono::Utc::now().to_rfc3339()],
                )?;
                Self::touch_project(tx, &project_id)?;
                debug!("Saved analysis for project {}", project_id);
                Ok(())
            })
            .await
    }

    /// Latest stored analysis of a project
    pub async fn get_analysis(&self, project_id: &str) -> Result<Option<AnalysisRecord>> {
        let project_id = project_id.to_string();

        self.db
            .execute_async(move |conn| {
                let row = conn
                    .query_row(
                        r#"
                        SELECT id, project_id, creative_report, marketing_report, summary, created_at
                        FROM analysis_results
                        WHERE project_id = ?1
                        ORDER BY created_at DESC, id DESC
                        LIMIT 1
                        "#,
                        [&project_id],
                        |row| {
                            Ok((
                                row.get::<_, i64>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, String>(2)?,
                                row.get::<_, String>(3)?,
                                row.get::<_, String>(4)?,
                                row.get::<_, String>(5)?,
                            ))
                        },
                    )
                    .optional()?;

                let Some((id, project_id, creative, marketing, summary, created_at)) = row else {
                    return Ok(None);
                };

                let summary = serde_json::from_str(&summary)
                    .with_context(|| format!("Corrupt analysis summary for project {}", project_id))?;

                Ok(Some(AnalysisRecord {
                    id,
                    project_id,
                    results: AnalysisResults { creative, marketing, summary },
                    created_at,
                }))
            })
            .await
    }

    // =========================================================================
    // Action Plan Operations
    // =========================================================================

    /// Store the action plan of a project, replacing any earlier one
    pub async fn save_action_plan(
        &self,
        project_id: &str,
        user_strategy: &str,
        plan: &[PlanTask],
        task_completion: &TaskCompletion,
    ) -> Result<()> {
        let project_id = project_id.to_string();
        let user_strategy = user_strategy.to_string();
        let plan = serde_json::to_string(plan).context("Failed to serialize action plan")?;
        let completion = serde_json::to_string(task_completion)
            .context("Failed to serialize task completion")?;

        self.db
            .transaction_async(move |tx| {
                Self::require_project(tx, &project_id)?;
                tx.execute("DELETE FROM action_plans WHERE project_id = ?1", [&project_id])?;

                let now = chrono::Utc::now().to_rfc3339();
                tx.execute(
                    r#"
                    INSERT INTO action_plans (project_id, user_strategy, plan, task_completion, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                    "#,
                    params![project_id, user_strategy, plan, completion, now],
                )?;
                Self::touch_project(tx, &project_id)?;
                debug!("Saved action plan for project {}", project_id);
                Ok(())
            })
            .await
    }

    /// Latest stored action plan of a project
    pub async fn get_action_plan(&self, project_id: &str) -> Result<Option<ActionPlanRecord>> {
        let project_id = project_id.to_string();

        self.db
            .execute_async(move |conn| {
                let row = conn
                    .query_row(
                        r#"
                        SELECT id, project_id, user_strategy, plan, task_completion, created_at, updated_at
                        FROM action_plans
                        WHERE project_id = ?1
                        ORDER BY updated_at DESC, id DESC
                        LIMIT 1
                        "#,
                        [&project_id],
                        |row| {
                            Ok((
                                row.get::<_, i64>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, String>(2)?,
                                row.get::<_, String>(3)?,
                                row.get::<_, String>(4)?,
                                row.get::<_, String>(5)?,
                                row.get::<_, String>(6)?,
                            ))
                        },
                    )
                    .optional()?;

                let Some((id, project_id, user_strategy, plan, completion, created_at, updated_at)) = row
                else {
                    return Ok(None);
                };

                let plan = serde_json::from_str(&plan)
                    .with_context(|| format!("Corrupt action plan for project {}", project_id))?;
                let task_completion = serde_json::from_str(&completion)
                    .with_context(|| format!("Corrupt task completion for project {}", project_id))?;

                Ok(Some(ActionPlanRecord {
                    id,
                    project_id,
                    user_strategy,
                    plan,
                    task_completion,
                    created_at,
                    updated_at,
                }))
            })
            .await
    }

    /// Overwrite the task completion of a project's plan. Returns `false` when
    /// the project has no stored plan.
    pub async fn update_task_completion(
        &self,
        project_id: &str,
        task_completion: &TaskCompletion,
    ) -> Result<bool> {
        let project_id = project_id.to_string();
        let completion = serde_json::to_string(task_completion)
            .context("Failed to serialize task completion")?;

        self.db
            .execute_async(move |conn| {
                let updated = conn.execute(
                    r#"
                    UPDATE action_plans
                    SET task_completion = ?1, updated_at = ?2
                    WHERE project_id = ?3
                    "#,
                    params![completion, chrono::Utc::now().to_rfc3339(), project_id],
                )?;
                Ok(updated > 0)
            })
            .await
    }
}
