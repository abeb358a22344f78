use anyhow::{Result, Context};
use log::{error, warn, info, debug};
use std::path::Path;
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::database::{DatabaseConnection, ProjectRecord, Repository};
use crate::errors::StorageError;
use crate::file_utils::FileManager;
use crate::pdf_import::import_screenplay_async;
use crate::screenplay::{export_scenes, export_scenes_json, Segmenter};
use crate::session::{subtask_key, AnalysisResults, PlanTask, ScriptSession, SessionStore};

// @module: Application controller for screenplay import and editing

/// Name given to projects saved without an explicit name
const DEFAULT_PROJECT_NAME: &str = "Untitled screenplay";

/// Outcome of a folder import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    /// Files segmented and written
    pub processed: usize,
    /// Files skipped because their output already existed
    pub skipped: usize,
    /// Files that failed to import
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Scene segmenter built from the configuration
    segmenter: Segmenter,

    // @field: Current session file
    store: SessionStore,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let segmenter = Segmenter::new(config.segmentation.clone());
        let store = SessionStore::new(&config.storage.session_file);

        Ok(Self {
            config,
            segmenter,
            store,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Store of the current session
    pub fn session_store(&self) -> &SessionStore {
        &self.store
    }

    /// Open the project database configured in `storage.database_path`
    pub fn open_repository(&self) -> Result<Repository> {
        Ok(Repository::new(DatabaseConnection::from_storage(&self.config.storage)?))
    }

    // Session being replaced; its cost counters carry over to the next script
    fn previous_session(&self) -> ScriptSession {
        match self.store.load() {
            Ok(session) => session.unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring unreadable session file: {}", e);
                ScriptSession::default()
            }
        }
    }

    /// Import a screenplay into the current session, optionally saving it as a project
    pub async fn import_file(&self, input_file: &Path, project_name: Option<&str>) -> Result<ScriptSession> {
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(anyhow::anyhow!("Input file does not exist: {:?}", input_file));
        }

        let imported = import_screenplay_async(input_file.to_path_buf(), self.segmenter.clone()).await?;
        let source_hash = imported.source_hash.clone();
        let mut session = self.previous_session();
        session.replace_with_import(imported);

        for key in &session.needs_review {
            if let Some(scene) = session.find(key) {
                warn!("Check heading of scene {}: {:?}", key, scene.header);
            }
        }

        if let Some(name) = project_name {
            let repo = self.open_repository()?;
            if let Some(existing) = repo.find_project_by_hash(&source_hash).await? {
                info!("This file was already imported as project '{}' ({})", existing.name, existing.id);
            }

            let project = ProjectRecord::new(name, Some(source_hash));
            repo.create_project(&project).await?;
            repo.save_scenes(&project.id, &session.scenes).await?;
            info!("Saved project '{}' ({})", project.name, project.id);
            session.project_id = Some(project.id);
        }

        self.store.save(&session)?;

        info!(
            "Imported {} scenes in {}.",
            session.scenes.len(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(session)
    }

    /// Segment every PDF under `input_dir` into a `<stem>.scenes.json` beside it
    pub async fn run_folder(&self, input_dir: &Path, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let pdf_files = FileManager::find_files(input_dir, "pdf")?;
        if pdf_files.is_empty() {
            return Err(anyhow::anyhow!("No PDF files found in directory: {:?}", input_dir));
        }

        let folder_pb = ProgressBar::new(pdf_files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();

        for pdf_file in &pdf_files {
            let file_name = pdf_file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = pdf_file.parent().unwrap_or(input_dir);
            let output_path = FileManager::generate_output_path(pdf_file, output_dir, "scenes", "json");

            if output_path.exists() && !force_overwrite {
                warn!("Skipping {}, output already exists (use -f to force overwrite)", file_name);
                summary.skipped += 1;
                folder_pb.inc(1);
                continue;
            }

            let result = match import_screenplay_async(pdf_file.clone(), self.segmenter.clone()).await {
                Ok(imported) => export_scenes_json(&imported.segmentation.scenes, &output_path),
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    debug!("Wrote {:?}", output_path);
                    summary.processed += 1;
                }
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors ({})",
            summary.processed,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    /// Load the current session
    pub fn load_session(&self) -> Result<ScriptSession> {
        self.store.load_required()
    }

    /// One line per scene, marking edited (`*`) and review-flagged (`?`) scenes
    pub fn describe_scenes(session: &ScriptSession) -> Vec<String> {
        session
            .scenes
            .iter()
            .map(|scene| {
                let key = scene.key();
                let edited = if session.is_edited(&key) { '*' } else { ' ' };
                let flagged = if session.is_flagged(&key) { '?' } else { ' ' };
                format!(
                    "{}{} [{}] {:<8} {} ({} lines)",
                    edited,
                    flagged,
                    scene.original_index,
                    scene.id,
                    scene.header,
                    scene.line_count()
                )
            })
            .collect()
    }

    /// Replace the content of a scene in the current session
    pub fn edit_scene(&self, scene_id: &str, index: Option<usize>, new_content: &str) -> Result<bool> {
        let mut session = self.load_session()?;
        let key = session.resolve_key(scene_id, index)?;

        let changed = session.update_content(&key, new_content)?;
        if changed {
            self.store.save(&session)?;
            info!("Updated scene {}", key);
        } else {
            info!("Scene {} unchanged", key);
        }

        Ok(changed)
    }

    /// Revert the last edit of a scene in the current session
    pub fn undo_scene(&self, scene_id: &str, index: Option<usize>) -> Result<()> {
        let mut session = self.load_session()?;
        let key = session.resolve_key(scene_id, index)?;

        session.undo(&key)?;
        self.store.save(&session)?;
        info!("Reverted scene {}", key);

        Ok(())
    }

    /// Export the current session: `.json` scene list, `.docx` document, anything else text
    pub fn export(&self, output: &Path) -> Result<()> {
        let session = self.load_session()?;
        let format = export_scenes(&session.scenes, output)?;

        info!("Exported {} scenes to {} ({:?})", session.scenes.len(), output.display(), format);
        Ok(())
    }

    /// Attach analysis results read from a JSON file to the current session
    pub fn attach_analysis(&self, path: &Path) -> Result<AnalysisResults> {
        let json = FileManager::read_to_string(path)?;
        let results: AnalysisResults = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse analysis results: {:?}", path))?;

        let mut session = self.load_session()?;
        session.set_analysis(results.clone());
        self.store.save(&session)?;

        info!("Attached analysis with {} shared points", results.summary.len());
        Ok(results)
    }

    /// Attach an action plan read from a JSON file, replacing the previous plan
    pub fn attach_plan(&self, path: &Path, user_strategy: &str) -> Result<Vec<PlanTask>> {
        let json = FileManager::read_to_string(path)?;
        let plan: Vec<PlanTask> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse action plan: {:?}", path))?;

        let mut session = self.load_session()?;
        for scene_task in plan.iter().flat_map(|task| &task.related_scenes) {
            if session.find_by_id(&scene_task.scene_id).is_none() {
                warn!("Plan refers to unknown scene {}", scene_task.scene_id);
            }
        }

        session.set_action_plan(user_strategy, plan.clone());
        self.store.save(&session)?;

        info!("Attached action plan with {} tasks", plan.len());
        Ok(plan)
    }

    /// Mark a scene's plan subtask done or not done; also updates the saved project, if any
    pub async fn mark_task(&self, scene_id: &str, done: bool) -> Result<()> {
        let mut session = self.load_session()?;
        session.set_task_completed(scene_id, done)?;
        self.store.save(&session)?;

        if let Some(project_id) = &session.project_id {
            let repo = self.open_repository()?;
            if !repo.update_task_completion(project_id, &session.task_completion).await? {
                debug!("Project {} has no saved plan yet; completion kept in session", project_id);
            }
        }

        if let Some(progress) = session.plan_progress() {
            info!("Plan progress: {}", progress);
        }
        Ok(())
    }

    /// Plan tasks with per-scene checkboxes, or `None` without a plan
    pub fn describe_plan(session: &ScriptSession) -> Option<Vec<String>> {
        let plan = session.action_plan.as_ref()?;
        let mut lines = Vec::new();

        for task in plan {
            lines.push(format!(
                "{} ({}/{})",
                task.task_name,
                task.completed_count(&session.task_completion),
                task.related_scenes.len()
            ));
            for scene_task in &task.related_scenes {
                let done = session
                    .task_completion
                    .get(&subtask_key(&scene_task.scene_id))
                    .copied()
                    .unwrap_or(false);
                lines.push(format!(
                    "  [{}] {:<8} {}",
                    if done { 'x' } else { ' ' },
                    scene_task.scene_id,
                    scene_task.instruction
                ));
            }
        }

        Some(lines)
    }

    /// Saved projects, most recently updated first
    pub async fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
        self.open_repository()?.list_projects().await
    }

    /// Load a saved project into the current session
    pub async fn open_project(&self, project_id: &str) -> Result<ScriptSession> {
        let repo = self.open_repository()?;

        let project = repo
            .get_project(project_id)
            .await?
            .ok_or_else(|| StorageError::ProjectNotFound(project_id.to_string()))?;
        let scenes = repo.get_scenes(&project.id).await?;

        let mut session = self.previous_session();
        session.replace_scenes(scenes);
        session.project_id = Some(project.id.clone());

        if let Some(analysis) = repo.get_analysis(&project.id).await? {
            session.set_analysis(analysis.results);
        }
        if let Some(plan) = repo.get_action_plan(&project.id).await? {
            info!("Project plan: {}", plan.progress());
            session.set_action_plan(plan.user_strategy, plan.plan);
            session.task_completion = plan.task_completion;
        }

        self.store.save(&session)?;

        info!("Opened project '{}' with {} scenes", project.name, session.scenes.len());
        Ok(session)
    }

    /// Persist the current session's scenes to its project, creating one if needed
    pub async fn save_project(&self, name: Option<&str>) -> Result<ProjectRecord> {
        let mut session = self.load_session()?;
        let repo = self.open_repository()?;

        let existing = match &session.project_id {
            Some(id) => repo.get_project(id).await?,
            None => None,
        };

        let project = match existing {
            Some(project) => {
                if let Some(name) = name {
                    repo.update_project(&project.id, Some(name), None).await?;
                }
                project
            }
            None => {
                if session.project_id.is_some() {
                    warn!("Session project no longer exists, saving as a new project");
                }
                let project = ProjectRecord::new(name.unwrap_or(DEFAULT_PROJECT_NAME), None);
                repo.create_project(&project).await?;
                session.project_id = Some(project.id.clone());
                self.store.save(&session)?;
                project
            }
        };

        repo.save_scenes(&project.id, &session.scenes).await?;
        if let Some(analysis) = &session.analysis_results {
            repo.save_analysis(&project.id, analysis).await?;
        }
        if let Some(plan) = &session.action_plan {
            let strategy = session.user_strategy.as_deref().unwrap_or_default();
            repo.save_action_plan(&project.id, strategy, plan, &session.task_completion).await?;
        }
        info!("Saved {} scenes to project '{}'", session.scenes.len(), project.id);

        let saved = repo
            .get_project(&project.id)
            .await?
            .ok_or_else(|| StorageError::ProjectNotFound(project.id.clone()))?;
        Ok(saved)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
