/*!
 * Editing session state.
 *
 * The session holds the scene list of the screenplay being edited together
 * with per-scene undo history, the analysis and action plan attached to the
 * script, and the running API cost counters. Scene ids and indices are never
 * changed by editing; only `content` is rewritten.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::app_config::PricingConfig;
use crate::errors::EditError;
use crate::pdf_import::ImportedScript;
use crate::screenplay::{Scene, SceneKey};

use super::plan::{subtask_key, AnalysisResults, PlanProgress, PlanTask, TaskCompletion};

/// Accumulated usage of the text-generation API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostStats {
    /// Prompt tokens sent
    pub total_input: u64,
    /// Tokens generated
    pub total_output: u64,
    /// Estimated spend in USD
    pub total_usd: f64,
    /// Number of requests recorded
    pub request_count: u64,
}

impl CostStats {
    // @updates: Counters with one request's usage
    pub fn record(&mut self, input_tokens: u64, output_tokens: u64, pricing: &PricingConfig) {
        self.total_input += input_tokens;
        self.total_output += output_tokens;
        self.total_usd += pricing.cost_usd(input_tokens, output_tokens);
        self.request_count += 1;
    }
}

/// The screenplay currently open for editing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptSession {
    /// Scenes in parse order
    #[serde(default)]
    pub scenes: Vec<Scene>,

    /// Scenes whose heading should be checked by a human
    #[serde(default)]
    pub needs_review: Vec<SceneKey>,

    /// Project the scenes belong to, if saved to the database
    #[serde(default)]
    pub project_id: Option<String>,

    /// Free-form direction for rewrites
    #[serde(default)]
    pub user_strategy: Option<String>,

    /// Latest script analysis
    #[serde(default)]
    pub analysis_results: Option<AnalysisResults>,

    /// Creative report of the latest analysis, shown as the main report
    #[serde(default)]
    pub analysis_report: Option<String>,

    /// Rewrite plan derived from `user_strategy`
    #[serde(default)]
    pub action_plan: Option<Vec<PlanTask>>,

    /// Subtask completion of `action_plan`
    #[serde(default)]
    pub task_completion: TaskCompletion,

    /// API usage counters
    #[serde(default)]
    pub cost_stats: CostStats,

    /// Content of each edited scene at import time, by original index
    #[serde(default)]
    original_content: BTreeMap<usize, String>,

    /// Earlier contents of each scene, most recent last, by original index
    #[serde(default)]
    undo_stack: BTreeMap<usize, Vec<String>>,
}

impl ScriptSession {
    /// Start a session from a scene list
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self {
            scenes,
            ..Self::default()
        }
    }


    /// Find the scene designated by `key`
    pub fn find(&self, key: &SceneKey) -> Option<&Scene> {
        self.scenes.iter().find(|scene| key.matches(scene))
    }

    /// First scene carrying `id`
    pub fn find_by_id(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.id == id)
    }

    /// Resolve a scene id, optionally disambiguated by index, to a key
    pub fn resolve_key(&self, id: &str, original_index: Option<usize>) -> Result<SceneKey, EditError> {
        let scene = match original_index {
            Some(index) => self.find(&SceneKey::new(id, index)),
            None => self.find_by_id(id),
        };

        scene
            .map(Scene::key)
            .ok_or_else(|| EditError::SceneNotFound(id.to_string()))
    }

    /// Replace a scene's content. Returns `false` when the content is unchanged.
    pub fn update_content(&mut self, key: &SceneKey, new_content: &str) -> Result<bool, EditError> {
        let scene = self
            .scenes
            .iter_mut()
            .find(|scene| key.matches(scene))
            .ok_or_else(|| EditError::SceneNotFound(key.to_string()))?;

        if scene.content == new_content {
            return Ok(false);
        }

        let previous = std::mem::replace(&mut scene.content, new_content.to_string());
        self.original_content
            .entry(key.original_index)
            .or_insert_with(|| previous.clone());
        self.undo_stack.entry(key.original_index).or_default().push(previous);

        debug!("Updated content of scene {}", key);
        Ok(true)
    }

    /// Restore the content a scene had before its last edit
    pub fn undo(&mut self, key: &SceneKey) -> Result<(), EditError> {
        let scene = self
            .scenes
            .iter_mut()
            .find(|scene| key.matches(scene))
            .ok_or_else(|| EditError::SceneNotFound(key.to_string()))?;

        let previous = self
            .undo_stack
            .get_mut(&key.original_index)
            .and_then(Vec::pop)
            .ok_or_else(|| EditError::NothingToUndo(key.to_string()))?;

        scene.content = previous;
        debug!("Reverted last edit of scene {}", key);
        Ok(())
    }

    /// Number of edits that can be undone for a scene
    pub fn undo_depth(&self, key: &SceneKey) -> usize {
        self.undo_stack.get(&key.original_index).map_or(0, Vec::len)
    }

    /// Whether a scene's content differs from what was imported
    pub fn is_edited(&self, key: &SceneKey) -> bool {
        match (self.find(key), self.original_content.get(&key.original_index)) {
            (Some(scene), Some(original)) => scene.content != *original,
            _ => false,
        }
    }

    /// Whether a scene was flagged for heading review
    pub fn is_flagged(&self, key: &SceneKey) -> bool {
        self.needs_review.contains(key)
    }

    /// Full script text handed to analysis: each scene as header, blank line, content
    pub fn compile_script(&self) -> String {
        self.scenes
            .iter()
            .map(|scene| format!("{}\n\n{}\n\n", scene.header, scene.content))
            .collect()
    }

    /// Record one API request's token usage
    pub fn record_usage(&mut self, input_tokens: u64, output_tokens: u64, pricing: &PricingConfig) {
        self.cost_stats.record(input_tokens, output_tokens, pricing);
    }

    /// Attach an analysis; its creative report becomes the main report
    pub fn set_analysis(&mut self, results: AnalysisResults) {
        self.analysis_report = Some(results.creative.clone());
        self.analysis_results = Some(results);
    }

    /// Attach a new action plan and the strategy it serves; resets completion
    pub fn set_action_plan(&mut self, user_strategy: impl Into<String>, plan: Vec<PlanTask>) {
        debug!("Attached action plan with {} tasks", plan.len());
        self.user_strategy = Some(user_strategy.into());
        self.action_plan = Some(plan);
        self.task_completion.clear();
    }

    /// Mark the plan subtask of a scene done or not done
    pub fn set_task_completed(&mut self, scene_id: &str, done: bool) -> Result<(), EditError> {
        let plan = self.action_plan.as_ref().ok_or(EditError::NoActionPlan)?;

        let listed = plan
            .iter()
            .flat_map(|task| &task.related_scenes)
            .any(|scene| scene.scene_id == scene_id);
        if !listed {
            return Err(EditError::TaskNotFound(scene_id.to_string()));
        }

        self.task_completion.insert(subtask_key(scene_id), done);
        Ok(())
    }

    /// Progress of the action plan, if one is attached
    pub fn plan_progress(&self) -> Option<PlanProgress> {
        self.action_plan
            .as_deref()
            .map(|plan| PlanProgress::measure(plan, &self.task_completion))
    }

    /// Switch to another script: replaces the scene list and drops everything
    /// tied to the previous one. API cost counters are kept.
    pub fn replace_scenes(&mut self, scenes: Vec<Scene>) {
        self.scenes = scenes;
        self.needs_review.clear();
        self.project_id = None;
        self.user_strategy = None;
        self.analysis_results = None;
        self.analysis_report = None;
        self.action_plan = None;
        self.task_completion.clear();
        self.original_content.clear();
        self.undo_stack.clear();
    }

    /// Switch to a freshly imported screenplay and its review flags
    pub fn replace_with_import(&mut self, imported: ImportedScript) {
        let segmentation = imported.segmentation;
        self.replace_scenes(segmentation.scenes);
        self.needs_review = segmentation.needs_review;
    }
}
