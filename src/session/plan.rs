/*!
 * Script analysis results and rewrite action plans.
 *
 * Both are produced outside scriptcut (by an analysis service or by hand) and
 * attached to a session as JSON. Plan tasks point at scenes by id; completion
 * is tracked per scene id, so a scene listed under two tasks is completed once.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Completion state of plan subtasks, keyed by [`subtask_key`]
pub type TaskCompletion = BTreeMap<String, bool>;

/// Key under which a scene's subtask completion is stored
pub fn subtask_key(scene_id: &str) -> String {
    format!("subtask_{}", scene_id)
}

/// A point shared by both analysis reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPoint {
    /// Issue or strength
    #[serde(alias = "Dạng vấn đề")]
    pub kind: String,

    /// What both reports said about it
    #[serde(alias = "Mô tả chi tiết")]
    pub detail: String,
}

/// Creative and marketing reports on a script, with their common points
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResults {
    /// Creative (story, character, structure) report
    #[serde(default)]
    pub creative: String,

    /// Marketing report
    #[serde(default)]
    pub marketing: String,

    /// Points found in both reports
    #[serde(default)]
    pub summary: Vec<SummaryPoint>,
}

/// Instruction for one scene inside a plan task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneTask {
    /// Scene id exactly as segmented ("23", "35A", "AUTO_5")
    pub scene_id: String,

    /// Short reminder of the scene heading
    #[serde(default)]
    pub header_context: String,

    /// What to change in the scene
    #[serde(default)]
    pub instruction: String,
}

/// A group of scene rewrites serving one goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTask {
    /// Goal of the task group
    pub task_name: String,

    /// Scenes to rewrite
    #[serde(default)]
    pub related_scenes: Vec<SceneTask>,

    /// Unparsed generator output, kept when the plan could not be structured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl PlanTask {
    /// Number of this task's subtasks marked done
    pub fn completed_count(&self, completion: &TaskCompletion) -> usize {
        self.related_scenes
            .iter()
            .filter(|scene| is_done(completion, &scene.scene_id))
            .count()
    }
}

/// Done/total subtask counts of a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanProgress {
    pub completed: usize,
    pub total: usize,
}

impl PlanProgress {
    /// Measure `plan` against `completion`; every listed scene counts once per listing
    pub fn measure(plan: &[PlanTask], completion: &TaskCompletion) -> Self {
        plan.iter().fold(Self::default(), |acc, task| Self {
            completed: acc.completed + task.completed_count(completion),
            total: acc.total + task.related_scenes.len(),
        })
    }

    /// Completion percentage, 0 for an empty plan
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

impl fmt::Display for PlanProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} done ({:.0}%)", self.completed, self.total, self.percent())
    }
}

fn is_done(completion: &TaskCompletion, scene_id: &str) -> bool {
    completion.get(&subtask_key(scene_id)).copied().unwrap_or(false)
}
