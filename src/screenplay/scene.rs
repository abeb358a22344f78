/*!
 * Scene records produced by the segmenter.
 *
 * A `Scene` is a plain record: consumers may rewrite its `content`, but the
 * `id` and `original_index` assigned at parse time never change.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix used for identifiers synthesized when a heading carries no number
pub const AUTO_ID_PREFIX: &str = "AUTO_";

/// A single screenplay scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene number as printed in the source ("23", "35A") or `AUTO_<n>`
    pub id: String,

    /// Heading text with the scene number removed
    pub header: String,

    /// Body text, newline-joined and trimmed
    pub content: String,

    /// Zero-based position in parse order
    pub original_index: usize,
}

impl Scene {
    /// Create a new scene record
    pub fn new(id: impl Into<String>, header: impl Into<String>, content: impl Into<String>, original_index: usize) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            content: content.into(),
            original_index,
        }
    }

    /// Key that identifies this scene unambiguously within its document
    pub fn key(&self) -> SceneKey {
        SceneKey::new(self.id.clone(), self.original_index)
    }

    /// Whether the identifier was synthesized rather than read from the source
    pub fn has_auto_id(&self) -> bool {
        self.id.starts_with(AUTO_ID_PREFIX)
    }

    /// Number of non-empty content lines
    pub fn line_count(&self) -> usize {
        self.content.lines().filter(|line| !line.trim().is_empty()).count()
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.header)
    }
}

/// `(id, original_index)` pair.
///
/// Scene ids may repeat in a malformed source, so lookups that must hit exactly
/// one scene go through this key rather than the id alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SceneKey {
    pub id: String,
    pub original_index: usize,
}

impl SceneKey {
    pub fn new(id: impl Into<String>, original_index: usize) -> Self {
        Self {
            id: id.into(),
            original_index,
        }
    }

    /// Whether this key designates the given scene
    pub fn matches(&self, scene: &Scene) -> bool {
        scene.original_index == self.original_index && scene.id == self.id
    }
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}#{}", self.id, self.original_index)
    }
}
