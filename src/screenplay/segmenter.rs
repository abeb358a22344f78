/*!
 * Scene segmentation.
 *
 * Cleaned lines are folded into an accumulator that closes the running scene
 * whenever a heading is detected. Text before the first heading is dropped.
 * A document without any heading comes back as a single fallback scene, so
 * the result is never empty.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::cleaner::clean_text;
use super::header::{detect_header, HeaderLayer, HeaderMatch};
use super::scene::{Scene, SceneKey, AUTO_ID_PREFIX};

/// Header given to the single scene returned when no heading is found
pub const DEFAULT_FALLBACK_HEADER: &str = "UNKNOWN SCENE";

/// Segmenter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Header of the fallback scene
    #[serde(default = "default_fallback_header")]
    pub fallback_header: String,

    /// Report scenes opened by the uppercase catch-all detector for review
    #[serde(default = "default_true")]
    pub flag_catch_all_headers: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            fallback_header: default_fallback_header(),
            flag_catch_all_headers: true,
        }
    }
}

fn default_fallback_header() -> String {
    DEFAULT_FALLBACK_HEADER.to_string()
}

fn default_true() -> bool {
    true
}

/// Result of segmenting one document
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Scenes in source order, never empty
    pub scenes: Vec<Scene>,

    /// Scenes whose heading came from the catch-all detector
    pub needs_review: Vec<SceneKey>,

    /// True when no heading was found and `scenes` holds the fallback scene
    pub used_fallback: bool,
}

/// Heading of the scene currently being accumulated
#[derive(Debug)]
struct OpenScene {
    id: String,
    header: String,
    layer: HeaderLayer,
    lines: Vec<String>,
}

/// Scan state threaded through the fold over cleaned lines
#[derive(Debug, Default)]
struct ScanState {
    open: Option<OpenScene>,
    auto_counter: usize,
    scenes: Vec<Scene>,
    review: Vec<SceneKey>,
}

impl ScanState {
    // @consumes: One cleaned line
    fn push_line(mut self, line: &str, flag_catch_all: bool) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return self;
        }

        match detect_header(line) {
            Some(heading) => {
                self.close_scene(flag_catch_all);
                self.open_scene(heading);
            }
            None => match self.open.as_mut() {
                Some(open) => open.lines.push(line.to_string()),
                None => debug!("Dropping preamble line before first scene heading: {}", line),
            },
        }

        self
    }

    fn open_scene(&mut self, heading: HeaderMatch) {
        // Counts every scene start, so AUTO ids may skip numbers but never repeat
        self.auto_counter += 1;

        let id = heading
            .scene_id
            .unwrap_or_else(|| format!("{}{}", AUTO_ID_PREFIX, self.auto_counter));

        debug!("Scene {} detected by {} layer: {}", id, heading.layer, heading.header);

        self.open = Some(OpenScene {
            id,
            header: heading.header,
            layer: heading.layer,
            lines: Vec::new(),
        });
    }

    fn close_scene(&mut self, flag_catch_all: bool) {
        let Some(open) = self.open.take() else {
            return;
        };

        let scene = Scene::new(
            open.id,
            open.header,
            open.lines.join("\n").trim(),
            self.scenes.len(),
        );

        if flag_catch_all && open.layer == HeaderLayer::CatchAll {
            warn!(
                "Scene {} ({}) was detected by the uppercase catch-all rule, review recommended",
                scene.key(),
                scene.header
            );
            self.review.push(scene.key());
        }

        self.scenes.push(scene);
    }
}

/// Splits cleaned screenplay text into scenes.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    /// Create a segmenter with the given configuration
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Create a segmenter with default configuration
    pub fn with_defaults() -> Self {
        Self::new(SegmenterConfig::default())
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Clean raw extracted text and split it into scenes
    pub fn segment(&self, raw_text: &str) -> Segmentation {
        let cleaned = clean_text(raw_text);
        let flag_catch_all = self.config.flag_catch_all_headers;

        let mut state = cleaned
            .split('\n')
            .fold(ScanState::default(), |state, line| state.push_line(line, flag_catch_all));
        state.close_scene(flag_catch_all);

        if state.scenes.is_empty() {
            debug!("No scene headings found, returning whole document as one scene");
            return Segmentation {
                scenes: vec![Scene::new(
                    format!("{}1", AUTO_ID_PREFIX),
                    self.config.fallback_header.clone(),
                    cleaned,
                    0,
                )],
                needs_review: Vec::new(),
                used_fallback: true,
            };
        }

        debug!(
            "Segmented document into {} scenes ({} flagged for review)",
            state.scenes.len(),
            state.review.len()
        );

        Segmentation {
            scenes: state.scenes,
            needs_review: state.review,
            used_fallback: false,
        }
    }

    /// Scene list only
    pub fn parse_scenes(&self, raw_text: &str) -> Vec<Scene> {
        self.segment(raw_text).scenes
    }
}

/// Split raw text into scenes with the default configuration
pub fn parse_scenes(raw_text: &str) -> Vec<Scene> {
    Segmenter::with_defaults().parse_scenes(raw_text)
}
