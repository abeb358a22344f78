/*!
 * Tests for text cleanup and scene segmentation
 */

use scriptcut::screenplay::{
    clean_text, parse_scenes, Scene, SceneKey, Segmenter, SegmenterConfig,
};
use crate::common::SAMPLE_SCREENPLAY;

fn assert_contiguous(scenes: &[Scene]) {
    for (position, scene) in scenes.iter().enumerate() {
        assert_eq!(scene.original_index, position, "index gap at scene {}", scene);
    }
}

/// Test segmentation of a realistic extracted screenplay
#[test]
fn test_segment_sampleScreenplay_shouldFindAllScenes() {
    let segmentation = Segmenter::with_defaults().segment(SAMPLE_SCREENPLAY);
    let scenes = &segmentation.scenes;

    let ids: Vec<&str> = scenes.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["11", "5A", "12", "7"]);

    assert_eq!(scenes[0].header, "INT. WAREHOUSE - NIGHT");
    assert_eq!(
        scenes[0].content,
        "Crates everywhere. MARIA (30s) checks her watch.\nMARIA\nHe's late."
    );
    assert_eq!(scenes[1].header, "EXT. BEACH - DAY");
    assert_eq!(scenes[1].content, "Waves crash on the shore.");
    assert_eq!(scenes[2].header, "CẢNH");
    assert_eq!(scenes[3].header, "ROOFTOP");
    assert_eq!(scenes[3].content, "Wind howls.");

    assert_contiguous(scenes);
    assert!(!segmentation.used_fallback);
}

/// Test that only the catch-all heading is flagged for review
#[test]
fn test_segment_catchAllHeading_shouldBeFlagged() {
    let segmentation = Segmenter::with_defaults().segment(SAMPLE_SCREENPLAY);
    assert_eq!(segmentation.needs_review, vec![SceneKey::new("7", 3)]);
}

/// Test that flagging can be turned off
#[test]
fn test_segment_flaggingDisabled_shouldReportNothing() {
    let segmenter = Segmenter::new(SegmenterConfig {
        flag_catch_all_headers: false,
        ..SegmenterConfig::default()
    });

    let segmentation = segmenter.segment(SAMPLE_SCREENPLAY);
    assert!(segmentation.needs_review.is_empty());
    assert_eq!(segmentation.scenes.len(), 4);
}

/// Test that the scene list is never empty
#[test]
fn test_parseScenes_degenerateInputs_shouldNeverBeEmpty() {
    for input in ["", "   ", "\n\n\n", "12\nPage 3\n", "just some words"] {
        let scenes = parse_scenes(input);
        assert_eq!(scenes.len(), 1, "input {:?}", input);
        assert_contiguous(&scenes);
    }
}

/// Test the fallback scene when no heading is present
#[test]
fn test_parseScenes_noHeading_shouldReturnCleanedTextAsOneScene() {
    let raw = "  Once upon a time.\n\n42\nThe end.  \n";
    let scenes = parse_scenes(raw);

    assert_eq!(scenes, vec![Scene::new("AUTO_1", "UNKNOWN SCENE", clean_text(raw), 0)]);
    assert_eq!(scenes[0].content, "Once upon a time.\nThe end.");
}

/// Test that roman numerals and fractions do not open a scene
#[test]
fn test_parseScenes_numericSymbolsOnly_shouldUseFallbackScene() {
    let raw = "ACT Ⅱ\nshe waits.\n½\nCHAPTER Ⅳ";
    let segmentation = Segmenter::with_defaults().segment(raw);

    assert!(segmentation.used_fallback);
    assert!(segmentation.needs_review.is_empty());
    assert_eq!(
        segmentation.scenes,
        vec![Scene::new("AUTO_1", "UNKNOWN SCENE", "ACT Ⅱ\nshe waits.\n½\nCHAPTER Ⅳ", 0)]
    );
}

/// Test a custom fallback header
#[test]
fn test_segment_customFallbackHeader_shouldBeUsed() {
    let segmenter = Segmenter::new(SegmenterConfig {
        fallback_header: "WHOLE SCRIPT".to_string(),
        ..SegmenterConfig::default()
    });

    let segmentation = segmenter.segment("no headings here");
    assert!(segmentation.used_fallback);
    assert_eq!(segmentation.scenes[0].header, "WHOLE SCRIPT");
}

/// Test that heading lines never leak into content
#[test]
fn test_parseScenes_content_shouldExcludeHeadingLines() {
    let scenes = parse_scenes(SAMPLE_SCREENPLAY);
    for scene in &scenes {
        for line in scene.content.lines() {
            assert!(!line.contains(&scene.header) || scene.header.is_empty(),
                "header {:?} found in content of {}", scene.header, scene);
        }
    }
}

/// Test that the AUTO counter advances on every scene start
#[test]
fn test_parseScenes_autoCounter_shouldCountNumberedScenesToo() {
    let raw = "SCENE\nA.\nINT. HOUSE - DAY 4\nB.\nEXT. STREET\nC.\nI/E. CAR\nD.";
    let scenes = parse_scenes(raw);

    let ids: Vec<&str> = scenes.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["AUTO_1", "4", "AUTO_3", "AUTO_4"]);
    assert!(scenes.iter().filter(|s| s.has_auto_id()).count() == 3);
}

/// Test that duplicate ids survive and stay distinguishable by index
#[test]
fn test_parseScenes_duplicateIds_shouldKeepBothScenes() {
    let raw = "SCENE 3\nFirst.\nSCENE 3\nSecond.";
    let scenes = parse_scenes(raw);

    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[0].id, scenes[1].id);
    assert_ne!(scenes[0].key(), scenes[1].key());
}

/// Test that text before the first heading is dropped
#[test]
fn test_parseScenes_preamble_shouldBeDropped() {
    let raw = "Title page\nDraft 3, January\nEXT. FIELD - DAY 1\nGrass.";
    let scenes = parse_scenes(raw);

    assert_eq!(scenes.len(), 1);
    assert_eq!(scenes[0].content, "Grass.");
}

/// Test that a heading with no body yields empty content
#[test]
fn test_parseScenes_consecutiveHeadings_shouldYieldEmptyContent() {
    let scenes = parse_scenes("INT. A 1\nINT. B 2\nBody.");

    assert_eq!(scenes[0].content, "");
    assert_eq!(scenes[1].content, "Body.");
}

/// Test cleaner idempotence
#[test]
fn test_cleanText_appliedTwice_shouldBeStable() {
    let once = clean_text(SAMPLE_SCREENPLAY);
    assert_eq!(clean_text(&once), once);
}

/// Test that segmentation is deterministic
#[test]
fn test_segment_repeated_shouldProduceSameResult() {
    let segmenter = Segmenter::with_defaults();
    assert_eq!(segmenter.segment(SAMPLE_SCREENPLAY), segmenter.segment(SAMPLE_SCREENPLAY));
}

/// Test the persisted JSON shape of a scene
#[test]
fn test_scene_json_shouldHaveExactlyFourFields() {
    let scenes = parse_scenes(SAMPLE_SCREENPLAY);
    let value = serde_json::to_value(&scenes[1]).unwrap();
    let object = value.as_object().unwrap();

    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["content", "header", "id", "original_index"]);
    assert_eq!(object["id"], "5A");
    assert_eq!(object["original_index"], 1);
}
