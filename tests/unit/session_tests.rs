/*!
 * Tests for the editing session and its store
 */

use anyhow::Result;
use scriptcut::app_config::PricingConfig;
use scriptcut::errors::EditError;
use scriptcut::screenplay::{parse_scenes, SceneKey};
use scriptcut::session::{ScriptSession, SessionStore};
use crate::common::{self, SAMPLE_SCREENPLAY};

fn sample_session() -> ScriptSession {
    ScriptSession::new(parse_scenes(SAMPLE_SCREENPLAY))
}

#[test]
fn test_updateContent_shouldNeverChangeIdOrIndex() {
    let mut session = sample_session();
    let key = SceneKey::new("5A", 1);

    session.update_content(&key, "The tide rolls in.").unwrap();

    let scene = session.find(&key).unwrap();
    assert_eq!(scene.id, "5A");
    assert_eq!(scene.original_index, 1);
    assert_eq!(scene.header, "EXT. BEACH - DAY");
    assert_eq!(scene.content, "The tide rolls in.");
}

#[test]
fn test_undo_withoutEdits_shouldFail() {
    let mut session = sample_session();
    let key = SceneKey::new("12", 2);

    assert_eq!(session.undo(&key), Err(EditError::NothingToUndo("12#2".to_string())));
}

#[test]
fn test_isEdited_afterEditAndManualRevert_shouldBeFalse() {
    let mut session = sample_session();
    let key = SceneKey::new("7", 3);

    session.update_content(&key, "Silence.").unwrap();
    assert!(session.is_edited(&key));

    session.update_content(&key, "Wind howls.").unwrap();
    assert!(!session.is_edited(&key));
    assert_eq!(session.undo_depth(&key), 2);
}

#[test]
fn test_compileScript_shouldUseOriginalHeaderCasing() {
    let session = sample_session();
    let script = session.compile_script();

    assert!(script.starts_with("INT. WAREHOUSE - NIGHT\n\nCrates everywhere."));
    assert!(script.ends_with("ROOFTOP\n\nWind howls.\n\n"));
}

#[test]
fn test_recordUsage_customPricing_shouldUseIt() {
    let mut session = sample_session();
    let pricing = PricingConfig {
        input_usd_per_million: 1.0,
        output_usd_per_million: 2.0,
    };

    session.record_usage(500_000, 250_000, &pricing);

    assert_eq!(session.cost_stats.request_count, 1);
    assert!((session.cost_stats.total_usd - 1.0).abs() < 1e-9);
}

#[test]
fn test_sessionStore_saveAndLoad_shouldKeepEditsAndFlags() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = SessionStore::new(temp_dir.path().join("data").join("current_session.json"));

    let mut session = sample_session();
    session.needs_review.push(SceneKey::new("7", 3));
    session.update_content(&SceneKey::new("11", 0), "Empty warehouse.")?;
    store.save(&session)?;

    let loaded = store.load_required()?;
    assert_eq!(loaded.scenes, session.scenes);
    assert!(loaded.is_flagged(&SceneKey::new("7", 3)));
    assert!(loaded.is_edited(&SceneKey::new("11", 0)));
    Ok(())
}

#[test]
fn test_sessionStore_missingFile_shouldReturnNone() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = SessionStore::new(temp_dir.path().join("nothing.json"));

    assert!(store.load()?.is_none());
    Ok(())
}
