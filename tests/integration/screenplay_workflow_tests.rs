/*!
 * Integration tests for the screenplay import, edit and export workflow
 */

use anyhow::Result;

use scriptcut::file_utils::FileManager;
use scriptcut::pdf_import::{import_screenplay, import_screenplay_async};
use scriptcut::screenplay::{load_scenes_json, Segmenter};
use scriptcut::errors::ImportError;
use scriptcut::app_controller::Controller;
use crate::common;

/// Test the full workflow from a text screenplay to an exported draft
#[tokio::test]
async fn test_screenplay_workflow_withFullProcess_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_sample_screenplay(temp_dir.path())?;
    let controller = common::test_controller(temp_dir.path())?;

    // 1. Import
    let session = controller.import_file(&script_path, None).await?;
    assert_eq!(session.scenes.len(), 4);
    assert_eq!(session.needs_review.len(), 1);

    // 2. Edit a scene and check the listing markers
    let new_content = common::create_test_file(temp_dir.path(), "scene5a.txt", "Low tide.\nGulls circle.\n")?;
    let content = FileManager::read_to_string(&new_content)?;
    assert!(controller.edit_scene("5A", None, content.trim())?);

    let listing = Controller::describe_scenes(&controller.load_session()?);
    assert!(listing[1].starts_with('*'));
    assert_eq!(listing[3].chars().nth(1), Some('?'));

    // 3. Export as text
    let draft = temp_dir.path().join("exports").join("draft.txt");
    controller.export(&draft)?;
    let text = FileManager::read_to_string(&draft)?;
    assert_eq!(
        text,
        "INT. WAREHOUSE - NIGHT\n\nCrates everywhere. MARIA (30s) checks her watch.\nMARIA\nHe's late.\n\n\
         EXT. BEACH - DAY\n\nLow tide.\nGulls circle.\n\n\
         CẢNH\n\nHai người đứng trên cầu.\n\n\
         ROOFTOP\n\nWind howls.\n"
    );

    // 4. Export as JSON and read it back
    let json_path = temp_dir.path().join("draft.json");
    controller.export(&json_path)?;
    let scenes = load_scenes_json(&json_path)?;
    assert_eq!(scenes, controller.load_session()?.scenes);

    Ok(())
}

/// Test re-importing an exported draft
#[tokio::test]
async fn test_exportedScreenplay_reimported_shouldKeepSceneBodies() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_sample_screenplay(temp_dir.path())?;
    let controller = common::test_controller(temp_dir.path())?;
    let original = controller.import_file(&script_path, None).await?;

    let draft = temp_dir.path().join("draft.txt");
    controller.export(&draft)?;

    let reimported = import_screenplay(&draft, &Segmenter::with_defaults())?;
    let scenes = reimported.segmentation.scenes;

    // Numbers are stripped on export: keyword headings fall back to AUTO ids and
    // the digit-less "ROOFTOP" is no longer a heading
    assert_eq!(scenes.len(), original.scenes.len() - 1);
    assert!(scenes.iter().all(|s| s.has_auto_id()));
    assert_eq!(scenes[1].content, original.scenes[1].content);
    assert_eq!(scenes[2].content, "Hai người đứng trên cầu.\nROOFTOP\nWind howls.");
    Ok(())
}

/// Test that undo walks back through successive edits
#[tokio::test]
async fn test_undo_afterSeveralEdits_shouldRestoreImportedContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_sample_screenplay(temp_dir.path())?;
    let controller = common::test_controller(temp_dir.path())?;
    controller.import_file(&script_path, None).await?;

    controller.edit_scene("12", None, "First rewrite.")?;
    controller.edit_scene("12", Some(2), "Second rewrite.")?;

    controller.undo_scene("12", None)?;
    assert_eq!(controller.load_session()?.scenes[2].content, "First rewrite.");

    controller.undo_scene("12", None)?;
    assert_eq!(controller.load_session()?.scenes[2].content, "Hai người đứng trên cầu.");

    assert!(controller.undo_scene("12", None).is_err());
    Ok(())
}

/// Test that commands needing a session fail cleanly without one
#[test]
fn test_edit_withoutSession_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = common::test_controller(temp_dir.path())?;

    assert!(controller.edit_scene("1", None, "x").is_err());
    assert!(controller.export(&temp_dir.path().join("out.txt")).is_err());
    Ok(())
}

/// Test that an empty document is rejected before segmentation
#[test]
fn test_importScreenplay_blankDocument_shouldBeEmptyDocumentError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "blank.txt", "  \n\n \n")?;

    let result = import_screenplay(&path, &Segmenter::with_defaults());
    assert!(matches!(result, Err(ImportError::EmptyDocument(_))));
    Ok(())
}

/// Test folder mode writes one scene list per PDF and respects force overwrite
#[tokio::test]
async fn test_runFolder_withExistingOutputs_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = common::test_controller(temp_dir.path())?;

    common::create_test_file(temp_dir.path(), "episode1.pdf", "not really a pdf")?;
    common::create_test_file(temp_dir.path(), "episode1.scenes.json", "[]")?;

    let summary = controller.run_folder(temp_dir.path(), false).await?;
    assert_eq!((summary.processed, summary.skipped, summary.failed), (0, 1, 0));

    let summary = controller.run_folder(temp_dir.path(), true).await?;
    assert_eq!((summary.processed, summary.skipped, summary.failed), (0, 0, 1));
    Ok(())
}

/// Test the async import wrapper from a blocking context
#[test]
fn test_importScreenplayAsync_fromBlockingTest_shouldSegment() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_sample_screenplay(temp_dir.path())?;

    let imported = tokio_test::block_on(async {
        import_screenplay_async(script_path.clone(), Segmenter::with_defaults()).await
    })?;

    assert_eq!(imported.source_file, script_path);
    assert_eq!(imported.source_hash.len(), 64);
    assert_eq!(imported.segmentation.scenes.len(), 4);
    Ok(())
}
