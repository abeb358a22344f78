/*!
 * Integration tests for project persistence
 */

use anyhow::Result;

use scriptcut::app_controller::Controller;
use scriptcut::database::{DatabaseConnection, ProjectRecord, Repository};
use scriptcut::errors::EditError;
use scriptcut::screenplay::parse_scenes;
use crate::common::{self, SAMPLE_SCREENPLAY};

/// Test importing into a project, editing, saving and reopening
#[tokio::test]
async fn test_project_workflow_importEditSaveOpen_shouldKeepEdits() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_sample_screenplay(temp_dir.path())?;
    let controller = common::test_controller(temp_dir.path())?;

    let session = controller.import_file(&script_path, Some("The Long Night")).await?;
    let project_id = session.project_id.clone().expect("import should attach a project");

    controller.edit_scene("11", None, "The warehouse is empty.")?;
    let saved = controller.save_project(None).await?;
    assert_eq!(saved.id, project_id);
    assert_eq!(saved.name, "The Long Night");

    // Load something else, then switch back
    let other = controller.import_file(&script_path, None).await?;
    assert!(other.project_id.is_none());

    let reopened = controller.open_project(&project_id).await?;
    assert_eq!(reopened.scenes[0].content, "The warehouse is empty.");
    assert_eq!(reopened.scenes.len(), 4);
    assert!(!reopened.is_edited(&reopened.scenes[0].key()));
    Ok(())
}

/// Test renaming through save
#[tokio::test]
async fn test_saveProject_withName_shouldRenameExistingProject() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_sample_screenplay(temp_dir.path())?;
    let controller = common::test_controller(temp_dir.path())?;

    controller.import_file(&script_path, Some("Working title")).await?;
    let saved = controller.save_project(Some("Final title")).await?;

    assert_eq!(saved.name, "Final title");
    assert_eq!(controller.list_projects().await?.len(), 1);
    Ok(())
}

/// Test that projects persist across database connections
#[tokio::test]
async fn test_repository_reopenedDatabase_shouldKeepProjects() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let db_path = temp_dir.path().join("projects.db");
    let scenes = parse_scenes(SAMPLE_SCREENPLAY);

    let project = ProjectRecord::new("Pilot", Some("deadbeef".to_string()));
    {
        let repo = Repository::new(DatabaseConnection::new(&db_path)?);
        repo.create_project(&project).await?;
        repo.save_scenes(&project.id, &scenes).await?;
    }

    let repo = Repository::new(DatabaseConnection::new(&db_path)?);
    let found = repo.find_project_by_hash("deadbeef").await?.expect("project should persist");
    assert_eq!(found.id, project.id);
    assert_eq!(repo.get_scenes(&project.id).await?, scenes);

    let stats = repo.connection().stats()?;
    assert_eq!(stats.project_count, 1);
    assert_eq!(stats.scene_count, 4);
    Ok(())
}

/// Test that deleting a project removes its scenes
#[tokio::test]
async fn test_repository_deleteProject_shouldCascade() -> Result<()> {
    let repo = Repository::new_in_memory()?;
    let project = ProjectRecord::new("Pilot", None);
    repo.create_project(&project).await?;
    repo.save_scenes(&project.id, &parse_scenes(SAMPLE_SCREENPLAY)).await?;

    assert!(repo.delete_project(&project.id).await?);
    assert!(repo.get_scenes(&project.id).await?.is_empty());
    assert!(repo.list_projects().await?.is_empty());
    Ok(())
}

const ANALYSIS_JSON: &str = r#"{
    "creative": "The warehouse opening lands; the rooftop ending feels rushed.",
    "marketing": "Works as a contained thriller.",
    "summary": [{"Dạng vấn đề": "Issue", "Mô tả chi tiết": "Ending is rushed"}]
}"#;

const PLAN_JSON: &str = r#"[
    {"task_name": "Earn the ending", "related_scenes": [
        {"scene_id": "7", "header_context": "ROOFTOP", "instruction": "Add a beat before the jump"},
        {"scene_id": "12", "header_context": "CẢNH", "instruction": "Plant the rooftop key"}
    ]}
]"#;

/// Test that analysis, plan and task completion follow the project
#[tokio::test]
async fn test_project_analysisAndPlan_shouldSurviveSaveAndReopen() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_sample_screenplay(temp_dir.path())?;
    let controller = common::test_controller(temp_dir.path())?;

    let session = controller.import_file(&script_path, Some("The Long Night")).await?;
    let project_id = session.project_id.clone().expect("import should attach a project");

    let analysis_path = common::create_test_file(temp_dir.path(), "analysis.json", ANALYSIS_JSON)?;
    let plan_path = common::create_test_file(temp_dir.path(), "plan.json", PLAN_JSON)?;
    controller.attach_analysis(&analysis_path)?;
    controller.attach_plan(&plan_path, "Make the ending earned")?;

    // Not saved yet: completion stays in the session only
    controller.mark_task("7", true).await?;
    controller.save_project(None).await?;

    // Saved plan: completion goes straight to the database too
    controller.mark_task("12", true).await?;
    controller.mark_task("12", false).await?;

    controller.import_file(&script_path, None).await?;
    assert!(controller.load_session()?.action_plan.is_none());

    let reopened = controller.open_project(&project_id).await?;
    let analysis = reopened.analysis_results.clone().expect("analysis should be restored");
    assert_eq!(analysis.summary[0].detail, "Ending is rushed");
    assert_eq!(reopened.analysis_report.as_deref(), Some(analysis.creative.as_str()));
    assert_eq!(reopened.user_strategy.as_deref(), Some("Make the ending earned"));

    let progress = reopened.plan_progress().expect("plan should be restored");
    assert_eq!((progress.completed, progress.total), (1, 2));

    let plan_lines = Controller::describe_plan(&reopened).expect("plan lines");
    assert_eq!(plan_lines[0], "Earn the ending (1/2)");
    assert!(plan_lines[1].starts_with("  [x] 7"));
    assert!(plan_lines[2].starts_with("  [ ] 12"));
    Ok(())
}

/// Test that marking a scene outside the plan is rejected
#[tokio::test]
async fn test_markTask_sceneNotInPlan_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_sample_screenplay(temp_dir.path())?;
    let controller = common::test_controller(temp_dir.path())?;
    controller.import_file(&script_path, None).await?;

    let plan_path = common::create_test_file(temp_dir.path(), "plan.json", PLAN_JSON)?;
    controller.attach_plan(&plan_path, "Make the ending earned")?;

    let err = controller.mark_task("11", true).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<EditError>(),
        Some(&EditError::TaskNotFound("11".to_string()))
    );
    Ok(())
}
