mod common;

use assert_matches::assert_matches;

use plotline_client::ClientError;
use plotline_core::error::CoreError;
use plotline_core::script::ScriptVersion;

use common::{seed_scenes, test_studio};

fn active_ids(versions: &[ScriptVersion]) -> Vec<i64> {
    versions.iter().filter(|v| v.is_active).map(|v| v.id).collect()
}

#[tokio::test]
async fn new_versions_keep_a_single_active_one() {
    let (studio, _) = test_studio().await;
    let scene_id = seed_scenes(&studio, 1).await[0];
    let mut editor = studio.scripts(scene_id);
    editor.load().await.unwrap();

    editor.edit("INT. GARAGE - NIGHT");
    let first = editor.save_as_new_version().await.unwrap();
    editor.edit("INT. GARAGE - DAY");
    let second = editor.save_as_new_version().await.unwrap();

    assert_eq!(second.version_number, first.version_number + 1);
    let versions = editor.versions().await;
    assert_eq!(versions.len(), 2);
    assert_eq!(active_ids(&versions), vec![second.id]);
    assert!(!editor.is_dirty());
}

#[tokio::test]
async fn set_active_moves_the_active_flag() {
    let (studio, _) = test_studio().await;
    let scene_id = seed_scenes(&studio, 1).await[0];
    let mut editor = studio.scripts(scene_id);

    editor.edit("Draft one");
    let first = editor.save_as_new_version().await.unwrap();
    editor.edit("Draft two");
    editor.save_as_new_version().await.unwrap();

    editor.set_active(first.id).await.unwrap();

    assert_eq!(active_ids(&editor.versions().await), vec![first.id]);
}

#[tokio::test]
async fn save_overwrites_the_selected_version() {
    let (studio, _) = test_studio().await;
    let scene_id = seed_scenes(&studio, 1).await[0];
    let mut editor = studio.scripts(scene_id);
    editor.edit("Original");
    let version = editor.save_as_new_version().await.unwrap();

    editor.edit("Revised");
    assert!(editor.is_dirty());
    let saved = editor.save().await.unwrap();

    assert_eq!(saved.id, version.id);
    assert_eq!(saved.content, "Revised");
    assert!(!editor.is_dirty());
    assert_eq!(editor.versions().await.len(), 1);
}

#[tokio::test]
async fn save_without_selection_is_rejected() {
    let (studio, _) = test_studio().await;
    let scene_id = seed_scenes(&studio, 1).await[0];
    let mut editor = studio.scripts(scene_id);
    editor.load().await.unwrap();

    editor.edit("Nowhere to go");
    let result = editor.save().await;

    assert_matches!(result, Err(ClientError::Core(CoreError::Validation(_))));
}

#[tokio::test]
async fn empty_new_version_is_rejected_locally() {
    let (studio, _) = test_studio().await;
    let scene_id = seed_scenes(&studio, 1).await[0];
    let mut editor = studio.scripts(scene_id);

    editor.edit("  ");
    let result = editor.save_as_new_version().await;

    assert_matches!(result, Err(ClientError::Core(CoreError::Validation(_))));
    assert!(editor.versions().await.is_empty());
}

#[tokio::test]
async fn load_selects_the_active_version() {
    let (studio, _) = test_studio().await;
    let scene_id = seed_scenes(&studio, 1).await[0];
    studio.api().create_script(scene_id, "Active text", true).await.unwrap();
    studio.api().create_script(scene_id, "Inactive text", false).await.unwrap();

    let mut editor = studio.scripts(scene_id);
    editor.load().await.unwrap();

    assert_eq!(editor.draft().content(), "Active text");
}

#[tokio::test]
async fn generate_creates_active_version_from_shots() {
    let (studio, _) = test_studio().await;
    let scene_id = seed_scenes(&studio, 1).await[0];
    studio.shot_list().generate(scene_id).await.unwrap();

    let mut editor = studio.scripts(scene_id);
    let version = editor.generate().await.unwrap();

    assert!(version.is_active);
    assert!(version.content.contains("Scene 1 action 1"));
    assert_eq!(editor.draft().content(), version.content);
}
