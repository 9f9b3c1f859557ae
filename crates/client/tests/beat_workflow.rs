mod common;

use assert_matches::assert_matches;

use plotline_client::{ApiError, ClientError};
use plotline_core::beats::{DramaticIntensity, StoryStructure};
use plotline_core::error::CoreError;
use plotline_core::key_action::CreateKeyAction;

use common::{test_studio, PROJECT_ID};

#[tokio::test]
async fn load_without_story_arc_starts_from_structure() {
    let (studio, _) = test_studio().await;
    let mut editor = studio.beats(PROJECT_ID);

    editor.load(StoryStructure::SaveTheCat).await.unwrap();

    assert_eq!(editor.sheet().structure, StoryStructure::SaveTheCat);
    assert_eq!(editor.sheet().len(), 15);
    assert!(studio.store().story_arc(PROJECT_ID).await.is_none());
}

#[tokio::test]
async fn edits_stay_local_until_saved() {
    let (studio, _) = test_studio().await;
    let mut editor = studio.beats(PROJECT_ID);
    editor.load(StoryStructure::ThreeAct).await.unwrap();

    editor.update_beat("midpoint", "The courier opens the package").unwrap();
    assert!(editor.toggle_character("midpoint", "Mara").unwrap());
    assert!(studio.api().get_story_arc(PROJECT_ID).await.unwrap().is_none());

    editor.save().await.unwrap();

    let stored = studio.store().story_arc(PROJECT_ID).await.unwrap();
    let midpoint = stored.sheet.get("midpoint").unwrap();
    assert_eq!(midpoint.content, "The courier opens the package");
    assert!(midpoint.characters.contains("Mara"));
}

#[tokio::test]
async fn unknown_beat_is_rejected_locally() {
    let (studio, _) = test_studio().await;
    let mut editor = studio.beats(PROJECT_ID);
    editor.load(StoryStructure::ThreeAct).await.unwrap();

    let result = editor.update_beat("epilogue", "text");
    assert_matches!(result, Err(ClientError::Core(CoreError::UnknownBeat(_))));
}

#[tokio::test]
async fn intensity_changes_regenerate_only_changed_beats() {
    let (studio, _) = test_studio().await;
    let mut editor = studio.beats(PROJECT_ID);
    editor.load(StoryStructure::ThreeAct).await.unwrap();
    editor.update_beat("climax", "Original climax").unwrap();
    editor.save().await.unwrap();

    editor.set_intensity("midpoint", Some(DramaticIntensity::High)).unwrap();
    assert!(editor.pending_intensity_changes().contains("midpoint"));

    editor.apply_intensity_changes().await.unwrap();

    assert!(editor.pending_intensity_changes().is_empty());
    let midpoint = editor.sheet().get("midpoint").unwrap();
    assert_eq!(midpoint.content, "Regenerated midpoint");
    assert_eq!(midpoint.dramatic_intensity, Some(DramaticIntensity::High));
    assert_eq!(editor.sheet().get("climax").unwrap().content, "Original climax");
}

#[tokio::test]
async fn cleared_intensity_stays_cleared_after_regeneration() {
    let (studio, _) = test_studio().await;
    let mut editor = studio.beats(PROJECT_ID);
    editor.load(StoryStructure::ThreeAct).await.unwrap();
    editor.save().await.unwrap();
    editor.set_intensity("climax", Some(DramaticIntensity::High)).unwrap();
    editor.apply_intensity_changes().await.unwrap();

    editor.set_intensity("climax", None).unwrap();
    editor.apply_intensity_changes().await.unwrap();

    assert_eq!(editor.sheet().get("climax").unwrap().dramatic_intensity, None);
    let stored = studio.store().story_arc(PROJECT_ID).await.unwrap();
    assert_eq!(stored.sheet.get("climax").unwrap().dramatic_intensity, None);
}

#[tokio::test]
async fn failed_regeneration_keeps_pending_changes() {
    let (studio, generator) = test_studio().await;
    let mut editor = studio.beats(PROJECT_ID);
    editor.load(StoryStructure::ThreeAct).await.unwrap();
    editor.save().await.unwrap();

    editor.set_intensity("climax", Some(DramaticIntensity::Low)).unwrap();
    generator.set_failing(true);

    let result = editor.apply_intensity_changes().await;

    assert_matches!(result, Err(ClientError::Api(ApiError::Api { status: 502, .. })));
    assert!(editor.pending_intensity_changes().contains("climax"));
    assert_eq!(
        editor.sheet().get("climax").unwrap().dramatic_intensity,
        Some(DramaticIntensity::Low)
    );
    let stored = studio.store().story_arc(PROJECT_ID).await.unwrap();
    assert_eq!(stored.sheet.get("climax").unwrap().dramatic_intensity, None);

    generator.set_failing(false);
    editor.apply_intensity_changes().await.unwrap();
    assert!(editor.pending_intensity_changes().is_empty());
}

#[tokio::test]
async fn key_actions_are_reloaded_after_changes() {
    let (studio, _) = test_studio().await;
    let mut editor = studio.beats(PROJECT_ID);
    editor.load(StoryStructure::ThreeAct).await.unwrap();

    let first = editor
        .add_key_action(
            "climax",
            &CreateKeyAction {
                description: "Bridge collapses".to_string(),
                characters_involved: vec!["Mara".to_string()],
            },
        )
        .await
        .unwrap();
    editor
        .add_key_action(
            "climax",
            &CreateKeyAction {
                description: "Truck skids".to_string(),
                characters_involved: Vec::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(studio.store().key_actions(PROJECT_ID, "climax").await.len(), 2);

    editor.delete_key_action("climax", first.id).await.unwrap();

    let remaining = studio.store().key_actions(PROJECT_ID, "climax").await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].description, "Truck skids");
    assert_eq!(remaining[0].index, 0);
}

#[tokio::test]
async fn blank_key_action_is_rejected_locally() {
    let (studio, _) = test_studio().await;
    let mut editor = studio.beats(PROJECT_ID);
    editor.load(StoryStructure::ThreeAct).await.unwrap();

    let result = editor
        .add_key_action(
            "climax",
            &CreateKeyAction {
                description: String::new(),
                characters_involved: Vec::new(),
            },
        )
        .await;

    assert_matches!(result, Err(ClientError::Core(CoreError::Validation(_))));
    assert!(editor.load_key_actions("climax").await.unwrap().is_empty());
}
