//! Integration tests for project-scoped endpoints: story arc, key actions
//! and animations.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json};
use serde_json::{json, Value};

fn custom_sheet() -> Value {
    json!({
        "structure": "custom",
        "beats": [
            { "key": "beat_1", "label": "Opening", "act": 1, "content": "It rains." },
            { "key": "beat_2", "label": "Turn", "act": 2 },
            { "key": "beat_3", "label": "Ending", "act": 3 }
        ]
    })
}

// ---------------------------------------------------------------------------
// Story arc
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_story_arc_returns_404() {
    let (app, _) = common::build_test_app();
    let response = get(app, "/api/projects/1/story-arc").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_then_get_round_trips_the_sheet() {
    let (app, _) = common::build_test_app();

    let response = put_json(app.clone(), "/api/projects/1/story-arc", custom_sheet()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(app, "/api/projects/1/story-arc").await).await;
    let arc = &json["storyArc"];
    assert_eq!(arc["project_id"], 1);
    assert_eq!(arc["structure"], "custom");
    assert_eq!(arc["beats"].as_array().unwrap().len(), 3);
    assert_eq!(arc["beats"][0]["content"], "It rains.");
}

#[tokio::test]
async fn put_rejects_preset_sheet_with_wrong_beats() {
    let (app, _) = common::build_test_app();
    let sheet = json!({
        "structure": "three_act",
        "beats": [{ "key": "opening", "label": "Opening", "act": 1 }]
    });
    let response = put_json(app, "/api/projects/1/story-arc", sheet).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn regenerate_rewrites_only_requested_beats_and_stores_intensity() {
    let (app, _) = common::build_test_app();
    put_json(app.clone(), "/api/projects/2/story-arc", custom_sheet()).await;

    let response = post_json(
        app.clone(),
        "/api/projects/2/story-arc/regenerate",
        json!({
            "userId": 1,
            "beatKeys": ["beat_2"],
            "intensities": { "beat_2": 3 }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let beats = json["storyArc"]["beats"].as_array().unwrap();
    assert_eq!(beats[0]["content"], "It rains.");
    assert_eq!(beats[1]["content"], "Regenerated beat_2");
    assert_eq!(beats[1]["dramatic_intensity"], 3);
    assert_eq!(beats[2]["content"], "");
}

#[tokio::test]
async fn regenerate_with_null_intensity_clears_it() {
    let (app, _) = common::build_test_app();
    put_json(app.clone(), "/api/projects/2/story-arc", custom_sheet()).await;
    post_json(
        app.clone(),
        "/api/projects/2/story-arc/regenerate",
        json!({ "userId": 1, "beatKeys": ["beat_2"], "intensities": { "beat_2": 3 } }),
    )
    .await;

    let response = post_json(
        app,
        "/api/projects/2/story-arc/regenerate",
        json!({ "userId": 1, "beatKeys": ["beat_2"], "intensities": { "beat_2": null } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["storyArc"]["beats"][1]["dramatic_intensity"].is_null());
}

#[tokio::test]
async fn regenerate_unknown_beat_returns_404() {
    let (app, _) = common::build_test_app();
    put_json(app.clone(), "/api/projects/2/story-arc", custom_sheet()).await;

    let response = post_json(
        app,
        "/api/projects/2/story-arc/regenerate",
        json!({ "userId": 1, "beatKeys": ["nope"], "intensities": {} }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_regeneration_keeps_stored_sheet() {
    let (app, generator) = common::build_test_app();
    put_json(app.clone(), "/api/projects/2/story-arc", custom_sheet()).await;
    generator.set_failing(true);

    let response = post_json(
        app.clone(),
        "/api/projects/2/story-arc/regenerate",
        json!({ "userId": 1, "beatKeys": ["beat_1"], "intensities": { "beat_1": 1 } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(get(app, "/api/projects/2/story-arc").await).await;
    let beat = &json["storyArc"]["beats"][0];
    assert_eq!(beat["content"], "It rains.");
    assert!(beat.get("dramatic_intensity").is_none());
}

// ---------------------------------------------------------------------------
// Key actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn key_actions_are_indexed_per_beat_and_compacted_on_delete() {
    let (app, _) = common::build_test_app();
    let uri = "/api/projects/3/beats/beat_1/key-actions";

    let mut ids = Vec::new();
    for description in ["door opens", "glass breaks", "lights out"] {
        let response = post_json(
            app.clone(),
            uri,
            json!({ "description": description, "charactersInvolved": ["Mara"] }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        ids.push(json["keyAction"]["id"].as_i64().unwrap());
    }

    let response = delete(app.clone(), &format!("/api/projects/3/key-actions/{}", ids[0])).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get(app.clone(), uri).await).await;
    let actions = json["keyActions"].as_array().unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0]["description"], "glass breaks");
    assert_eq!(actions[0]["index"], 0);
    assert_eq!(actions[1]["index"], 1);
    assert_eq!(actions[1]["characters_involved"], json!(["Mara"]));

    let other = body_json(get(app, "/api/projects/3/beats/beat_2/key-actions").await).await;
    assert_eq!(other["keyActions"], json!([]));
}

#[tokio::test]
async fn key_action_requires_description() {
    let (app, _) = common::build_test_app();
    let response = post_json(
        app,
        "/api/projects/3/beats/beat_1/key-actions",
        json!({ "description": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_key_action_of_another_project_returns_404() {
    let (app, _) = common::build_test_app();
    let response = post_json(
        app.clone(),
        "/api/projects/3/beats/beat_1/key-actions",
        json!({ "description": "door opens" }),
    )
    .await;
    let id = body_json(response).await["keyAction"]["id"].as_i64().unwrap();

    let response = delete(app, &format!("/api/projects/4/key-actions/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Animations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn animations_are_listed_per_user() {
    let (app, _) = common::build_test_app();

    for (user, title) in [(1, "Teaser"), (1, "Trailer"), (2, "Other")] {
        let response = post_json(
            app.clone(),
            "/api/projects/5/animations",
            json!({ "userId": user, "title": title }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let json = body_json(get(app, "/api/projects/5/animations?userId=1").await).await;
    let animations = json["animations"].as_array().unwrap();
    assert_eq!(animations.len(), 2);
    assert!(animations.iter().all(|a| a["user_id"] == 1));
    assert!(animations.iter().all(|a| a["status"] == "draft"));
}
