#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use plotline_api::config::ServerConfig;
use plotline_api::generation::{
    ContentGenerator, DistributionInput, GenerationError, PlotBatchInput,
};
use plotline_api::router::build_app_router;
use plotline_api::state::AppState;
use plotline_api::store::Store;
use plotline_core::beats::BeatSheet;
use plotline_core::distribution::{BeatSceneRange, SceneDistribution};
use plotline_core::scene_plot::{GeneratedScenePlot, ScenePlot};
use plotline_core::shot::{CreateShot, Shot};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        generation_url: "http://localhost:8100".to_string(),
        generation_timeout_secs: 5,
    }
}

/// Deterministic generator that records the plot batches it receives.
///
/// - distribution: two scenes per beat, in beat order
/// - plots: "Scene N" / "Synopsis of scene N"
/// - shot lists: three shots
/// - scripts: the scene title followed by one line per shot
/// - beats: "Regenerated <key>"
#[derive(Default)]
pub struct StubGenerator {
    pub fail: AtomicBool,
    /// Artificial latency for shot list and script generation.
    pub latency_ms: AtomicU64,
    pub plot_calls: Mutex<Vec<PlotBatchInput>>,
}

impl StubGenerator {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn wait(&self) {
        let ms = self.latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    pub fn plot_calls(&self) -> Vec<PlotBatchInput> {
        self.plot_calls.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), GenerationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GenerationError::Backend {
                status: 503,
                body: "stub backend unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn distribute_scenes(
        &self,
        input: &DistributionInput,
    ) -> Result<SceneDistribution, GenerationError> {
        self.check()?;
        let distribution: Vec<BeatSceneRange> = input
            .story_beats
            .iter()
            .enumerate()
            .map(|(i, beat)| {
                let first = i as i32 * 2 + 1;
                BeatSceneRange {
                    beat_id: beat.key.clone(),
                    beat_name: beat.label.clone(),
                    scene_numbers: vec![first, first + 1],
                    scene_count: 2,
                }
            })
            .collect();
        let total_scenes = distribution.len() * 2;
        Ok(SceneDistribution {
            distribution,
            total_scenes,
        })
    }

    async fn plot_scenes(
        &self,
        input: &PlotBatchInput,
    ) -> Result<Vec<GeneratedScenePlot>, GenerationError> {
        self.check()?;
        self.plot_calls.lock().unwrap().push(input.clone());
        Ok(input
            .scene_numbers
            .iter()
            .map(|&n| GeneratedScenePlot {
                scene_number: n,
                title: format!("Scene {n}"),
                synopsis: format!("Synopsis of scene {n}"),
                location: Some("Warehouse".to_string()),
                time_of_day: Some("night".to_string()),
                estimated_duration: Some(90),
                characters_involved: Vec::new(),
            })
            .collect())
    }

    async fn shot_list(&self, scene: &ScenePlot) -> Result<Vec<CreateShot>, GenerationError> {
        self.wait().await;
        self.check()?;
        Ok((1..=3)
            .map(|i| CreateShot {
                camera_type: "wide".to_string(),
                camera_angle: "eye level".to_string(),
                camera_movement: "static".to_string(),
                duration_seconds: 4.0,
                action: format!("Scene {} action {i}", scene.scene_number),
                dialogue: None,
            })
            .collect())
    }

    async fn script(&self, scene: &ScenePlot, shots: &[Shot]) -> Result<String, GenerationError> {
        self.wait().await;
        self.check()?;
        let mut lines = vec![scene.title.clone().unwrap_or_default()];
        lines.extend(shots.iter().map(|s| s.action.clone()));
        Ok(lines.join("\n"))
    }

    async fn regenerate_beats(
        &self,
        _sheet: &BeatSheet,
        keys: &[String],
    ) -> Result<BTreeMap<String, String>, GenerationError> {
        self.check()?;
        Ok(keys
            .iter()
            .map(|k| (k.clone(), format!("Regenerated {k}")))
            .collect())
    }
}

/// Build the full application router over an empty store.
///
/// Returns the generator as well so tests can inspect or break it.
pub fn build_test_app() -> (Router, Arc<StubGenerator>) {
    let config = test_config();
    let generator = Arc::new(StubGenerator::default());
    let state = AppState {
        pool: Store::pool(),
        config: Arc::new(config.clone()),
        generator: generator.clone(),
    };
    (build_app_router(state, &config), generator)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::PATCH, uri, body).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create `count` placeholder scenes for a project and return their ids in
/// scene order.
pub async fn seed_scenes(app: &Router, project_id: i64, count: i32) -> Vec<i64> {
    let scenes: Vec<Value> = (1..=count)
        .map(|n| serde_json::json!({ "scene_number": n, "story_beat_id": "setup", "status": "empty" }))
        .collect();
    let response = post_json(
        app.clone(),
        "/api/scene-plots/batch",
        serde_json::json!({ "projectId": project_id, "scenes": scenes }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    json["scenes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect()
}

/// Generate a shot list for a scene and return the shot ids in order.
pub async fn seed_shots(app: &Router, scene_id: i64) -> Vec<i64> {
    let response = post_json(
        app.clone(),
        "/api/scene-shots/generate",
        serde_json::json!({ "sceneId": scene_id, "userId": 1 }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let json = body_json(response).await;
    json["shots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect()
}
