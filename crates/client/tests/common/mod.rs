#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use plotline_api::config::ServerConfig;
use plotline_api::generation::{
    ContentGenerator, DistributionInput, GenerationError, PlotBatchInput,
};
use plotline_api::router::build_app_router;
use plotline_api::state::AppState;
use plotline_api::store::Store;
use plotline_client::{ClientConfig, Studio};
use plotline_core::beats::{Act, Beat, BeatSheet};
use plotline_core::distribution::{BeatSceneRange, SceneDistribution};
use plotline_core::scene_plot::{CreateScenePlot, GeneratedScenePlot, ScenePlot, SceneStatus};
use plotline_core::shot::{CreateShot, Shot};
use plotline_core::types::DbId;

pub const PROJECT_ID: DbId = 1;

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        generation_url: "http://localhost:8100".to_string(),
        generation_timeout_secs: 5,
    }
}

/// Deterministic generator recording the plot batches it receives.
#[derive(Default)]
pub struct StubGenerator {
    fail: AtomicBool,
    plot_calls: Mutex<Vec<PlotBatchInput>>,
}

impl StubGenerator {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
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
                location: None,
                time_of_day: None,
                estimated_duration: None,
                characters_involved: Vec::new(),
            })
            .collect())
    }

    async fn shot_list(&self, scene: &ScenePlot) -> Result<Vec<CreateShot>, GenerationError> {
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

/// Serve the full application on an ephemeral port and return its base URL.
pub async fn spawn_service() -> (String, Arc<StubGenerator>) {
    let config = test_config();
    let generator = Arc::new(StubGenerator::default());
    let state = AppState {
        pool: Store::pool(),
        config: Arc::new(config.clone()),
        generator: generator.clone(),
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), generator)
}

/// A studio talking to a fresh service, with no pause between batch items.
pub async fn test_studio() -> (Studio, Arc<StubGenerator>) {
    let (api_url, generator) = spawn_service().await;
    let config = ClientConfig {
        api_url,
        batch_delay_ms: 0,
        request_timeout_secs: 10,
        ..ClientConfig::default()
    };
    (Studio::new(&config).unwrap(), generator)
}

/// Create `count` empty scenes numbered from 1 and return their ids in order.
pub async fn seed_scenes(studio: &Studio, count: i32) -> Vec<DbId> {
    seed_project_scenes(studio, PROJECT_ID, count).await
}

pub async fn seed_project_scenes(studio: &Studio, project_id: DbId, count: i32) -> Vec<DbId> {
    let rows: Vec<CreateScenePlot> = (1..=count)
        .map(|n| CreateScenePlot {
            scene_number: n,
            story_beat_id: Some("setup".to_string()),
            status: SceneStatus::Empty,
        })
        .collect();
    let scenes = studio
        .api()
        .create_scene_batch(project_id, &rows)
        .await
        .unwrap();
    scenes.iter().map(|s| s.id).collect()
}

pub fn beats(keys: &[&str]) -> Vec<Beat> {
    keys.iter()
        .map(|k| {
            let mut beat = Beat::new(*k, k.replace('_', " "), Act::One);
            beat.content = format!("What happens in {k}");
            beat
        })
        .collect()
}
