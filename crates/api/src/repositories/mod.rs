//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&Store` as the first argument.

pub mod animation_repo;
pub mod key_action_repo;
pub mod scene_plot_repo;
pub mod script_repo;
pub mod shot_repo;
pub mod story_arc_repo;

pub use animation_repo::AnimationRepo;
pub use key_action_repo::KeyActionRepo;
pub use scene_plot_repo::ScenePlotRepo;
pub use script_repo::ScriptRepo;
pub use shot_repo::ShotRepo;
pub use story_arc_repo::StoryArcRepo;
