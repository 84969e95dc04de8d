pub mod render_engine;
pub mod recording_render_engine;
#[cfg(feature = "rerun_viewer")]
pub mod rerun_render_engine;
pub mod visual_primitive_pool;
pub mod style_config;
pub mod whole_body_trajectory_display;
