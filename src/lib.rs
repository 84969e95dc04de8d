//! trajviz renders whole-body robot trajectories as 3D visual primitives.
//! A trajectory message carries a time series of full-body states (posture, center of mass and
//! contacts); the display turns it into a posed robot model, force arrows, a center of mass path
//! and one path per contact, and keeps those drawings in sync with new messages and with the
//! user's style settings.
//! Drawing goes through the `RenderEngine` trait, so the same display can drive an in-memory
//! scene or a Rerun viewer (feature `rerun_viewer`).

pub mod display_modules;
pub mod robot_modules;
pub mod trajectory_modules;
pub mod utils;
