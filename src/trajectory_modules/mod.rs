pub mod whole_body_trajectory;
pub mod trajectory_processor_module;
