pub mod utils_console;
pub mod utils_enums;
pub mod utils_errors;
pub mod utils_robot;
pub mod utils_se3;
pub mod utils_traits;
