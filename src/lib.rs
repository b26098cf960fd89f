pub mod android_jni;
pub mod catalog;
pub mod config;
pub mod error;
pub mod geo;
pub mod nav;
pub mod planner;
pub mod route;
pub mod speed;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
