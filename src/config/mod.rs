mod engine;
mod env;

pub use engine::{EngineConfig, DEFAULT_FLOW_PATH};
pub use env::EnvConfig;
