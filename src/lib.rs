pub mod config;
pub mod error;
pub mod flow;
pub mod runtime;
pub mod skills;
pub mod state;
pub mod utils;

pub use config::{EngineConfig, EnvConfig, DEFAULT_FLOW_PATH};
pub use error::{FinFlowError, Result};
pub use flow::{
    evaluate_condition, load_flow_from_file, load_flow_from_str, load_flow_from_value,
    resolve_variables, FlowDefinition, FlowRegistry, StepDefinition, SwitchCase,
};
pub use runtime::{
    ExecutionOutcome, FlowRunner, FlowStatus, ResultRecord, ScriptHandler, ScriptRegistry,
    StepStatus,
};
#[cfg(feature = "orchestrate-client")]
pub use skills::orchestrate::OrchestrateSkills;
pub use skills::{MockSkillInvoker, SkillInvoker};
pub use state::ExecutionContext;
pub use utils::LoggingConfig;
