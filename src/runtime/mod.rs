mod executor;
pub mod scripts;
pub mod types;

pub use executor::FlowRunner;
pub use scripts::{ScriptHandler, ScriptRegistry};
pub use types::{ExecutionOutcome, FlowStatus, ResultRecord, StepStatus};
