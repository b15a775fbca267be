pub mod condition;
pub mod loader;
pub mod registry;
pub mod template;
pub mod types;

pub use condition::evaluate_condition;
pub use loader::{load_flow_from_file, load_flow_from_str, load_flow_from_value};
pub use registry::FlowRegistry;
pub use template::resolve_variables;
pub use types::{FlowDefinition, StepDefinition, SwitchCase};
