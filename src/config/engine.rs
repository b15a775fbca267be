use std::path::PathBuf;

use super::env::EnvConfig;

pub const DEFAULT_FLOW_PATH: &str = "flows/invoice_processing_flow.json";

/// 引擎配置
///
/// 全部来自环境变量，启动时读取一次。
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub enable_orchestrate: bool,
    pub orchestrate_api_key: Option<String>,
    pub orchestrate_url: Option<String>,
    pub orchestrate_project_id: Option<String>,
    /// 流程定义文件路径；文件缺失不致命，引擎以空注册表启动
    pub flow_path: PathBuf,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            enable_orchestrate: EnvConfig::get_env_flag("ENABLE_ORCHESTRATE"),
            orchestrate_api_key: EnvConfig::get_env_optional("ORCHESTRATE_API_KEY"),
            orchestrate_url: EnvConfig::get_env_optional("ORCHESTRATE_URL"),
            orchestrate_project_id: EnvConfig::get_env_optional("ORCHESTRATE_PROJECT_ID"),
            flow_path: EnvConfig::get_env_optional("FINFLOW_FLOW_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FLOW_PATH)),
        }
    }

    /// Orchestrate 凭据是否齐全
    pub fn has_orchestrate_credentials(&self) -> bool {
        self.orchestrate_api_key.is_some()
            && self.orchestrate_url.is_some()
            && self.orchestrate_project_id.is_some()
    }
}
