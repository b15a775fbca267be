use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::{FinFlowError, Result};
use crate::flow::registry::FlowRegistry;
use crate::flow::types::FlowDefinition;

/// 从 JSON Value 加载流程定义
pub fn load_flow_from_value(value: &Value) -> Result<FlowDefinition> {
    serde_json::from_value(value.clone())
        .map_err(|e| FinFlowError::Definition(e.to_string()))
}

/// 从 JSON 字符串加载流程定义
pub fn load_flow_from_str(content: &str) -> Result<FlowDefinition> {
    serde_json::from_str(content).map_err(|e| FinFlowError::Definition(e.to_string()))
}

/// 从文件加载流程定义
pub fn load_flow_from_file(path: impl AsRef<Path>) -> Result<FlowDefinition> {
    let content = fs::read_to_string(path.as_ref())
        .map_err(|e| FinFlowError::Definition(format!("{}: {e}", path.as_ref().display())))?;
    load_flow_from_str(&content)
}

impl FlowRegistry {
    /// 启动时的默认加载路径
    ///
    /// 定义文件缺失只告警，解析失败只记录错误，
    /// 两种情况都以空注册表继续运行，不中断进程。
    pub fn load_default(path: impl AsRef<Path>) -> Self {
        let mut registry = FlowRegistry::new();
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "flow definition not found, starting with empty registry");
            return registry;
        }
        match load_flow_from_file(path) {
            Ok(flow) => {
                info!(flow = %flow.name, "loaded flow");
                registry.register(flow);
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load flow definition");
            }
        }
        registry
    }
}
