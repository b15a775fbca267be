use std::collections::HashMap;

use crate::flow::types::FlowDefinition;

/// Flow 注册表
///
/// 名称到流程定义的映射，精确匹配、区分大小写。
/// 启动加载完成后视为只读。
#[derive(Default)]
pub struct FlowRegistry {
    flows: HashMap<String, FlowDefinition>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self {
            flows: HashMap::new(),
        }
    }

    pub fn register(&mut self, flow: FlowDefinition) {
        self.flows.insert(flow.name.clone(), flow);
    }

    pub fn get(&self, name: &str) -> Option<&FlowDefinition> {
        self.flows.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.flows.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
