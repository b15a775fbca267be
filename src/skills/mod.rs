#[cfg(feature = "orchestrate-client")]
pub mod orchestrate;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::Result;

/// Skill 调用能力
///
/// 引擎把远端技能调用收敛到这个窄接口：`Ok(Some)` 为结果表，
/// `Ok(None)` 表示技能侧失败。重试、熔断、超时都属于实现方，
/// 引擎本身不做。
#[async_trait]
pub trait SkillInvoker: Send + Sync {
    async fn invoke_skill(&self, name: &str, input: &Map<String, Value>)
        -> Result<Option<Map<String, Value>>>;

    async fn list_skills(&self) -> Vec<String>;
}

/// 未配置远端时的兜底实现：原样回显输入
#[derive(Default, Clone)]
pub struct MockSkillInvoker;

impl MockSkillInvoker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SkillInvoker for MockSkillInvoker {
    async fn invoke_skill(
        &self,
        name: &str,
        input: &Map<String, Value>,
    ) -> Result<Option<Map<String, Value>>> {
        debug!(skill = name, "skill invoker not connected, returning mock response");
        let mut result = Map::new();
        result.insert("skill".into(), json!(name));
        result.insert("status".into(), json!("mock_success"));
        result.insert("result".into(), Value::Object(input.clone()));
        Ok(Some(result))
    }

    async fn list_skills(&self) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_invoker_echoes_input() -> anyhow::Result<()> {
        let invoker = MockSkillInvoker::new();
        let mut input = Map::new();
        input.insert("invoice_id".into(), json!("INV-1"));

        let result = invoker
            .invoke_skill("score-risk", &input)
            .await?
            .expect("mock invoker always answers");
        assert_eq!(result["skill"], json!("score-risk"));
        assert_eq!(result["status"], json!("mock_success"));
        assert_eq!(result["result"]["invoice_id"], json!("INV-1"));
        Ok(())
    }
}
