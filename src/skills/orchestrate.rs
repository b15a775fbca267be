use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde_json::{Map, Value};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::error::Result;

use super::{MockSkillInvoker, SkillInvoker};

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone)]
struct Credentials {
    api_key: String,
    url: String,
    project_id: String,
}

/// watsonx Orchestrate Skill 客户端
///
/// 未连接时退回 mock 响应，与引擎解耦：连接与否只影响
/// 结果来源，不影响流程语义。传输层错误按固定间隔重试。
pub struct OrchestrateSkills {
    client: Client,
    credentials: RwLock<Option<Credentials>>,
}

impl Default for OrchestrateSkills {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestrateSkills {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            credentials: RwLock::new(None),
        }
    }

    /// 按配置初始化连接；凭据不全时保持未连接状态
    pub fn connect(&self, config: &EngineConfig) -> bool {
        if !config.enable_orchestrate {
            info!("Orchestrate disabled");
            return false;
        }
        let (Some(api_key), Some(url), Some(project_id)) = (
            config.orchestrate_api_key.clone(),
            config.orchestrate_url.clone(),
            config.orchestrate_project_id.clone(),
        ) else {
            warn!("Orchestrate credentials not configured");
            return false;
        };

        let url = url.trim_end_matches('/').to_string();
        *self.credentials.write() = Some(Credentials {
            api_key,
            url,
            project_id,
        });
        info!("Initialized Orchestrate client");
        true
    }

    pub fn is_connected(&self) -> bool {
        self.credentials.read().is_some()
    }

    fn credentials(&self) -> Option<Credentials> {
        self.credentials.read().clone()
    }

    async fn post_with_retry(
        &self,
        credentials: &Credentials,
        skill_name: &str,
        input: &Map<String, Value>,
    ) -> Option<Value> {
        let endpoint = format!("{}/v1/skills/{}/invoke", credentials.url, skill_name);

        for attempt in 1..=MAX_ATTEMPTS {
            let response = self
                .client
                .post(&endpoint)
                .bearer_auth(&credentials.api_key)
                .header("X-Project-ID", &credentials.project_id)
                .json(input)
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    return response.json().await.ok();
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    error!(skill = skill_name, %status, body, "skill invocation failed");
                    return None;
                }
                Err(e) if attempt < MAX_ATTEMPTS => {
                    warn!(skill = skill_name, attempt, error = %e, "skill request error, retrying");
                    sleep(RETRY_DELAY).await;
                }
                Err(e) => {
                    error!(skill = skill_name, error = %e, "skill request error, giving up");
                    return None;
                }
            }
        }
        None
    }
}

#[async_trait]
impl SkillInvoker for OrchestrateSkills {
    async fn invoke_skill(
        &self,
        name: &str,
        input: &Map<String, Value>,
    ) -> Result<Option<Map<String, Value>>> {
        let Some(credentials) = self.credentials() else {
            warn!(skill = name, "Orchestrate not connected, returning mock response");
            return MockSkillInvoker::new().invoke_skill(name, input).await;
        };

        info!(skill = name, "invoking Orchestrate skill");
        let payload = self.post_with_retry(&credentials, name, input).await;
        match payload {
            Some(Value::Object(result)) => Ok(Some(result)),
            Some(other) => {
                warn!(skill = name, payload = %other, "skill returned non-object payload");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn list_skills(&self) -> Vec<String> {
        let Some(credentials) = self.credentials() else {
            return Vec::new();
        };

        let endpoint = format!("{}/v1/skills", credentials.url);
        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(&credentials.api_key)
            .header("X-Project-ID", &credentials.project_id)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => response
                .json::<Value>()
                .await
                .ok()
                .and_then(|payload| payload.get("skills").and_then(Value::as_array).cloned())
                .map(|skills| {
                    skills
                        .iter()
                        .filter_map(|skill| skill.get("name").and_then(Value::as_str))
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            Ok(response) => {
                error!(status = %response.status(), "failed to list skills");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "failed to list skills");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enable: bool, with_credentials: bool) -> EngineConfig {
        EngineConfig {
            enable_orchestrate: enable,
            orchestrate_api_key: with_credentials.then(|| "test-key".into()),
            orchestrate_url: with_credentials.then(|| "https://orchestrate.example.com/".into()),
            orchestrate_project_id: with_credentials.then(|| "proj-123".into()),
            flow_path: "flows/invoice_processing_flow.json".into(),
        }
    }

    #[test]
    fn test_connect_requires_enable_flag_and_credentials() {
        let skills = OrchestrateSkills::new();
        assert!(!skills.connect(&config(false, true)));
        assert!(!skills.is_connected());

        assert!(!skills.connect(&config(true, false)));
        assert!(!skills.is_connected());

        assert!(skills.connect(&config(true, true)));
        assert!(skills.is_connected());
        // 尾部斜杠在连接时被去掉
        let credentials = skills.credentials().unwrap();
        assert_eq!(credentials.url, "https://orchestrate.example.com");
    }

    #[tokio::test]
    async fn test_not_connected_falls_back_to_mock() -> anyhow::Result<()> {
        let skills = OrchestrateSkills::new();
        let result = skills
            .invoke_skill("score-risk", &Map::new())
            .await?
            .expect("mock fallback always answers");
        assert_eq!(result["status"], serde_json::json!("mock_success"));
        assert!(skills.list_skills().await.is_empty());
        Ok(())
    }
}
