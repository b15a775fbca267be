use serde::Serialize;
use serde_json::{Map, Value};

/// 单个步骤的执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Success,
    Failed,
    Skipped,
    Paused,
}

/// 每执行一个步骤追加一条结果记录，追加后只读
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ResultRecord {
    pub fn success(step: Option<&str>, output: Map<String, Value>) -> Self {
        Self {
            step: step.map(Into::into),
            status: StepStatus::Success,
            output: Some(output),
            error: None,
            reason: None,
        }
    }

    pub fn failed(step: Option<&str>, error: Option<String>) -> Self {
        Self {
            step: step.map(Into::into),
            status: StepStatus::Failed,
            output: None,
            error,
            reason: None,
        }
    }

    pub fn skipped(step: Option<&str>, reason: &str) -> Self {
        Self {
            step: step.map(Into::into),
            status: StepStatus::Skipped,
            output: None,
            error: None,
            reason: Some(reason.into()),
        }
    }

    pub fn paused(step: Option<&str>, reason: &str) -> Self {
        Self {
            step: step.map(Into::into),
            status: StepStatus::Paused,
            output: None,
            error: None,
            reason: Some(reason.into()),
        }
    }

    /// 流程级失败记录（未绑定到具体步骤）
    pub fn flow_error(error: impl Into<String>) -> Self {
        Self {
            step: None,
            status: StepStatus::Failed,
            output: None,
            error: Some(error.into()),
            reason: None,
        }
    }
}

/// 整个流程执行的终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
    Completed,
    Failed,
}

/// 一次 `execute_flow` 调用的完整结果
///
/// 即使中途失败，已累积的结果与上下文也原样返回，
/// 调用方拿到的是尽力而为的执行轨迹。
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub flow: String,
    pub status: FlowStatus,
    pub results: Vec<ResultRecord>,
    pub final_context: Map<String, Value>,
}
