use serde::Deserialize;
use serde_json::{Map, Value};

/// 流程定义
///
/// 启动时从 JSON 加载，加载后只读。步骤顺序即执行顺序。
#[derive(Debug, Clone, Deserialize)]
pub struct FlowDefinition {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

/// 步骤定义
///
/// `type` 字段区分步骤种类，未知种类在加载时直接报错，
/// 不会被静默跳过。
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDefinition {
    /// 调用外部 Skill，输入支持 `{{var}}` 模板
    Skill {
        #[serde(default)]
        id: Option<String>,
        skill: String,
        #[serde(default)]
        input: Map<String, Value>,
        #[serde(default)]
        output: Option<String>,
    },
    /// 本地脚本处理器，按 `script_id` 精确匹配注册表
    Script {
        #[serde(default)]
        id: Option<String>,
        script_id: String,
        #[serde(default)]
        output: Option<String>,
    },
    /// 条件分支，首个命中的 case 生效
    Switch {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        cases: Vec<SwitchCase>,
    },
    /// 等待外部事件；同步执行下只能暂停当前序列
    WaitForEvent {
        #[serde(default)]
        id: Option<String>,
        event: String,
    },
}

impl StepDefinition {
    pub fn id(&self) -> Option<&str> {
        match self {
            StepDefinition::Skill { id, .. }
            | StepDefinition::Script { id, .. }
            | StepDefinition::Switch { id, .. }
            | StepDefinition::WaitForEvent { id, .. } => id.as_deref(),
        }
    }

    /// 步骤输出写入上下文时使用的键：优先 `output`，缺省回退到 `id`
    pub fn output_key(&self) -> Option<&str> {
        match self {
            StepDefinition::Skill { id, output, .. }
            | StepDefinition::Script { id, output, .. } => {
                output.as_deref().or(id.as_deref())
            }
            _ => None,
        }
    }
}

/// Switch 分支
///
/// `condition` 为受限条件表达式，字面量 `"else"` 表示兜底分支。
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchCase {
    pub condition: String,
    #[serde(default)]
    pub actions: Vec<StepDefinition>,
}
