use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::flow::condition::evaluate_condition;
use crate::flow::registry::FlowRegistry;
use crate::flow::template::resolve_variables;
use crate::flow::types::{StepDefinition, SwitchCase};
use crate::runtime::scripts::ScriptRegistry;
use crate::runtime::types::{ExecutionOutcome, FlowStatus, ResultRecord};
use crate::skills::{MockSkillInvoker, SkillInvoker};
use crate::state::ExecutionContext;

/// 步骤序列的控制信号
///
/// `Paused` 只终止当前序列：switch 分支内的暂停不会中断外层
/// 兄弟步骤，顶层的暂停则结束整次执行。
enum SequenceSignal {
    Completed,
    Paused,
}

/// Orchestrate 流程执行引擎
///
/// 持有只读的流程注册表、脚本注册表和 Skill 调用器，逐步驱动
/// 流程执行。每次调用独立持有上下文与结果日志，并发调用之间
/// 无共享可变状态。
pub struct FlowRunner {
    registry: Arc<FlowRegistry>,
    scripts: Arc<ScriptRegistry>,
    skills: Arc<dyn SkillInvoker>,
}

impl FlowRunner {
    pub fn new(registry: FlowRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            scripts: Arc::new(ScriptRegistry::with_builtins()),
            skills: Arc::new(MockSkillInvoker::new()),
        }
    }

    pub fn with_scripts(mut self, scripts: ScriptRegistry) -> Self {
        self.scripts = Arc::new(scripts);
        self
    }

    pub fn with_skill_invoker(mut self, skills: Arc<dyn SkillInvoker>) -> Self {
        self.skills = skills;
        self
    }

    /// 已加载的流程名称，供列表接口使用
    pub fn flow_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// 执行状态查询占位实现
    ///
    /// 执行状态不做持久化，这里只能返回 unknown。
    pub fn get_flow_status(&self, flow_id: &str) -> Value {
        json!({ "flow_id": flow_id, "status": "unknown" })
    }

    /// 执行指定流程
    ///
    /// 未注册的流程名返回失败结果而非错误；步骤序列中逃逸出的
    /// 任何错误在此兜底，转成一条失败记录，已累积的部分结果和
    /// 上下文仍然返回给调用方。
    pub async fn execute_flow(
        &self,
        flow_name: &str,
        input: Map<String, Value>,
    ) -> ExecutionOutcome {
        let Some(flow) = self.registry.get(flow_name) else {
            warn!(flow = flow_name, "flow not found");
            return ExecutionOutcome {
                flow: flow_name.to_string(),
                status: FlowStatus::Failed,
                results: vec![ResultRecord::flow_error(format!(
                    "Flow {flow_name} not found"
                ))],
                final_context: Map::new(),
            };
        };

        info!(flow = flow_name, "starting flow execution");
        let mut context = ExecutionContext::from_input(input);
        let mut results = Vec::new();

        let status = match self
            .execute_steps(&flow.steps, &mut context, &mut results)
            .await
        {
            Ok(_) => FlowStatus::Completed,
            Err(e) => {
                error!(flow = flow_name, error = %e, "flow execution failed");
                results.push(ResultRecord::flow_error(e.to_string()));
                FlowStatus::Failed
            }
        };

        ExecutionOutcome {
            flow: flow.name.clone(),
            status,
            results,
            final_context: context.into_values(),
        }
    }

    /// 执行一段步骤序列，顶层与 switch 分支共用（递归）
    fn execute_steps<'a>(
        &'a self,
        steps: &'a [StepDefinition],
        context: &'a mut ExecutionContext,
        results: &'a mut Vec<ResultRecord>,
    ) -> BoxFuture<'a, Result<SequenceSignal>> {
        Box::pin(async move {
            for step in steps {
                debug!(step = step.id().unwrap_or("<anonymous>"), "executing step");
                match step {
                    StepDefinition::Skill { skill, input, .. } => {
                        self.execute_skill_step(step, skill, input, context, results)
                            .await;
                    }
                    StepDefinition::Script { script_id, .. } => {
                        self.execute_script_step(step, script_id, context, results);
                    }
                    StepDefinition::Switch { cases, .. } => {
                        self.execute_switch_step(cases, context, results).await?;
                    }
                    StepDefinition::WaitForEvent { event, .. } => {
                        // 同步执行没有真正的等待，记录暂停并停止本序列
                        info!(event, "flow paused waiting for event");
                        results.push(ResultRecord::paused(step.id(), "wait_for_event"));
                        return Ok(SequenceSignal::Paused);
                    }
                }
            }
            Ok(SequenceSignal::Completed)
        })
    }

    /// skill 步骤：解析输入模板、远程调用、结果写回上下文
    ///
    /// 单个 skill 失败只产生一条失败记录，序列继续执行。
    async fn execute_skill_step(
        &self,
        step: &StepDefinition,
        skill: &str,
        input: &Map<String, Value>,
        context: &mut ExecutionContext,
        results: &mut Vec<ResultRecord>,
    ) {
        let resolved = resolve_variables(input, context);

        match self.skills.invoke_skill(skill, &resolved).await {
            Ok(Some(output)) if !output.is_empty() => {
                if let Some(key) = step.output_key() {
                    context.insert(key, Value::Object(output.clone()));
                }
                results.push(ResultRecord::success(step.id(), output));
            }
            Ok(_) => {
                warn!(skill, "skill invocation returned no result");
                results.push(ResultRecord::failed(step.id(), None));
            }
            Err(e) => {
                error!(skill, error = %e, "skill invocation failed");
                results.push(ResultRecord::failed(step.id(), Some(e.to_string())));
            }
        }
    }

    /// script 步骤：按 script_id 精确匹配注册表
    ///
    /// 无匹配处理器按 skipped 记录，不算错误。
    fn execute_script_step(
        &self,
        step: &StepDefinition,
        script_id: &str,
        context: &mut ExecutionContext,
        results: &mut Vec<ResultRecord>,
    ) {
        let Some(handler) = self.scripts.get(script_id) else {
            warn!(script_id, "no handler found for script");
            results.push(ResultRecord::skipped(step.id(), "no_handler"));
            return;
        };

        match handler(context) {
            Ok(output) => {
                if let Some(key) = step.output_key() {
                    context.insert(key, Value::Object(output.clone()));
                }
                results.push(ResultRecord::success(step.id(), output));
            }
            Err(e) => {
                error!(script_id, error = %e, "script execution failed");
                results.push(ResultRecord::failed(step.id(), Some(e.to_string())));
            }
        }
    }

    /// switch 步骤：按声明顺序找首个命中的 case，无命中则空转
    async fn execute_switch_step(
        &self,
        cases: &[SwitchCase],
        context: &mut ExecutionContext,
        results: &mut Vec<ResultRecord>,
    ) -> Result<()> {
        for case in cases {
            if case.condition == "else" || evaluate_condition(&case.condition, context) {
                info!(condition = %case.condition, "switch case matched");
                // 分支内的暂停只影响分支自身的后续动作
                let _ = self.execute_steps(&case.actions, context, results).await?;
                return Ok(());
            }
        }
        debug!("no switch cases matched");
        Ok(())
    }
}
