use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::Result;
use crate::state::ExecutionContext;

/// 脚本处理器：对上下文做一段本地计算，返回结果表
pub type ScriptHandler = Arc<dyn Fn(&ExecutionContext) -> Result<Map<String, Value>> + Send + Sync>;

/// 脚本处理器注册表
///
/// 按 `script_id` 精确匹配。新增处理器通过 `register` 注册，
/// 不改派发逻辑。
#[derive(Default, Clone)]
pub struct ScriptRegistry {
    handlers: HashMap<String, ScriptHandler>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// 带内置处理器（发票校验、自动审批）的注册表
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("validate_invoice", |ctx| Ok(script_validate_invoice(ctx)));
        registry.register("auto_approve", |ctx| Ok(script_auto_approve(ctx)));
        registry
    }

    pub fn register<F>(&mut self, script_id: impl Into<String>, handler: F)
    where
        F: Fn(&ExecutionContext) -> Result<Map<String, Value>> + Send + Sync + 'static,
    {
        self.handlers.insert(script_id.into(), Arc::new(handler));
    }

    pub fn get(&self, script_id: &str) -> Option<ScriptHandler> {
        self.handlers.get(script_id).map(Arc::clone)
    }
}

/// 发票字段校验：total 为正且 vendor 非空
fn script_validate_invoice(ctx: &ExecutionContext) -> Map<String, Value> {
    let invoice = ctx.get("invoice").and_then(Value::as_object);
    let total = invoice
        .and_then(|inv| inv.get("total"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let has_vendor = invoice
        .and_then(|inv| inv.get("vendor"))
        .and_then(Value::as_str)
        .is_some_and(|vendor| !vendor.is_empty());

    let mut result = Map::new();
    if total > 0.0 && has_vendor {
        result.insert("ok".into(), json!(true));
        result.insert("message".into(), json!("Valid"));
    } else {
        result.insert("ok".into(), json!(false));
        result.insert("message".into(), json!("Missing required fields"));
    }
    result
}

/// 自动审批：无附加业务规则，仅记录被审批的发票
fn script_auto_approve(ctx: &ExecutionContext) -> Map<String, Value> {
    let invoice_id = ctx
        .get("invoice")
        .and_then(Value::as_object)
        .and_then(|inv| inv.get("invoice_id"))
        .and_then(Value::as_str)
        .unwrap_or("<unknown>");
    info!(invoice_id, "auto-approving invoice");

    let mut result = Map::new();
    result.insert("approved".into(), json!(true));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(value: Value) -> ExecutionContext {
        ExecutionContext::from_input(value.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_validate_invoice_ok() {
        let ctx = context(json!({"invoice": {"total": 100, "vendor": "Acme"}}));
        let result = script_validate_invoice(&ctx);
        assert_eq!(result["ok"], json!(true));
        assert_eq!(result["message"], json!("Valid"));
    }

    #[test]
    fn test_validate_invoice_missing_fields() {
        let ctx = context(json!({"invoice": {"total": 0}}));
        let result = script_validate_invoice(&ctx);
        assert_eq!(result["ok"], json!(false));
        assert_eq!(result["message"], json!("Missing required fields"));

        // 完全没有 invoice 键也只是校验不通过
        let ctx = context(json!({}));
        assert_eq!(script_validate_invoice(&ctx)["ok"], json!(false));
    }

    #[test]
    fn test_auto_approve() {
        let ctx = context(json!({"invoice": {"invoice_id": "INV-7"}}));
        let result = script_auto_approve(&ctx);
        assert_eq!(result["approved"], json!(true));
    }

    #[test]
    fn test_registry_exact_lookup() {
        let registry = ScriptRegistry::with_builtins();
        assert!(registry.get("validate_invoice").is_some());
        assert!(registry.get("auto_approve").is_some());
        // 精确匹配：前缀或包含关系不命中
        assert!(registry.get("validate").is_none());
        assert!(registry.get("run validate_invoice now").is_none());
    }
}
