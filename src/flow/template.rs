use serde_json::{Map, Value};

use crate::state::ExecutionContext;

/// 模板变量解析
///
/// 将模板表中字符串值里的 `{{key}}` / `{{key.field}}` 占位符替换为
/// 上下文取值的文本形式。纯函数，永不失败：引用的路径不存在时
/// 占位符原样保留。仅支持一层嵌套对象，数组不参与替换。
pub fn resolve_variables(
    template: &Map<String, Value>,
    context: &ExecutionContext,
) -> Map<String, Value> {
    let mut resolved = Map::new();
    for (key, value) in template {
        match value {
            Value::String(text) if text.contains("{{") && text.contains("}}") => {
                resolved.insert(key.clone(), Value::String(substitute(text, context)));
            }
            other => {
                resolved.insert(key.clone(), other.clone());
            }
        }
    }
    resolved
}

// serde_json::Map 底层是 BTreeMap，遍历顺序稳定，替换结果可复现
fn substitute(text: &str, context: &ExecutionContext) -> String {
    let mut text = text.to_string();
    for (ctx_key, ctx_val) in context.values() {
        if let Some(rendered) = scalar_text(ctx_val) {
            text = text.replace(&format!("{{{{{ctx_key}}}}}"), &rendered);
        }
        if let Value::Object(fields) = ctx_val {
            for (sub_key, sub_val) in fields {
                text = text.replace(
                    &format!("{{{{{ctx_key}.{sub_key}}}}}"),
                    &render_value(sub_val),
                );
            }
        }
    }
    text
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn render_value(value: &Value) -> String {
    scalar_text(value).unwrap_or_else(|| value.to_string())
}
