use serde_json::Value;
use tracing::warn;

use crate::state::ExecutionContext;

/// 受限条件表达式求值
///
/// 语法只覆盖流程定义实际用到的形态：已注册路径或字面量之间的
/// 比较，用 `&&`/`||`（或 `and`/`or`）连接。手写词法和递归下降
/// 求值，不依赖任何通用表达式引擎，条件文本不会被当作代码执行。
///
/// 可识别的路径只有两个：
/// - `risk.score`：缺失时回退 `risk.result.score`，再缺失取 0.5
/// - `validation.ok`：布尔值
///
/// 任何解析或求值失败都降级为 `false` 并告警，绝不向上抛错。
/// 求值不短路：表达式里任一子句失败（比如未注册的路径），
/// 整个条件即判为 `false`，无论其余子句的真值。
pub fn evaluate_condition(condition: &str, context: &ExecutionContext) -> bool {
    match eval(condition, context) {
        Ok(value) => value,
        Err(reason) => {
            warn!(condition, reason, "condition evaluation failed, defaulting to false");
            false
        }
    }
}

type EvalResult<T> = std::result::Result<T, String>;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Bool(bool),
    Path(String),
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operand {
    Num(f64),
    Bool(bool),
}

fn eval(condition: &str, context: &ExecutionContext) -> EvalResult<bool> {
    let tokens = tokenize(condition)?;
    if tokens.is_empty() {
        return Err("empty condition".into());
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        context,
    };
    let value = parser.or_expr()?;
    if parser.pos != tokens.len() {
        return Err(format!("unexpected trailing token at position {}", parser.pos));
    }
    Ok(value)
}

fn tokenize(input: &str) -> EvalResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '&' => {
                chars.next();
                match chars.next() {
                    Some('&') => tokens.push(Token::And),
                    _ => return Err("expected `&&`".into()),
                }
            }
            '|' => {
                chars.next();
                match chars.next() {
                    Some('|') => tokens.push(Token::Or),
                    _ => return Err("expected `||`".into()),
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '=' => {
                chars.next();
                match chars.next() {
                    Some('=') => tokens.push(Token::Eq),
                    _ => return Err("expected `==`".into()),
                }
            }
            '!' => {
                chars.next();
                match chars.next() {
                    Some('=') => tokens.push(Token::Ne),
                    _ => return Err("expected `!=`".into()),
                }
            }
            '-' => {
                chars.next();
                let mut literal = String::from("-");
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number `{literal}`"))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_ascii_digit() => {
                let mut literal = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number `{literal}`"))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match ident.as_str() {
                    "true" => tokens.push(Token::Bool(true)),
                    "false" => tokens.push(Token::Bool(false)),
                    "and" => tokens.push(Token::And),
                    "or" => tokens.push(Token::Or),
                    _ => tokens.push(Token::Path(ident)),
                }
            }
            other => return Err(format!("unexpected character `{other}`")),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    context: &'a ExecutionContext,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // and 比 or 结合更紧
    fn or_expr(&mut self) -> EvalResult<bool> {
        let mut value = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let rhs = self.and_expr()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and_expr(&mut self) -> EvalResult<bool> {
        let mut value = self.comparison()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let rhs = self.comparison()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn comparison(&mut self) -> EvalResult<bool> {
        let lhs = self.operand()?;
        let op = match self.peek() {
            Some(
                token @ (Token::Lt | Token::Le | Token::Gt | Token::Ge | Token::Eq | Token::Ne),
            ) => token.clone(),
            _ => {
                // 无比较符时裸布尔即子句结果
                return match lhs {
                    Operand::Bool(value) => Ok(value),
                    Operand::Num(_) => Err("bare numeric operand".into()),
                };
            }
        };
        self.advance();
        let rhs = self.operand()?;
        compare(lhs, &op, rhs)
    }

    fn operand(&mut self) -> EvalResult<Operand> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Operand::Num(n)),
            Some(Token::Bool(b)) => Ok(Operand::Bool(b)),
            Some(Token::Path(path)) => resolve_path(&path, self.context),
            other => Err(format!("expected operand, found {other:?}")),
        }
    }
}

fn compare(lhs: Operand, op: &Token, rhs: Operand) -> EvalResult<bool> {
    match (lhs, rhs) {
        (Operand::Num(a), Operand::Num(b)) => Ok(match op {
            Token::Lt => a < b,
            Token::Le => a <= b,
            Token::Gt => a > b,
            Token::Ge => a >= b,
            Token::Eq => a == b,
            Token::Ne => a != b,
            _ => unreachable!(),
        }),
        (Operand::Bool(a), Operand::Bool(b)) => match op {
            Token::Eq => Ok(a == b),
            Token::Ne => Ok(a != b),
            _ => Err("ordering comparison on booleans".into()),
        },
        _ => Err("type mismatch in comparison".into()),
    }
}

// 有意只识别这两个路径；其余点分路径一律判失败降级为 false。
// 扩展识别集前先确认流程定义确实需要。
fn resolve_path(path: &str, context: &ExecutionContext) -> EvalResult<Operand> {
    match path {
        "risk.score" => {
            let score = context
                .get_path("risk.score")
                .and_then(Value::as_f64)
                .or_else(|| context.get_path("risk.result.score").and_then(Value::as_f64))
                .unwrap_or(0.5);
            Ok(Operand::Num(score))
        }
        "validation.ok" => context
            .get_path("validation.ok")
            .and_then(Value::as_bool)
            .map(Operand::Bool)
            .ok_or_else(|| "validation.ok missing or not a boolean".into()),
        other => Err(format!("unrecognized path `{other}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: serde_json::Value) -> ExecutionContext {
        ExecutionContext::from_input(value.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_combined_condition() {
        let ctx = context(json!({"risk": {"score": 0.1}, "validation": {"ok": true}}));
        assert!(evaluate_condition(
            "risk.score < 0.3 && validation.ok == true",
            &ctx
        ));

        let ctx = context(json!({"risk": {"score": 0.8}, "validation": {"ok": true}}));
        assert!(!evaluate_condition(
            "risk.score < 0.3 && validation.ok == true",
            &ctx
        ));
    }

    #[test]
    fn test_risk_score_fallback_chain() {
        let ctx = context(json!({"risk": {"result": {"score": 0.2}}}));
        assert!(evaluate_condition("risk.score < 0.3", &ctx));

        // 两条路径都缺失时取默认值 0.5
        let ctx = context(json!({}));
        assert!(evaluate_condition("risk.score == 0.5", &ctx));
        assert!(!evaluate_condition("risk.score < 0.3", &ctx));
    }

    #[test]
    fn test_word_operators() {
        let ctx = context(json!({"risk": {"score": 0.1}, "validation": {"ok": false}}));
        assert!(evaluate_condition(
            "risk.score < 0.3 or validation.ok == true",
            &ctx
        ));
        assert!(!evaluate_condition(
            "risk.score < 0.3 and validation.ok == true",
            &ctx
        ));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let ctx = context(json!({"risk": {"score": 0.1}, "validation": {"ok": true}}));
        // (false && ...) || true
        assert!(evaluate_condition(
            "validation.ok == false && risk.score > 0.9 || validation.ok == true",
            &ctx
        ));
    }

    #[test]
    fn test_bare_boolean_clause() {
        let ctx = context(json!({"validation": {"ok": true}}));
        assert!(evaluate_condition("validation.ok", &ctx));
        assert!(evaluate_condition("validation.ok != false", &ctx));
    }

    #[test]
    fn test_negative_number_literals() {
        let ctx = context(json!({"risk": {"score": 0.1}}));
        assert!(evaluate_condition("risk.score > -1", &ctx));
        assert!(evaluate_condition("risk.score >= -0.5", &ctx));
        assert!(!evaluate_condition("risk.score < -1", &ctx));
        // 孤立的负号不是合法数字
        assert!(!evaluate_condition("risk.score > -", &ctx));
    }

    #[test]
    fn test_failing_clause_poisons_whole_expression() {
        // 求值不短路：未注册路径出现在任何子句都使整个条件为 false，
        // 即使另一侧子句本身为真
        let ctx = context(json!({"risk": {"score": 0.1}}));
        assert!(evaluate_condition("risk.score < 0.9", &ctx));
        assert!(!evaluate_condition("risk.score < 0.9 || bogus.path == 1", &ctx));
        assert!(!evaluate_condition("bogus.path == 1 || risk.score < 0.9", &ctx));
    }

    #[test]
    fn test_failures_degrade_to_false() {
        let ctx = context(json!({"invoice": {"total": 10}}));
        // 未注册的路径
        assert!(!evaluate_condition("invoice.total > 0", &ctx));
        // 畸形表达式
        assert!(!evaluate_condition("risk.score <", &ctx));
        assert!(!evaluate_condition("risk.score < 0.3 &", &ctx));
        assert!(!evaluate_condition("", &ctx));
        // validation.ok 缺失
        assert!(!evaluate_condition("validation.ok == true", &ctx));
        // 类型不匹配
        assert!(!evaluate_condition("risk.score == true", &ctx));
    }
}
