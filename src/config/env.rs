use std::env;

use anyhow::anyhow;

use crate::error::{FinFlowError, Result};

/// 环境变量配置管理
pub struct EnvConfig;

impl EnvConfig {
    /// 从环境变量获取值，缺失时报错
    pub fn get_env(key: &str) -> Result<String> {
        env::var(key).map_err(|_| {
            FinFlowError::Other(anyhow!("environment variable `{key}` is not set"))
        })
    }

    /// 获取可选的环境变量
    pub fn get_env_optional(key: &str) -> Option<String> {
        env::var(key).ok()
    }

    /// 获取布尔开关，未设置时为 false
    pub fn get_env_flag(key: &str) -> bool {
        env::var(key)
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// 检查是否启用调试模式
    pub fn is_debug_mode() -> bool {
        env::var("FINFLOW_DEBUG").is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_flag() {
        env::set_var("FINFLOW_TEST_FLAG", "True");
        assert!(EnvConfig::get_env_flag("FINFLOW_TEST_FLAG"));

        env::set_var("FINFLOW_TEST_FLAG", "0");
        assert!(!EnvConfig::get_env_flag("FINFLOW_TEST_FLAG"));

        env::remove_var("FINFLOW_TEST_FLAG");
        assert!(!EnvConfig::get_env_flag("FINFLOW_TEST_FLAG"));
    }

    #[test]
    fn test_get_env_missing() {
        env::remove_var("FINFLOW_TEST_MISSING");
        assert!(EnvConfig::get_env("FINFLOW_TEST_MISSING").is_err());
        assert!(EnvConfig::get_env_optional("FINFLOW_TEST_MISSING").is_none());
    }
}
