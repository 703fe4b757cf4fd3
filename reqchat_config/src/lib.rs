//! 配置管理系统
//!
//! 提供聊天客户端的配置管理，支持 TOML 文件和环境变量覆盖。

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析配置文件失败: {0}")]
    Parse(String),

    /// 验证错误
    #[error("配置验证失败: {0}")]
    Validation(String),

    /// 环境变量错误
    #[error("环境变量解析失败: {0}")]
    EnvVar(String),
}

/// 配置 Result 类型
pub type Result<T> = std::result::Result<T, ConfigError>;

/// 聊天端点路径，会话 ID 追加在其后
pub const CHAT_ENDPOINT_PATH: &str = "/api/requirements/chat";

/// 聊天客户端配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// REST API 基础地址（http/https），WebSocket 地址由此推导
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// 重连基础延迟（毫秒），第 n 次重连等待 n 倍
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,

    /// 最大重连次数
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// 建立连接超时时间（秒）
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ChatConfig {
    /// 使用指定的 API 基础地址创建配置
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..Default::default()
        }
    }

    /// 设置重连基础延迟
    pub fn with_reconnect_base_delay(mut self, delay: Duration) -> Self {
        self.reconnect_base_delay_ms = delay.as_millis() as u64;
        self
    }

    /// 设置最大重连次数
    pub fn with_max_reconnect_attempts(mut self, max: u32) -> Self {
        self.max_reconnect_attempts = max;
        self
    }

    /// 设置连接超时，不足一秒的部分向上取整
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self
    }

    /// 从 TOML 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 从环境变量加载配置并覆盖
    ///
    /// 支持的环境变量：
    /// - REQCHAT_API_BASE: API 基础地址
    /// - REQCHAT_RECONNECT_BASE_DELAY_MS: 重连基础延迟（毫秒）
    /// - REQCHAT_MAX_RECONNECT_ATTEMPTS: 最大重连次数
    /// - REQCHAT_CONNECT_TIMEOUT_SECS: 连接超时（秒）
    pub fn load_with_env_override(self) -> Result<Self> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// 使用给定的查找函数应用覆盖，`lookup` 返回 `None` 表示未设置
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup("REQCHAT_API_BASE") {
            self.api_base = base;
        }

        if let Some(delay) = lookup("REQCHAT_RECONNECT_BASE_DELAY_MS") {
            self.reconnect_base_delay_ms = delay.parse().map_err(|_| {
                ConfigError::EnvVar("REQCHAT_RECONNECT_BASE_DELAY_MS 必须是有效的 u64 数字".to_string())
            })?;
        }

        if let Some(max) = lookup("REQCHAT_MAX_RECONNECT_ATTEMPTS") {
            self.max_reconnect_attempts = max.parse().map_err(|_| {
                ConfigError::EnvVar("REQCHAT_MAX_RECONNECT_ATTEMPTS 必须是有效的 u32 数字".to_string())
            })?;
        }

        if let Some(timeout) = lookup("REQCHAT_CONNECT_TIMEOUT_SECS") {
            self.connect_timeout_secs = timeout.parse().map_err(|_| {
                ConfigError::EnvVar("REQCHAT_CONNECT_TIMEOUT_SECS 必须是有效的 u64 数字".to_string())
            })?;
        }

        Ok(self)
    }

    /// 从文件加载并应用环境变量覆盖
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file(path)?.load_with_env_override()
    }

    /// 验证配置是否有效
    pub fn validate(&self) -> Result<()> {
        self.websocket_base()?;

        if self.reconnect_base_delay_ms == 0 {
            return Err(ConfigError::Validation("重连基础延迟不能为 0".to_string()));
        }

        if self.max_reconnect_attempts > 100 {
            return Err(ConfigError::Validation(
                "最大重连次数过大 (建议 <= 100)".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation("连接超时不能为 0".to_string()));
        }

        Ok(())
    }

    /// 重连基础延迟
    pub fn reconnect_base_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_delay_ms)
    }

    /// 第 `attempt` 次重连前的等待时间（线性退避，从 1 开始计数）
    pub fn reconnect_delay(&self, attempt: u32) -> Duration {
        self.reconnect_base_delay() * attempt
    }

    /// 连接超时
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// 将 API 基础地址转换为 WebSocket 地址（http → ws，https → wss）
    pub fn websocket_base(&self) -> Result<String> {
        let base = self.api_base.trim().trim_end_matches('/');

        let ws = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else if base.starts_with("wss://") || base.starts_with("ws://") {
            base.to_string()
        } else {
            return Err(ConfigError::Validation(format!(
                "API 基础地址必须以 http:// 或 https:// 开头: '{}'",
                self.api_base
            )));
        };

        if ws.ends_with("://") {
            return Err(ConfigError::Validation("API 基础地址缺少主机名".to_string()));
        }

        Ok(ws)
    }

    /// 构造会话聊天端点
    ///
    /// `<ws_base>/api/requirements/chat/<session_id>?token=<token>`
    pub fn chat_endpoint(&self, session_id: &str, token: &str) -> Result<String> {
        let base = self.websocket_base()?;
        Ok(format!("{base}{CHAT_ENDPOINT_PATH}/{session_id}?token={token}"))
    }

    /// 获取配置摘要信息
    pub fn summary(&self) -> String {
        format!(
            "ReqChat 客户端配置:\n  API 地址: {}\n  重连基础延迟: {}ms\n  最大重连次数: {}\n  连接超时: {}s",
            self.api_base,
            self.reconnect_base_delay_ms,
            self.max_reconnect_attempts,
            self.connect_timeout_secs
        )
    }
}

// 默认值函数
fn default_api_base() -> String {
    "http://localhost:8000".to_string()
}

fn default_reconnect_base_delay_ms() -> u64 {
    1000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    10
}
