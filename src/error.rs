//! 错误类型定义
//!
//! 汇总各子 crate 的错误类型。

/// ReqChat 统一错误枚举
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 客户端错误
    #[cfg(feature = "client")]
    #[error(transparent)]
    Client(#[from] reqchat_client::ClientError),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] reqchat_config::ConfigError),

    /// 服务端返回的 `error` 事件
    #[error("助手回复失败: {0}")]
    Reply(String),

    /// 连接已关闭且不会再重连
    #[error("会话已关闭")]
    SessionClosed,
}

/// ReqChat 的 Result 类型别名
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Reply("rate limited".to_string());
        assert_eq!(err.to_string(), "助手回复失败: rate limited");
    }

    #[test]
    fn test_error_from_config() {
        let config_err = reqchat_config::ConfigError::Validation("bad".to_string());
        let err: Error = config_err.into();
        assert!(matches!(err, Error::Config(_)));
    }
}
