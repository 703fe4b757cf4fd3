//! # ReqChat - 需求对话流式客户端
//!
//! ReqChat 是 AI 需求分析助手的实时对话客户端。它通过每个会话一条
//! WebSocket 连接接收助手逐字流式输出的回复，并在网络中断后自动重连。
//!
//! ## 特性
//!
//! - 基于 Tokio 的会话驱动任务
//! - JSON 文本帧协议（message / new_chat 与 chunk / complete / error 等事件）
//! - 线性退避重连，固定重连上限
//! - 回调或通道两种事件分发方式
//! - TOML 配置与环境变量覆盖
//!
//! ## 快速开始
//!
//! ```rust,no_run,ignore
//! use reqchat::ChatSession;
//! use reqchat::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> reqchat::Result<()> {
//!     let config = ChatConfig::default().load_with_env_override()?;
//!     let mut session = ChatSession::open(config, "session-1", "token")?;
//!     session.wait_connected().await?;
//!     println!("{}", session.ask("用户可以重置密码").await?);
//!     Ok(())
//! }
//! ```
//!
//! ## 模块组织
//!
//! ### 配置模块
//! - ChatConfig - 客户端配置
//!
//! ### 客户端模块
//! - StreamingSessionClient - 会话连接管理
//! - SessionHandler / Callbacks / ChannelHandler - 事件分发
//! - ChatSession - 基于通道的高层封装

pub mod error;

// Client API
#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "client")]
pub use crate::client::ChatSession;

pub use crate::error::{Error, Result};

// ============================================================================
// Crate Re-exports (for advanced users)
// ============================================================================

pub use reqchat_config;

#[cfg(feature = "client")]
pub use reqchat_client;

// ============================================================================
// Prelude Module
// ============================================================================

/// 预导出常用类型
///
/// 通过 `use reqchat::prelude::*;` 导入所有常用类型
pub mod prelude {
    pub use reqchat_config::{ChatConfig, ConfigError};

    #[cfg(feature = "client")]
    pub use reqchat_client::prelude::*;

    #[cfg(feature = "client")]
    pub use crate::client::ChatSession;
}

// ============================================================================
// Version Information
// ============================================================================

/// ReqChat 版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// ReqChat 包名
pub const NAME: &str = env!("CARGO_PKG_NAME");
