//! 配置加载示例
//!
//! 演示如何从 TOML 文件加载聊天客户端配置并应用环境变量覆盖。

use reqchat_config::ChatConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== ReqChat 配置加载示例 ===\n");

    // 1. 默认配置
    let config = ChatConfig::default().load_with_env_override()?;
    println!("{}\n", config.summary());

    // 2. 从文件加载（如果指定了路径）
    if let Some(path) = std::env::args().nth(1) {
        let config = ChatConfig::from_file_with_env(&path)?;
        config.validate()?;
        println!("从 {} 加载:\n{}\n", path, config.summary());
    }

    // 3. 推导的 WebSocket 端点
    let endpoint = config.chat_endpoint("demo-session", "demo-token")?;
    println!("聊天端点: {}", endpoint);

    for attempt in 1..=config.max_reconnect_attempts {
        println!("  第 {} 次重连延迟: {:?}", attempt, config.reconnect_delay(attempt));
    }

    Ok(())
}
