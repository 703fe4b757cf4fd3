//! 命令行对话示例
//!
//! 连接到需求对话端点，从标准输入读取消息并流式打印助手回复。
//!
//! 用法：
//!   REQCHAT_API_BASE=https://api.example.com \
//!   cargo run --example chat_cli -- <session_id> <token> [config.toml]
//!
//! 输入 `/new` 开始新对话，`/quit` 退出。

use reqchat::prelude::*;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(session_id), Some(token)) = (args.next(), args.next()) else {
        eprintln!("用法: chat_cli <session_id> <token> [config.toml]");
        std::process::exit(2);
    };

    let config = match args.next() {
        Some(path) => ChatConfig::from_file_with_env(path)?,
        None => ChatConfig::default().load_with_env_override()?,
    };
    println!("{}\n", config.summary());

    let mut session = ChatSession::open(config, session_id, token)?;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut printed = 0;

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "" => {}
                    "/quit" => break,
                    "/new" => {
                        if !session.new_chat(None) {
                            eprintln!("*** 未连接，无法开始新对话");
                        }
                    }
                    text => {
                        if let Err(e) = session.client().send_message(text) {
                            eprintln!("*** 发送失败: {}", e);
                        }
                    }
                }
            }
            event = session.next_event() => {
                let Some(event) = event else { break };
                match event {
                    ClientEvent::Connected => eprintln!("*** 已连接"),
                    ClientEvent::Disconnected => {
                        match session.client().state() {
                            ClientState::Reconnecting => eprintln!(
                                "*** 连接断开，正在重连 (第 {} 次)",
                                session.client().reconnect_attempts()
                            ),
                            _ => eprintln!("*** 连接已关闭"),
                        }
                    }
                    ClientEvent::Error { error } => eprintln!("*** 错误: {}", error),
                    ClientEvent::Message { event, buffer } => match event {
                        InboundEvent::Chunk { .. } => {
                            print!("{}", &buffer[printed.min(buffer.len())..]);
                            std::io::stdout().flush()?;
                            printed = buffer.len();
                        }
                        InboundEvent::Complete { .. } => {
                            println!();
                            printed = 0;
                        }
                        InboundEvent::Error { content, .. } => {
                            eprintln!("\n*** 助手错误: {}", content);
                            printed = 0;
                        }
                        InboundEvent::ChatCleared { .. } => {
                            eprintln!("*** 对话已清空");
                            printed = 0;
                        }
                        InboundEvent::Connected { .. } => {}
                    },
                }
            }
        }
    }

    session.close();
    Ok(())
}
