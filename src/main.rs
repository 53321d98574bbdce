//! CabSwale Sahayak 命令行入口
//!
//! 初始化日志、加载配置、组装对话，然后按行读取标准输入，每行跑一轮。

use anyhow::Context;
use cab_sahayak::{config::load_config, observability, Conversation, Reply};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;
    let mut conversation = Conversation::from_config(&cfg).context("Failed to create agent")?;

    println!("{}: {}", cfg.app.name, conversation.greeting());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match conversation.handle(input).await {
            Reply::Say(text) => println!("{}: {}", cfg.app.name, text),
            Reply::Quit(text) => {
                println!("{}: {}", cfg.app.name, text);
                break;
            }
        }
    }

    Ok(())
}
