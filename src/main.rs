//! FoodMood - 命令行前端
//!
//! 入口：加载配置、初始化日志、创建编排器；从标准输入读取命令，并把每次状态变化渲染到终端。
//!
//! 命令：
//! - `<mood>`：使用 [location] 配置的坐标提交查询
//! - `<mood> <lat> <lon> [vegan,gluten-free]`：显式坐标（与可选饮食限制）
//! - `retry` / `clear` / `moods` / `help` / `quit`

use std::path::PathBuf;

use anyhow::Context;
use foodmood::config::{load_config, AppConfig};
use foodmood::core::{create_app, Command, LifecycleState};
use foodmood::observability;
use foodmood::query::{Mood, RawQuery};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let (cfg, load_error) = match load_config(config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // 日志：默认取配置中的级别，可通过 RUST_LOG 覆盖
    observability::init(&cfg.app.log_level);
    if let Some(e) = load_error {
        tracing::warn!("Config load failed ({}), using defaults", e);
    }

    let (cmd_tx, mut reader, handle) =
        create_app(&cfg).context("Failed to create recommendation client")?;

    let render_task = tokio::spawn(async move {
        while let Some(state) = reader.changed().await {
            render(&state);
        }
    });

    print_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(cmd)) => {
                        let quit = matches!(cmd, Command::Quit);
                        if cmd_tx.send(cmd).is_err() || quit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(msg) => println!("{msg}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    let _ = cmd_tx.send(Command::Quit);
    handle.await.context("Command loop failed")?;
    render_task.abort();
    Ok(())
}

/// 解析一行输入；Ok(None) 表示无需发送命令
fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [] => Ok(None),
        ["help"] => {
            print_help();
            Ok(None)
        }
        ["moods"] => {
            let labels: Vec<&str> = Mood::ALL.iter().map(Mood::label).collect();
            println!("Moods: {}", labels.join(", "));
            Ok(None)
        }
        ["quit"] | ["exit"] => Ok(Some(Command::Quit)),
        ["retry"] => Ok(Some(Command::Retry)),
        ["clear"] => Ok(Some(Command::Clear)),
        [mood] => Ok(Some(Command::SelectMood(mood.to_string()))),
        [mood, lat, lon, rest @ ..] if rest.len() <= 1 => {
            let latitude = lat
                .parse::<f64>()
                .map_err(|_| format!("Invalid latitude: {lat}"))?;
            let longitude = lon
                .parse::<f64>()
                .map_err(|_| format!("Invalid longitude: {lon}"))?;
            let restrictions = rest
                .first()
                .map(|r| r.split(',').collect::<Vec<_>>())
                .unwrap_or_default();
            Ok(Some(Command::Submit(
                RawQuery::new(latitude, longitude, *mood).with_dietary_restrictions(restrictions),
            )))
        }
        _ => Err("Unrecognized input, type 'help' for usage".to_string()),
    }
}

fn render(state: &LifecycleState) {
    match state {
        LifecycleState::Idle => println!("Pick a mood to get food recommendations."),
        LifecycleState::Loading { query } => println!("Finding food for {query} ..."),
        LifecycleState::Success { items, .. } if items.is_empty() => {
            println!("No recommendations found.")
        }
        LifecycleState::Success { items, .. } => {
            println!("Your recommendations:");
            for (i, item) in items.iter().enumerate() {
                println!("  {}. {} - {}", i + 1, item.name, item.description);
            }
        }
        LifecycleState::Failed { error, .. } => {
            println!("Error: {} (type 'retry' to try again)", error.user_message())
        }
    }
}

fn print_help() {
    println!("How are you feeling today?");
    println!("  <mood>                          use the configured location");
    println!("  <mood> <lat> <lon> [a,b]        explicit coordinates and dietary restrictions");
    println!("  retry | clear | moods | help | quit");
}
