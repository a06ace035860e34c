use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;

use vigil_cli::pipeline::{build_dispatcher, run_audit, run_check};
use vigil_config::{ConfigLoader, ThresholdStore};
use vigil_report::{render_alerts, render_report, with_header, RunOutcome};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "vigil.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 完整审计：装载、校验、聚合、告警评估、通知、报告
    Audit {
        /// 只打印，不写 test_report.txt / summary.txt / summary.csv
        #[arg(long)]
        no_save: bool,
    },
    /// 仅数据完整性检查
    Check {
        #[arg(long)]
        no_save: bool,
    },
    /// 更新单个指标的警告阈值
    SetThreshold {
        /// cpu / memory / disk
        metric: String,
        /// 新阈值（0-100）
        value: f64,
        /// 外部身份层给出的修改授权
        #[arg(long)]
        authorized: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = ConfigLoader::new(&cli.config).load()?;

    match cli.command {
        Command::Audit { no_save } => {
            let thresholds = ThresholdStore::new(config.thresholds);
            let dispatcher = build_dispatcher(&config);
            let run = run_audit(&config, &thresholds, &dispatcher).await;

            let body = render_report(&run.outcome);
            println!("{}", body);

            if let Some(text) = &run.summary_text {
                println!("\n{}", text);
            }
            if let RunOutcome::Completed { events, .. } = &run.outcome {
                if !events.is_empty() {
                    println!("\n{}", render_alerts(events));
                }
            }
            if let Some(result) = &run.dispatch {
                info!(
                    "Notification dispatch: attempted={} delivered={}",
                    result.attempted, result.delivered
                );
            }

            if !no_save {
                std::fs::write("test_report.txt", with_header(Utc::now(), &body))?;
                if let Some(text) = &run.summary_text {
                    std::fs::write("summary.txt", text)?;
                }
                if let Some(csv) = &run.csv {
                    std::fs::write("summary.csv", csv)?;
                }
                info!("Saved report to test_report.txt");
            }
        }

        Command::Check { no_save } => {
            let outcome = run_check(&config).await;
            let body = render_report(&outcome);
            println!("{}", body);

            if !no_save {
                std::fs::write("test_report.txt", with_header(Utc::now(), &body))?;
                info!("Saved report to test_report.txt");
            }
        }

        Command::SetThreshold {
            metric,
            value,
            authorized,
        } => {
            let store = ThresholdStore::new(config.thresholds);
            let mut updated = config.thresholds;
            match metric.as_str() {
                "cpu" => updated.cpu = value,
                "memory" => updated.memory = value,
                "disk" => updated.disk = value,
                other => anyhow::bail!("unknown metric: {} (expected cpu, memory or disk)", other),
            }

            store.update(authorized, updated).await?;
            let current = store.snapshot().await;
            println!(
                "Thresholds: cpu={} memory={} disk={}",
                current.cpu, current.memory, current.disk
            );
        }
    }

    Ok(())
}
