use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use finflow::{FlowRegistry, FlowRunner, LoggingConfig, DEFAULT_FLOW_PATH};

#[derive(Parser)]
#[command(name = "finflow", version, about = "Orchestrate flow engine CLI", author)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 执行指定流程并打印执行结果
    Run {
        #[arg(long)]
        flow: String,
        /// 作为初始上下文的 JSON 对象
        #[arg(long, default_value = "{}")]
        input: String,
        #[arg(long, default_value = DEFAULT_FLOW_PATH)]
        flows: PathBuf,
    },
    /// 列出已加载的流程
    List {
        #[arg(long, default_value = DEFAULT_FLOW_PATH)]
        flows: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { flow, input, flows } => handle_run(flow, input, flows).await?,
        Command::List { flows } => handle_list(flows)?,
    }
    Ok(())
}

async fn handle_run(flow: String, input: String, flows: PathBuf) -> anyhow::Result<()> {
    let input: Value = serde_json::from_str(&input)?;
    let input: Map<String, Value> = input
        .as_object()
        .cloned()
        .ok_or_else(|| anyhow!("--input must be a JSON object"))?;

    let registry = FlowRegistry::load_default(&flows);
    let runner = FlowRunner::new(registry);
    let outcome = runner.execute_flow(&flow, input).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn handle_list(flows: PathBuf) -> anyhow::Result<()> {
    let registry = FlowRegistry::load_default(&flows);
    let mut names = registry.names();
    names.sort();
    if names.is_empty() {
        println!("No flows loaded from `{}`", flows.display());
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}
