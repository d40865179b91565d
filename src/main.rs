use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use slog::{error, info, o, Drain, Logger};

use drover::config::Config;
use drover::context::Context;
use drover::deployers::{Deployer, Subscription};
use drover::hub::HttpHub;
use drover::suites::{run_suites, BasicSuite, PrecheckSuite, TestSuite};

#[derive(Parser, Debug)]
#[command(name = "drover")]
#[command(about = "DR action orchestration driver for hub-managed workloads", long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override the poll deadline in seconds
    #[arg(long)]
    timeout: Option<i64>,

    /// Override the poll interval in seconds
    #[arg(long)]
    interval: Option<i64>,
}

fn root_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    Logger::root(drain, o!())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let log = root_logger();

    let mut config = Config::from_file(&args.config)?;
    config.apply_env_overrides()?;
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }
    if let Some(interval) = args.interval {
        config.interval = interval;
    }
    config.validate()?;

    info!(log, "configuration loaded";
        "hub" => &config.hub.url,
        "clusters" => format!("{:?}", config.clusters),
        "timeout" => config.timeout,
        "interval" => config.interval,
    );

    let hub = Arc::new(HttpHub::new(
        &config.hub.url,
        config.hub.token.clone(),
        log.new(o!("component" => "hub")),
    ));
    let ctx = Context::new(log.clone(), config, hub);

    let deployer: Arc<dyn Deployer> = Arc::new(Subscription::new(Arc::clone(&ctx)));
    let suites: Vec<Arc<dyn TestSuite>> = vec![
        Arc::new(PrecheckSuite::new(Arc::clone(&ctx))),
        Arc::new(BasicSuite::new(Arc::clone(&ctx), deployer)),
    ];
    let total = suites.len();

    let failures = run_suites(&log, suites).await;
    if !failures.is_empty() {
        for failure in &failures {
            error!(log, "suite failed"; "error" => failure.to_string());
        }
        // exit via the error return: a direct exit() can drop records still
        // buffered in the async drain
        return Err(format!("{} of {} suites failed", failures.len(), total).into());
    }

    info!(log, "all suites passed");
    Ok(())
}
