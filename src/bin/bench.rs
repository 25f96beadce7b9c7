use anyhow::Result;
use medchain_bench::{config, mode, utils};

#[tokio::main]
async fn main() -> Result<()> {
    utils::init_tracing();

    let cfg = config::BenchConfig::load(&config::config_path())?;

    mode::bench::run(cfg).await
}
