use anyhow::Context;
use mimalloc::MiMalloc;
use vt_loadgen::{CycleDriver, LoadConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> anyhow::Result<()> {
    let config = LoadConfig::from_env().context("Failed to read configuration")?;
    vt_loadgen::logging::init(config.log_format).context("Failed to install logging")?;
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;
    let _guard = rt.enter();
    rt.block_on(run_loadgen(config));
    Ok(())
}

async fn run_loadgen(config: LoadConfig) {
    tracing::info!(
        base_uri = %config.base_uri,
        tasks_per_cycle = config.tasks_per_cycle,
        interval_secs = config.cycle_interval.as_secs(),
        transport = ?config.transport,
        scenario = ?config.scenario,
        completion = ?config.completion,
        max_in_flight = ?config.max_in_flight,
        "vt-loadgen starting"
    );
    let driver = CycleDriver::new(&config);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let summary = driver.run_until(&mut shutdown).await;
    if !summary.interrupted && config.max_cycles.is_some() {
        driver.drain_until(&mut shutdown).await;
    }
    tracing::info!(
        cycles = summary.cycles,
        in_flight = driver.in_flight(),
        "vt-loadgen stopped"
    );
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the only way out is max cycles.
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
