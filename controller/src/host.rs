use std::{future::Future, io::ErrorKind, path::Path};

use anyhow::Context;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use home_common::{config::ENV_CONFIG_PATH, ControllerConfig, ControllerState};

use crate::{backend::ControllerBackend, client::ApiClient, cycle::Controller};

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config().await.unwrap_or_else(|err| {
        warn!("failed to load controller config: {err:#}");
        let mut config = ControllerConfig::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.sanitize();
        config
    });

    if config.request_timeout().is_none() {
        warn!("no request timeout configured; a hung endpoint stalls the cycle");
    }

    let client = ApiClient::new(&config)?;
    let mut controller =
        Controller::new(client, ControllerState::default(), StdRng::from_os_rng());

    run_loop(&mut controller, &config, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for interrupt: {err}");
            std::future::pending::<()>().await;
        }
    })
    .await;

    Ok(())
}

/// Runs cycles until `shutdown` resolves. Interrupts are honored both while
/// a cycle is in flight and while sleeping between cycles.
pub async fn run_loop<B, S>(controller: &mut Controller<B>, config: &ControllerConfig, shutdown: S)
where
    B: ControllerBackend,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    info!("starting home controller");
    info!("heating: {}", controller.state().heating_label());

    loop {
        let delay = tokio::select! {
            _ = &mut shutdown => break,
            outcome = controller.run_cycle() => match outcome {
                Ok(report) => {
                    info!(
                        "cycle report: sent={} dropped={} acknowledged={} failed={} skipped={} \
                         status_write_failed={}",
                        report.readings_sent,
                        report.readings_dropped,
                        report.acknowledged,
                        report.failed,
                        report.skipped,
                        report.status_write_failed
                    );
                    info!("waiting {}s", config.cycle_interval().as_secs());
                    config.cycle_interval()
                }
                Err(err) => {
                    warn!("error in main loop: {:#}", anyhow::Error::from(err));
                    config.error_backoff()
                }
            },
        };

        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    info!("stopping controller");
}

async fn load_config() -> anyhow::Result<ControllerConfig> {
    let mut config = match std::env::var(ENV_CONFIG_PATH) {
        Ok(path) => read_config_file(Path::new(&path)).await?,
        Err(_) => ControllerConfig::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok());
    config.sanitize();
    Ok(config)
}

async fn read_config_file(path: &Path) -> anyhow::Result<ControllerConfig> {
    match tokio::fs::read(path).await {
        Ok(raw) => serde_json::from_slice::<ControllerConfig>(&raw)
            .with_context(|| format!("invalid controller config at {}", path.display())),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!("config file {} not found, using defaults", path.display());
            Ok(ControllerConfig::default())
        }
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}
