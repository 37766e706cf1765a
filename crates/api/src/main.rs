use anyhow::Context;

use payledger_infra::LedgerConfig;

const CONFIG_ENV: &str = "PAYLEDGER_CONFIG";
const BIND_ADDR_ENV: &str = "PAYLEDGER_BIND_ADDR";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    payledger_observability::init();

    let config = load_config()?;
    let app = payledger_api::app::build_app(config).context("invalid ledger configuration")?;

    let bind_addr = std::env::var(BIND_ADDR_ENV).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

/// File config (if `PAYLEDGER_CONFIG` is set) with environment overrides on top.
fn load_config() -> anyhow::Result<LedgerConfig> {
    let base = match std::env::var(CONFIG_ENV) {
        Ok(path) => LedgerConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        Err(_) => {
            tracing::warn!("{CONFIG_ENV} not set; using built-in defaults");
            LedgerConfig::default()
        }
    };

    base.with_overrides(|var| std::env::var(var).ok())
        .context("invalid PAYLEDGER_* environment override")
}
