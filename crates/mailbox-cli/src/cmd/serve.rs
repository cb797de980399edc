use anyhow::{bail, Context, Result};
use mailbox_core::config::{ServiceConfig, WarnLevel};
use std::path::Path;

pub fn run(config_path: Option<&Path>, port: Option<u16>) -> Result<()> {
    let config = ServiceConfig::load_or_default(config_path)
        .context("failed to load config")?
        .with_port(port);

    for w in config.validate() {
        match w.level {
            WarnLevel::Warning => tracing::warn!("config: {}", w.message),
            WarnLevel::Error => tracing::error!("config: {}", w.message),
        }
    }
    if config.has_errors() {
        bail!("config validation found errors");
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        tokio::select! {
            res = mailbox_server::serve(config) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
