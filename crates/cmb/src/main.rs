use std::sync::Arc;

use tracing::info;

use cmb_console::ConsoleTransport;
use cmb_core::{
    config::Config, pipeline::Pipeline, ports::CommandUsageSink, refresh, state::BotState,
    usage::JsonUsageLog,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cmb_core::logging::init("cmb");

    let cfg = Config::load()?;
    info!(prefix = %cfg.prefix, "starting chat moderation bot");

    let state = Arc::new(BotState::new(cfg.prefix.clone()));
    let transport = Arc::new(ConsoleTransport::new());

    let usage: Option<Arc<dyn CommandUsageSink>> = cfg
        .usage_log_path
        .as_ref()
        .map(|p| Arc::new(JsonUsageLog::new(p.clone())) as Arc<dyn CommandUsageSink>);

    let pipeline = Arc::new(Pipeline::new(
        &cfg,
        state.clone(),
        transport.clone(),
        usage,
    ));

    let refresher = refresh::spawn(cfg.bio_refresh_interval, state, transport.clone());

    cmb_console::run(pipeline, transport).await?;

    refresher.abort();
    Ok(())
}
