use anyhow::Result;
use marquee_api::setup;
use marquee_core::Config;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let (_state, app) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, app).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
