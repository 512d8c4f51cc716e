use mediadrop_core::Config;

// Use mimalloc as the global allocator for lower fragmentation under large
// streaming uploads.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (telemetry, storage directory, routes)
    let (_state, router) = mediadrop_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    mediadrop_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
