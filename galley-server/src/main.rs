use galley_server::{Config, Server, ServerState, init_logger, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env is optional)
    dotenvy::dotenv().ok();

    // 2. Configuration and logging
    let config = Config::from_env();
    init_logger(config.log_dir.as_deref());

    print_banner();
    tracing::info!("Galley server starting...");

    // 3. Database, migrations, upload directory
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP server (runs until ctrl-c)
    let server = Server::with_state(config, state);
    server.run().await?;

    Ok(())
}
