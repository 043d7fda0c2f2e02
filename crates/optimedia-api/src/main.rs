use optimedia_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    // Initialize the application (database, services, routes)
    let (_state, router) = optimedia_api::setup::initialize_app(config.clone()).await?;

    optimedia_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
