use {
    tokio::{net::TcpListener, signal},
    tracing::{error, info},
    tracing_subscriber::{fmt, EnvFilter},
};

use credential_auth::{Builder, Config, Error, RequiredEnv, Verbosity};

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::from(verbosity).into())
        .from_env_lossy();
    fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!(err = %err, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;
    init_tracing(config.logger.verbosity);
    info!("Logging at {} verbosity", config.logger.verbosity);

    let env = RequiredEnv::from_env().inspect_err(|err| {
        error!(err = %err, "Refusing to start without identity service and session settings");
    })?;

    let bind_addr = config.website.bind_addr();
    let app = Builder::new(config, &env)?.build();

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
