use std::sync::Arc;

use alert_service::{
    admin::AdminSender,
    api::{AppState, run_api_server},
    builder::PayloadBuilder,
    clients::{
        database::PostgresStore,
        fcm::{FcmClient, GcpTokenSource},
        health::HealthChecker,
        rbmq::RabbitMqClient,
        redis::RedisIdempotencyStore,
    },
    config::Config,
    dispatcher::Dispatcher,
    models::{message::Collection, role::known_topics},
    worker::run_consumer,
};
use anyhow::{Error, Result, anyhow};
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    let config = Config::load()?;
    info!(project_id = %config.fcm_project_id, "Configuration loaded");

    let store = Arc::new(PostgresStore::connect(&config.database_url).await?);
    store.ensure_schema().await?;

    let tokens = Arc::new(GcpTokenSource::discover().await?);
    let fcm_client = Arc::new(FcmClient::new(&config, tokens)?);

    let mut dispatcher = Dispatcher::new(
        fcm_client,
        store.clone(),
        PayloadBuilder::new(config.sound_policy),
    );

    match RedisIdempotencyStore::connect(&config).await {
        Ok(idempotency) => dispatcher = dispatcher.with_idempotency(Arc::new(idempotency)),
        Err(e) => warn!(error = %e, "Redis unavailable, duplicate guard disabled"),
    }

    let dispatcher = Arc::new(dispatcher);
    let admin = AdminSender::new(dispatcher.clone(), store.clone(), store);

    let topics: Vec<&str> = known_topics().collect();
    info!(topics = ?topics, "Publishing to role topics");

    let rabbitmq = Arc::new(RabbitMqClient::connect(&config).await?);
    let mut tasks = JoinSet::new();

    for collection in Collection::ALL {
        let rabbitmq = rabbitmq.clone();
        let dispatcher = dispatcher.clone();

        tasks.spawn(async move {
            if let Err(e) = run_consumer(rabbitmq, collection, dispatcher).await {
                error!(collection = %collection, error = %e, "Consumer stopped");
            }
        });
    }

    let state = Arc::new(AppState {
        health_checker: HealthChecker::new(config.clone()),
        admin,
    });

    tasks.spawn(async move {
        if let Err(e) = run_api_server(&config, state).await {
            error!(error = %e, "API server stopped");
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
        _ = tasks.join_next() => warn!("A service task exited, shutting down"),
    }

    tasks.shutdown().await;

    Ok(())
}
