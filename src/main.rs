use std::{process, sync::Arc};

use rifugio::{
    cache::CacheStorage,
    config,
    infra::{
        error::InfraError,
        http::{GatewayState, build_router},
        net::HttpFetcher,
        telemetry,
    },
    worker::{ClientRegistry, NetworkFetcher, Worker, WorkerConfig, WorkerError, WorkerEvent},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &WorkerError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), WorkerError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), WorkerError> {
    let storage = Arc::new(CacheStorage::new());
    let clients = Arc::new(ClientRegistry::new());
    let worker_config = WorkerConfig::from(&settings);
    let fetcher: Arc<dyn NetworkFetcher> = Arc::new(HttpFetcher::new(worker_config.origin.clone())?);
    let worker = Arc::new(Worker::new(
        worker_config,
        Arc::clone(&storage),
        Arc::clone(&fetcher),
        Arc::clone(&clients),
    ));

    // Install must complete before activation; a failed precache aborts
    // startup and the supervisor retries the whole process.
    worker.dispatch(WorkerEvent::Install).await?;
    worker.dispatch(WorkerEvent::Activate).await?;

    let state = GatewayState {
        worker,
        fetcher,
        clients,
        storage,
        origin: settings.origin.base_url.clone(),
    };
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| WorkerError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, origin = %settings.origin.base_url, "gateway listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| WorkerError::from(InfraError::from(err)))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(error = %error, "failed to install shutdown signal handler");
    }
}
