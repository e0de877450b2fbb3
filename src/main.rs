use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use zoom_booking_service::{
    create_router, services::identity::MeetingIdMapper, AppConfig, AppState, BookingCoordinator,
    MeetingProvider, ZoomMeetingClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            return Err(err.into());
        }
    };

    #[cfg(feature = "sentry-monitoring")]
    let _sentry_guard = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        info!("Sentry error tracking enabled");
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let ids = match config.id_namespace {
        Some(namespace) => {
            info!("Using pinned meeting id namespace {}", namespace);
            MeetingIdMapper::new(namespace)
        }
        None => {
            info!("No MEETING_ID_NAMESPACE set - meeting ids are stable for this process only");
            MeetingIdMapper::random()
        }
    };

    // Initialize the Zoom API client
    let provider: Arc<dyn MeetingProvider> = Arc::new(ZoomMeetingClient::new(&config.zoom, ids));
    info!("Zoom client initialized for user '{}'", config.zoom.user_id);

    // Create shared application state
    let app_state = Arc::new(AppState {
        coordinator: BookingCoordinator::new(provider),
    });

    // No timeout layer: an in-flight booking always runs to completion.
    // Load shedding sits on the booking route only (see routes.rs).
    let app = create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any)),
    );

    info!("Server listening on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    // Set up signal handler for graceful shutdown
    let shutdown = async {
        let ctrl_c = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", err);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(err) => {
                    error!("Failed to install SIGTERM handler: {}", err);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received interrupt signal, starting graceful shutdown");
            },
            _ = terminate => {
                info!("Received terminate signal, starting graceful shutdown");
            },
        }
    };

    // Start server with graceful shutdown
    info!("Server is ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server has been gracefully shut down");
    Ok(())
}
