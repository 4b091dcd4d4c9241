//! Cinema booking API server.
//!
//! Loads configuration from `CINEMA__*` environment variables, connects to
//! PostgreSQL, registers the configured payment gateways and serves the
//! booking and payment routes. A background task expires stale pending
//! bookings on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cinema_booking::adapters::http::{api_router, AppState};
use cinema_booking::adapters::{
    payment_gateways, postgres, PostgresBookingRepository, PostgresCatalogReader,
    PostgresPaymentRepository, ResendNotifier, TracingNotifier,
};
use cinema_booking::application::{ExpireStaleBookingsCommand, ExpireStaleBookingsHandler};
use cinema_booking::config::{
    AppConfig, BookingConfig, LogFormat, ServerConfig, ValidationError,
};
use cinema_booking::domain::foundation::Timestamp;
use cinema_booking::ports::{BookingNotifier, BookingRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);
    tracing::info!(
        environment = ?config.server.environment,
        port = config.server.port,
        "Configuration loaded"
    );

    let pool = postgres::connect(&config.database).await?;
    if config.database.run_migrations {
        postgres::run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let gateways = payment_gateways(&config.payment)?;
    let email_timeout = Duration::from_secs(config.payment.request_timeout_secs);
    let notifier: Arc<dyn BookingNotifier> =
        match ResendNotifier::from_config(&config.email, email_timeout)? {
            Some(resend) => Arc::new(resend),
            None => {
                tracing::warn!("No e-mail API key configured; confirmations are only logged");
                Arc::new(TracingNotifier)
            }
        };

    let catalog = Arc::new(PostgresCatalogReader::new(pool.clone()));
    let bookings: Arc<dyn BookingRepository> = Arc::new(PostgresBookingRepository::new(pool.clone()));
    let state = AppState {
        catalog: catalog.clone(),
        users: catalog,
        bookings: bookings.clone(),
        payments: Arc::new(PostgresPaymentRepository::new(pool)),
        notifier,
        gateways,
        pricing: config.booking.pricing_policy(),
        minimum_amount: config.payment.minimum_amount,
        confirmation_url: config.booking.confirmation_url.clone(),
    };

    let sweeper = tokio::spawn(run_expiry_sweep(bookings, config.booking.clone()));

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(api_router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(config.server.request_timeout()))
                .layer(CompressionLayer::new())
                .layer(cors_layer(&config.server)?),
        );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.as_str()));

    match server.log_format() {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

fn cors_layer(server: &ServerConfig) -> Result<CorsLayer, ValidationError> {
    let origins = server.allowed_origins()?;
    if origins.is_empty() && !server.is_production() {
        return Ok(CorsLayer::permissive());
    }
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Cancels pending bookings older than the configured TTL, forever.
async fn run_expiry_sweep(bookings: Arc<dyn BookingRepository>, config: BookingConfig) {
    let handler = ExpireStaleBookingsHandler::new(
        bookings,
        i64::try_from(config.pending_ttl_secs).unwrap_or(i64::MAX),
        config.sweep_batch_size,
    );
    let mut interval = tokio::time::interval(Duration::from_secs(config.sweep_interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let swept = handler
            .handle(ExpireStaleBookingsCommand {
                now: Timestamp::now(),
            })
            .await;
        // The handler logs its own summary
        if let Err(err) = swept {
            tracing::error!(error = %err, "Expiry sweep failed");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}
