mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::activity_logs::{
    routes as activity_routes, ActivityLogRepository, ActivityLogger,
    InMemoryActivityLogRepository, PgActivityLogRepository,
};
use crate::features::notifications::{routes as notifications_routes, NotificationDispatcher};
use crate::features::reports::services::{DepartmentRouter, LocationEnricher, ReportAnalyzer};
use crate::features::reports::{
    report_events, routes as reports_routes, InMemoryReportRepository, PgReportRepository,
    ReportPipeline, ReportProcessor, ReportRepository, ReportService,
};
use crate::modules::push::{HttpPushTransport, LogPushTransport, PushTransport};
use crate::shared::clock::{Clock, SystemClock};
use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Select persistence: Postgres when DATABASE_URL is set, in-memory otherwise
    let (report_repository, activity_repository): (
        Arc<dyn ReportRepository>,
        Arc<dyn ActivityLogRepository>,
    ) = match &config.database {
        Some(db_config) => {
            let pool = database::connect_and_migrate(db_config).await?;
            (
                Arc::new(PgReportRepository::new(pool.clone())),
                Arc::new(PgActivityLogRepository::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (data is not persisted)");
            (
                Arc::new(InMemoryReportRepository::new()),
                Arc::new(InMemoryActivityLogRepository::new()),
            )
        }
    };

    // Select push transport: HTTP gateway when configured, log-only otherwise
    let push_transport: Arc<dyn PushTransport> = match &config.push.gateway_url {
        Some(url) => {
            tracing::info!("Push gateway configured: {}", url);
            Arc::new(
                HttpPushTransport::new(url.clone(), &config.push)
                    .map_err(|e| anyhow::anyhow!("Failed to initialize push transport: {}", e))?,
            )
        }
        None => {
            tracing::warn!("PUSH_GATEWAY_URL not set, notifications will only be logged");
            Arc::new(LogPushTransport)
        }
    };

    // Initialize services
    let activity_logger = Arc::new(ActivityLogger::new(activity_repository));
    let dispatcher = Arc::new(NotificationDispatcher::new(push_transport));
    let department_router = Arc::new(DepartmentRouter::new(
        Arc::clone(&report_repository),
        Arc::clone(&activity_logger),
        Arc::clone(&clock),
    ));
    let pipeline = Arc::new(ReportPipeline::new(
        Arc::clone(&report_repository),
        Arc::new(ReportAnalyzer::heuristic(Arc::clone(&clock))),
        Arc::new(LocationEnricher::default()),
        department_router,
        Arc::clone(&activity_logger),
        Arc::clone(&dispatcher),
        Arc::clone(&clock),
    ));
    tracing::info!("Report pipeline initialized");

    // Spawn report processor worker
    let (event_publisher, events) = report_events(config.processor.queue_capacity);
    let report_processor = Arc::new(ReportProcessor::new(
        Arc::clone(&pipeline),
        config.processor.clone(),
    ));
    tokio::spawn(report_processor.run(events));
    tracing::info!(
        "Report processor worker spawned (queue_capacity={}, max_retries={})",
        config.processor.queue_capacity,
        config.processor.max_retries
    );

    let report_service = Arc::new(ReportService::new(
        Arc::clone(&report_repository),
        Arc::clone(&activity_logger),
        event_publisher,
        Arc::clone(&clock),
    ));

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Internal trigger routes (shared token)
    let internal_routes = match &config.app.internal_api_token {
        Some(token) => {
            tracing::info!("Internal routes enabled");
            reports_routes::internal_routes(
                Arc::clone(&report_service),
                Arc::clone(&pipeline),
                token.clone(),
            )
        }
        None => {
            tracing::info!("Internal routes disabled (INTERNAL_API_TOKEN not set)");
            Router::new()
        }
    };

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let api_routes = Router::new()
        .merge(reports_routes::routes(
            Arc::clone(&report_service),
            Arc::clone(&pipeline),
        ))
        .merge(activity_routes::routes(Arc::clone(&activity_logger)))
        .merge(notifications_routes::routes(Arc::clone(&dispatcher)));

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(internal_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
