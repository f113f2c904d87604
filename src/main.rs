mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::admin::{routes as admin_routes, AdminService};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::{hash_password, SessionService, TokenService};
use crate::features::companies::{routes as companies_routes, CompanyService};
use crate::features::notifications::{routes as notifications_routes, NotificationService};
use crate::features::reports::handlers::ReportsState;
use crate::features::reports::{
    routes as reports_routes, AssignmentService, ConversationService, GeocodingService,
    ReportService, WorkflowService,
};
use crate::features::telegram::{routes as telegram_routes, TelegramService};
use crate::features::users::models::{CreateUser, UserRole};
use crate::features::users::{routes as users_routes, UserService};
use crate::modules::storage::PhotoStorage;
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

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Session tokens
    let token_service = Arc::new(TokenService::new(&config.session));
    tracing::info!("Token service initialized");

    // Accounts and companies
    let user_service = Arc::new(UserService::new(pool.clone()));
    let company_service = Arc::new(CompanyService::new(pool.clone()));
    let session_service = Arc::new(SessionService::new(
        pool.clone(),
        Arc::clone(&user_service),
        Arc::clone(&token_service),
    ));
    tracing::info!("Account services initialized");

    // Seed the first administrator when configured and absent
    bootstrap_administrator(&config, &user_service).await?;

    // Photo storage
    let photo_storage = Arc::new(
        PhotoStorage::new(config.minio.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize photo storage: {}", e))?,
    );
    photo_storage
        .ensure_bucket()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare photo storage bucket: {}", e))?;
    tracing::info!("Photo storage initialized for bucket: {}", config.minio.bucket);

    // Notifications
    let notification_service = Arc::new(NotificationService::new(pool.clone()));
    tracing::info!("Notification service initialized");

    // Report services
    let report_service = Arc::new(ReportService::new(pool.clone()));
    let geocoding_service = Arc::new(GeocodingService::new(&config.geocoding));
    let workflow_service = Arc::new(WorkflowService::new(
        pool.clone(),
        Arc::clone(&report_service),
        Arc::clone(&user_service),
        Arc::clone(&company_service),
        Arc::clone(&notification_service),
    ));
    let assignment_service = Arc::new(AssignmentService::new(
        pool.clone(),
        Arc::clone(&report_service),
    ));
    let conversation_service = Arc::new(ConversationService::new(
        pool.clone(),
        Arc::clone(&report_service),
        Arc::clone(&notification_service),
    ));
    tracing::info!("Report services initialized");

    // Telegram linkage
    let telegram_service = Arc::new(TelegramService::new(
        pool.clone(),
        Arc::clone(&report_service),
        &config.telegram,
    ));
    tracing::info!(
        "Telegram service initialized (bot: @{})",
        config.telegram.bot_username
    );

    // Admin provisioning
    let admin_service = Arc::new(AdminService::new(
        Arc::clone(&user_service),
        Arc::clone(&company_service),
    ));
    tracing::info!("Admin service initialized");

    let reports_state = ReportsState {
        reports: Arc::clone(&report_service),
        workflow: workflow_service,
        assignments: assignment_service,
        conversations: conversation_service,
        geocoding: geocoding_service,
        storage: photo_storage,
    };

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

    // Protected routes (require a session token)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes())
        .merge(notifications_routes::protected_routes(notification_service))
        .merge(reports_routes::protected_routes(reports_state))
        .merge(telegram_routes::protected_routes(Arc::clone(
            &telegram_service,
        )))
        .merge(companies_routes::protected_routes(company_service))
        .merge(admin_routes::protected_routes(admin_service))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&token_service),
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(users_routes::routes(user_service))
        .merge(auth_routes::public_routes(session_service))
        .merge(telegram_routes::public_routes(telegram_service));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
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

/// Create the configured administrator account if no administrator exists yet.
async fn bootstrap_administrator(config: &Config, users: &Arc<UserService>) -> anyhow::Result<()> {
    let (email, password) = match (
        &config.bootstrap.admin_email,
        &config.bootstrap.admin_password,
    ) {
        (Some(email), Some(password)) => (email, password),
        _ => return Ok(()),
    };

    if users
        .administrator_exists()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to check for administrator: {}", e))?
    {
        tracing::debug!("Administrator account already present, skipping bootstrap");
        return Ok(());
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    users
        .create_with_roles(CreateUser {
            email: email.trim().to_lowercase(),
            password_hash,
            first_name: "Platform".to_string(),
            last_name: "Administrator".to_string(),
            roles: vec![UserRole::Administrator],
            external_company_id: None,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create bootstrap administrator: {}", e))?;

    tracing::info!("Bootstrap administrator created: {}", email);
    Ok(())
}
