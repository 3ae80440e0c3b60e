/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use courier_api::{app::AppState, config::Config};
/// use courier_shared::db::pool::create_pool;
/// use courier_shared::dispatch::LogDispatcher;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let state = AppState::new(pool, Arc::new(LogDispatcher::new()));
/// let app = courier_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use courier_shared::{
    auth::{authenticate, basic::BasicCredentials, AuthError},
    dispatch::CodeDispatcher,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Delivers verification codes at signup
    pub dispatcher: Arc<dyn CodeDispatcher>,
}

impl AppState {
    pub fn new(db: SqlitePool, dispatcher: Arc<dyn CodeDispatcher>) -> Self {
        Self { db, dispatcher }
    }
}

/// Builds the complete Axum router
///
/// ```text
/// /
/// ├── GET  /                  # Liveness (public)
/// ├── GET  /health            # Liveness + database probe (public)
/// ├── POST /signup            # Create account, dispatch code (public)
/// ├── POST /verify            # Confirm code (public)
/// └── Basic Auth required:
///     ├── POST /registration_id
///     ├── GET  /contacts      # Drain contact queue
///     ├── POST /contacts      # Upload contact list
///     ├── GET  /message       # Drain message queue
///     ├── POST /message       # Queue message by local_id
///     └── POST /send          # Queue message by to_local_id
/// ```
///
/// The auth gate is a route layer, so unknown paths still answer 404
/// rather than 401.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/", get(routes::health::index))
        .route("/health", get(routes::health::health_check))
        .route("/signup", post(routes::auth::signup))
        .route("/verify", post(routes::auth::verify));

    let protected_routes = Router::new()
        .route("/registration_id", post(routes::auth::set_registration_id))
        .route(
            "/contacts",
            get(routes::contacts::drain_contacts).post(routes::contacts::upload_contacts),
        )
        .route(
            "/message",
            get(routes::messages::drain_messages).post(routes::messages::post_message),
        )
        .route("/send", post(routes::messages::send_message))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            basic_auth_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Basic authentication middleware layer
///
/// Resolves the `Authorization` header to a stored user and inserts the
/// [`User`](courier_shared::models::User) into request extensions. Runs
/// before body extraction, so a rejected request never reaches a handler.
async fn basic_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let credentials = BasicCredentials::from_header(auth_header)?;
    let user = authenticate(&state.db, &credentials).await?;

    tracing::debug!(user_id = user.id, "Request authenticated");
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
