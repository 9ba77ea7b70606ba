//! Serve command - runs the portal web server.

use std::{path::Path, sync::Arc};

use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio::{
    signal::unix::{SignalKind, signal},
    sync::Mutex,
};
use tower_cookies::{Cookie, CookieManagerLayer, Cookies, cookie::SameSite};
use tracing_subscriber::EnvFilter;

use trade_manual::{
    Portal, PortalConfig, Session,
    access::{AccessError, AccessLevel},
    credentials::BootstrapAdmin,
};

use crate::cli::ServeArgs;
use crate::session::{SessionHandle, SessionStore};
use crate::templates::{Notice, PortalView, Tab};

const SESSION_COOKIE: &str = "trade_manual_session";

/// Largest accepted request body, sized for PDF uploads
const UPLOAD_LIMIT_BYTES: usize = 64 * 1024 * 1024;

/// Shared application state
///
/// The portal sits behind one mutex, so mutations from concurrent requests
/// are applied one at a time. Handlers lock the portal before a session.
#[derive(Clone)]
struct AppState {
    portal: Arc<Mutex<Portal>>,
    sessions: SessionStore,
}

impl AppState {
    fn new(portal: Portal) -> Self {
        Self {
            portal: Arc::new(Mutex::new(portal)),
            sessions: SessionStore::new(),
        }
    }
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct PortalQuery {
    tab: Option<String>,
    q: Option<String>,
}

#[derive(Deserialize)]
struct DocumentQuery {
    path: String,
    tab: Option<String>,
    download: Option<String>,
}

#[derive(Deserialize)]
struct DeleteForm {
    path: String,
}

#[derive(Deserialize)]
struct RegisterForm {
    username: String,
    password: String,
    level: i64,
}

/// Build the portal configuration from command line arguments.
fn config_from_args(args: &ServeArgs) -> PortalConfig {
    PortalConfig {
        admin: BootstrapAdmin {
            username: args.admin_username.clone(),
            password: args.admin_password.clone(),
        },
        password_storage: args.password_storage.into(),
        ..super::portal_config(&args.data)
    }
}

/// Run the portal server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("trade_manual=info".parse()?))
        .init();

    let portal = Portal::open(config_from_args(args)).await?;
    if let Some(warning) = portal.credentials().load_warning() {
        tracing::warn!("Serving with the bootstrap admin only: {warning}");
    }

    let documents_dir = portal.registry().dir().to_path_buf();
    let credential_file = portal.credentials().path().to_path_buf();
    let app = router(AppState::new(portal));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("Manual do Trade portal started");
    println!();
    println!("Web Interface:   http://localhost:{}", local_addr.port());
    println!("Documents:       {}", documents_dir.display());
    println!("Credentials:     {}", credential_file.display());
    println!();
    println!("Available endpoints:");
    println!("  GET  /                  - Redirect to login or portal");
    println!("  GET  /login             - Login page");
    println!("  POST /login             - Login submission");
    println!("  POST /logout            - End the session");
    println!("  GET  /portal            - Search, document list and user admin");
    println!("  GET  /documents/view    - Document viewer");
    println!("  GET  /documents/file    - Raw PDF");
    println!("  POST /documents/upload  - Add a document (level 2+)");
    println!("  POST /documents/delete  - Remove a document (level 3)");
    println!("  POST /admin/users       - Create a user (level 3)");
    println!("  GET  /health            - Health check");
    println!();
    println!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("Server shut down");
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root_request))
        .route("/health", get(handle_health_endpoint))
        .route("/login", get(handle_login_page).post(handle_login_submit))
        .route("/logout", post(handle_logout))
        .route("/portal", get(handle_portal))
        .route("/documents/view", get(handle_view_document))
        .route("/documents/file", get(handle_document_file))
        .route("/documents/upload", post(handle_upload))
        .route("/documents/delete", post(handle_delete))
        .route("/admin/users", post(handle_register_user))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to set up SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }
}

/// The authenticated session behind the request cookie, if any
async fn current_session(state: &AppState, cookies: &Cookies) -> Option<SessionHandle> {
    let cookie = cookies.get(SESSION_COOKIE)?;
    state.sessions.get_session(cookie.value()).await
}

/// Map a portal error to a plain-text response.
fn error_response(err: trade_manual::Error) -> Response {
    if err.is_authentication_error() {
        return Redirect::to("/login").into_response();
    }

    let status = if err.is_permission_denied() {
        StatusCode::FORBIDDEN
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_conflict() {
        StatusCode::CONFLICT
    } else if err.is_validation_error() {
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!("Request failed: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.to_string()).into_response()
}

/// User-facing message for a failed portal operation.
fn notice_for(err: &trade_manual::Error) -> Notice {
    if err.is_validation_error() || err.is_conflict() || err.is_permission_denied() {
        Notice::Warning(err.to_string())
    } else {
        if err.is_io_error() {
            tracing::error!("Portal operation failed: {err}");
        }
        Notice::Error(err.to_string())
    }
}

/// Render the portal page for `handle`.
async fn render_portal(
    state: &AppState,
    handle: &SessionHandle,
    tab: Tab,
    query: Option<String>,
    notice: Option<Notice>,
) -> Response {
    let mut portal = state.portal.lock().await;
    let mut session = handle.lock().await;

    match portal_page(&mut portal, &mut session, tab, query, notice.as_ref()).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_response(e),
    }
}

/// Showing the menu closes any open document. Without an explicit query the
/// session's last search is shown again.
async fn portal_page(
    portal: &mut Portal,
    session: &mut Session,
    tab: Tab,
    query: Option<String>,
    notice: Option<&Notice>,
) -> trade_manual::Result<String> {
    portal.select_document(session, None).await?;

    // Non-admins asking for the admin tab land on search
    let (tab, users) = match tab {
        Tab::Admin => match portal.users(session).await {
            Ok(users) => (Tab::Admin, users),
            Err(e) if e.is_permission_denied() => (Tab::Search, Vec::new()),
            Err(e) => return Err(e),
        },
        other => (other, Vec::new()),
    };

    let query = query.unwrap_or_else(|| session.search_query().to_string());
    let results = portal.search(session, &query)?;
    let documents = portal.documents(session)?;

    let (Some(username), Some(level)) = (session.username(), session.level()) else {
        return Err(AccessError::NotAuthenticated.into());
    };

    Ok(crate::templates::portal_page(&PortalView {
        username,
        level,
        tab,
        query: &query,
        results: &results,
        documents,
        users: &users,
        notice,
    }))
}

// ============================================================================
// Authentication Handlers
// ============================================================================

/// Handler for GET / - Root redirect
async fn handle_root_request(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if current_session(&state, &cookies).await.is_some() {
        return Redirect::to("/portal");
    }
    Redirect::to("/login")
}

/// Handler for GET /login - Show login page
async fn handle_login_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    if current_session(&state, &cookies).await.is_some() {
        return Redirect::to("/portal").into_response();
    }
    Html(crate::templates::login_page(None)).into_response()
}

/// Handler for POST /login - Process login
async fn handle_login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut session = Session::new();
    let result = {
        let mut portal = state.portal.lock().await;
        portal
            .login(&mut session, &form.username, &form.password)
            .await
    };

    match result {
        Ok(_) => {
            let token = state.sessions.create_session(session).await;
            let mut cookie = Cookie::new(SESSION_COOKIE, token);
            cookie.set_http_only(true);
            cookie.set_same_site(SameSite::Lax);
            cookie.set_path("/");
            cookies.add(cookie);
            Redirect::to("/portal").into_response()
        }
        Err(e) => {
            if !e.is_authentication_error() {
                tracing::error!("Login failed: {e}");
            }
            Html(crate::templates::login_page(Some(&e.to_string()))).into_response()
        }
    }
}

/// Handler for POST /logout - Logout and destroy session
async fn handle_logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        if let Some(handle) = state.sessions.destroy_session(cookie.value()).await {
            let portal = state.portal.lock().await;
            portal.logout(&mut *handle.lock().await);
        }
        let mut removal = Cookie::from(SESSION_COOKIE);
        removal.set_path("/");
        cookies.remove(removal);
    }
    Redirect::to("/login")
}

// ============================================================================
// Portal Handlers
// ============================================================================

/// Handler for GET /portal - Search, listing and admin tabs
async fn handle_portal(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<PortalQuery>,
) -> Response {
    let Some(handle) = current_session(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };
    let tab = Tab::parse(query.tab.as_deref());
    render_portal(&state, &handle, tab, query.q, None).await
}

/// Handler for GET /documents/view?path=... - Document viewer
async fn handle_view_document(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<DocumentQuery>,
) -> Response {
    let Some(handle) = current_session(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };
    let tab = Tab::parse(query.tab.as_deref());

    let selected = {
        let portal = state.portal.lock().await;
        let mut session = handle.lock().await;
        portal
            .select_document(&mut session, Some(Path::new(&query.path)))
            .await
    };

    match selected {
        Ok(Some(document)) => Html(crate::templates::viewer_page(&document, tab)).into_response(),
        Ok(None) => Redirect::to("/portal").into_response(),
        Err(e) if e.is_not_found() => {
            let notice = Notice::Error("The document no longer exists.".to_string());
            render_portal(&state, &handle, tab, None, Some(notice)).await
        }
        Err(e) => error_response(e),
    }
}

/// Handler for GET /documents/file?path=... - Raw PDF bytes
async fn handle_document_file(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<DocumentQuery>,
) -> Response {
    let Some(handle) = current_session(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };

    let read = {
        let portal = state.portal.lock().await;
        let session = handle.lock().await;
        portal.read_document(&session, Path::new(&query.path)).await
    };

    match read {
        Ok((document, bytes)) => {
            let disposition = if query.download.is_some() {
                "attachment"
            } else {
                "inline"
            };
            let header_value = format!(
                r#"{disposition}; filename="{}""#,
                header_safe_file_name(&document.file_name)
            );
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, header_value),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Whether a browser-supplied upload name carries a PDF extension, in any case
fn is_pdf_upload(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// File name usable inside a quoted header parameter
fn header_safe_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Handler for POST /documents/upload - Add a PDF (multipart `name`, `file`)
async fn handle_upload(
    State(state): State<AppState>,
    cookies: Cookies,
    mut multipart: Multipart,
) -> Response {
    let Some(handle) = current_session(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };

    let mut name: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut file_data: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (StatusCode::BAD_REQUEST, format!("Multipart error: {e}")).into_response();
            }
        };
        let field_name = field.name().map(|n| n.to_string());
        let read = match field_name.as_deref() {
            Some("name") => field.text().await.map(|text| name = Some(text)),
            Some("file") => {
                file_name = field.file_name().map(|n| n.to_string());
                field.bytes().await.map(|bytes| file_data = Some(bytes.to_vec()))
            }
            _ => Ok(()),
        };
        if let Err(e) = read {
            return (StatusCode::BAD_REQUEST, format!("Read error: {e}")).into_response();
        }
    }

    let notice = match (name.as_deref().map(str::trim), file_data) {
        (Some(name), Some(bytes)) if !name.is_empty() && !bytes.is_empty() => {
            if !file_name.as_deref().is_some_and(is_pdf_upload) {
                Notice::Warning("Only PDF files can be uploaded.".to_string())
            } else {
                let mut portal = state.portal.lock().await;
                let session = handle.lock().await;
                match portal.upload_document(&session, &bytes, name).await {
                    Ok(document) => {
                        Notice::Success(format!("Document '{}' saved.", document.display_name))
                    }
                    Err(e) => notice_for(&e),
                }
            }
        }
        _ => Notice::Warning("Fill in the name and choose a PDF file.".to_string()),
    };

    render_portal(&state, &handle, Tab::All, None, Some(notice)).await
}

/// Handler for POST /documents/delete - Remove a document
async fn handle_delete(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<DeleteForm>,
) -> Response {
    let Some(handle) = current_session(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };

    let result = {
        let mut portal = state.portal.lock().await;
        let mut session = handle.lock().await;
        portal
            .delete_document(&mut session, Path::new(&form.path))
            .await
    };

    let notice = match result {
        Ok(()) => Notice::Success("Document removed.".to_string()),
        Err(e) if e.is_not_found() => {
            Notice::Warning("The document had already been removed.".to_string())
        }
        Err(e) => notice_for(&e),
    };
    render_portal(&state, &handle, Tab::All, None, Some(notice)).await
}

/// Handler for POST /admin/users - Create an account
async fn handle_register_user(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<RegisterForm>,
) -> Response {
    let Some(handle) = current_session(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };

    let result = match AccessLevel::try_from(form.level) {
        Ok(level) => {
            let mut portal = state.portal.lock().await;
            let session = handle.lock().await;
            portal
                .register_user(&session, &form.username, &form.password, level)
                .await
        }
        Err(e) => Err(e.into()),
    };

    let notice = match result {
        Ok(user) => Notice::Success(format!(
            "User '{}' created with level {}.",
            user.username, user.level
        )),
        Err(e) => notice_for(&e),
    };
    render_portal(&state, &handle, Tab::Admin, None, Some(notice)).await
}

// ============================================================================
// Health Handler
// ============================================================================

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    documents: usize,
    sessions: usize,
}

/// Handler for GET /health - Health check endpoint
async fn handle_health_endpoint(State(state): State<AppState>) -> axum::Json<HealthResponse> {
    let documents = state.portal.lock().await.registry().documents().len();
    axum::Json(HealthResponse {
        status: "healthy",
        documents,
        sessions: state.sessions.session_count().await,
    })
}
