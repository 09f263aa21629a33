use anyhow::anyhow;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Provider;
use rocket::http::{Header, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::{self, Json};
use rocket::{catch, catchers, get, options, post, routes, Build, Rocket, State};
use serde::Serialize;
use tracing::{error, info, warn};

use common::Config;

use crate::categories::CategoryCatalog;
use crate::error::ScannerError;
use crate::llm::summarizer::{AiSummary, SummaryNormalizer, INVALID_DESCRIPTION};
use crate::news::search::SearchOrchestrator;
use crate::news::NewsResponse;

/// Application state stored inside Rocket managed state.
pub struct AppState {
    pub search: SearchOrchestrator,
    pub summarizer: SummaryNormalizer,
    pub categories: CategoryCatalog,
}

/// JSON error body: `{error, message}` with `error` set to the status reason phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: Status,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl ApiError {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Status::BadRequest, message)
    }
}

impl From<ScannerError> for ApiError {
    fn from(err: ScannerError) -> Self {
        Self::new(err.status(), err.to_string())
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let body = ErrorBody {
            error: self.status.reason().unwrap_or("Error").to_string(),
            message: self.message,
        };
        (self.status, Json(body)).respond_to(req)
    }
}

/// Log a pipeline failure at the right level and convert it for the client.
fn reject(route: &'static str, err: ScannerError) -> ApiError {
    match &err {
        ScannerError::Validation(_) => warn!(route, error = %err, "rejected request"),
        _ => error!(route, kind = err.kind(), error = %err, "request failed"),
    }
    err.into()
}

#[get("/")]
fn index() -> &'static str {
    "Welcome to the News Scanner API"
}

#[get("/health")]
fn health() -> &'static str {
    "OK"
}

#[get("/categories")]
async fn categories(state: &State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    state.categories.list().await.map(Json).map_err(|e| {
        error!(error = %e, "failed to read categories");
        ApiError::new(Status::InternalServerError, "Failed to fetch categories")
    })
}

#[get("/news?<query>&<category>")]
async fn news(
    state: &State<AppState>,
    query: Option<String>,
    category: Option<String>,
) -> Result<Json<NewsResponse>, ApiError> {
    let query = query.unwrap_or_default();
    let category = category.unwrap_or_default();
    state
        .search
        .search(&query, &category)
        .await
        .map(Json)
        .map_err(|e| reject("/news", e))
}

#[post("/ai-summary", data = "<body>")]
async fn ai_summary(
    state: &State<AppState>,
    body: Result<Json<serde_json::Value>, json::Error<'_>>,
) -> Result<Json<AiSummary>, ApiError> {
    let description = match body {
        Ok(Json(value)) => value
            .get("description")
            .and_then(|d| d.as_str())
            .map(str::to_string),
        Err(e) => {
            warn!(error = ?e, "ai-summary body is not valid JSON");
            None
        }
    };

    let Some(description) = description else {
        return Err(ApiError::bad_request(INVALID_DESCRIPTION));
    };

    state
        .summarizer
        .summarize(&description)
        .await
        .map(Json)
        .map_err(|e| reject("/ai-summary", e))
}

/// CORS preflight for any path.
#[options("/<_..>")]
fn preflight() -> Status {
    Status::NoContent
}

#[catch(404)]
fn not_found(req: &Request<'_>) -> ApiError {
    ApiError::new(
        Status::NotFound,
        format!("No route for {} {}", req.method(), req.uri()),
    )
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request<'_>) -> ApiError {
    ApiError::new(status, status.reason_lossy())
}

/// Adds permissive CORS headers to every response.
pub struct Cors {
    allowed_origin: String,
}

impl Cors {
    pub fn new(allowed_origin: impl Into<String>) -> Self {
        Self {
            allowed_origin: allowed_origin.into(),
        }
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _req: &'r Request<'_>, res: &mut Response<'r>) {
        res.set_header(Header::new(
            "Access-Control-Allow-Origin",
            self.allowed_origin.clone(),
        ));
        res.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS",
        ));
        res.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
    }
}

/// Assemble the Rocket instance: routes, catchers, CORS and managed state.
pub fn build_rocket<P: Provider>(figment: P, state: AppState, cors_origin: &str) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(state)
        .attach(Cors::new(cors_origin))
        .mount(
            "/",
            routes![index, health, categories, news, ai_summary, preflight],
        )
        .register("/", catchers![not_found, default_catcher])
}

/// Build and launch the Rocket server with `server.bind` / `server.port` from configuration.
///
/// This function blocks until the Rocket server shuts down and returns an error if Rocket
/// fails to start.
pub async fn launch_rocket(config: &Config, state: AppState) -> anyhow::Result<()> {
    let fig = rocket::Config::figment()
        .merge(("address", config.server.bind().to_string()))
        .merge(("port", config.server.port()));

    let rocket = build_rocket(fig, state, config.server.cors_allowed_origin());

    info!(
        bind = %config.server.bind(),
        port = config.server.port(),
        "Starting Rocket HTTP server"
    );
    rocket
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    info!("Rocket HTTP server has shut down");
    Ok(())
}
