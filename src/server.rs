// 🌐 Static data server - /pokemon.json plus a small JSON API
//
// The data file is re-read on every request, like any static resource.

use crate::api::{get_all, get_by_name, DataSource, LoadError, RESOURCE_PATH};
use crate::creature::{derive_all, DerivedCreature};
use crate::filter::{search, SearchPattern, Summary, Threshold};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
}

impl AppState {
    fn source(&self) -> DataSource {
        DataSource::File(self.data_path.clone())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(Self {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }

    fn failed(error: impl ToString) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self {
                success: false,
                data: None,
                error: Some(error.to_string()),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
struct NameQuery {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    #[serde(default)]
    search: String,
    #[serde(default)]
    threshold: Option<String>,
}

#[derive(Serialize)]
struct SummaryResponse {
    matched: usize,
    threshold: String,
    #[serde(flatten)]
    summary: Summary,
}

/// Run a blocking read of the data file on tokio's blocking pool
async fn read_data<T, F>(state: &AppState, read: F) -> Result<T, String>
where
    F: FnOnce(&DataSource) -> Result<T, LoadError> + Send + 'static,
    T: Send + 'static,
{
    let source = state.source();
    match tokio::task::spawn_blocking(move || read(&source)).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => Err(format!("data read task failed: {}", e)),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// GET /api/creatures?name= - By-name lookup, power attached
async fn get_creatures(State(state): State<AppState>, Query(query): Query<NameQuery>) -> Response {
    let name = query.name.clone();
    match read_data(&state, move |source| get_by_name(source, &name)).await {
        Ok(creatures) => {
            let derived: Vec<DerivedCreature> = derive_all(&creatures);
            ApiResponse::ok(derived)
        }
        Err(e) => {
            log::error!("error looking up creatures by name {:?}: {}", query.name, e);
            ApiResponse::<Vec<DerivedCreature>>::failed(e)
        }
    }
}

/// GET /api/summary?search=&threshold= - View statistics
async fn get_summary(State(state): State<AppState>, Query(query): Query<SummaryQuery>) -> Response {
    match read_data(&state, get_all).await {
        Ok(creatures) => {
            let derived = derive_all(&creatures);
            let rows = search(&derived, &SearchPattern::from_input(&query.search));
            let threshold = query
                .threshold
                .as_deref()
                .map(Threshold::parse)
                .unwrap_or_default();

            ApiResponse::ok(SummaryResponse {
                matched: rows.len(),
                threshold: threshold.to_string(),
                summary: Summary::compute(&rows, threshold),
            })
        }
        Err(e) => {
            log::error!("error computing summary: {}", e);
            ApiResponse::<SummaryResponse>::failed(e)
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/creatures", get(get_creatures))
        .route("/summary", get(get_summary))
        .with_state(state.clone());

    Router::new()
        .route_service(RESOURCE_PATH, ServeFile::new(&state.data_path))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tower::ServiceExt;

    const SAMPLE: &str = r#"[
        {"id": 1, "name": "Bulbasaur", "type": ["Grass", "Poison"],
         "hp": 45, "attack": 49, "defense": 49,
         "special_attack": 65, "special_defense": 65, "speed": 45},
        {"id": 4, "name": "Charmander", "type": ["Fire"],
         "hp": 39, "attack": 52, "defense": 43,
         "special_attack": 60, "special_defense": 50, "speed": 65},
        {"id": 5, "name": "Charmeleon", "type": ["Fire"],
         "hp": 58, "attack": 64, "defense": 58,
         "special_attack": 80, "special_defense": 65, "speed": 80}
    ]"#;

    fn test_app(body: &str) -> (NamedTempFile, Router) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        let app = router(AppState {
            data_path: file.path().to_path_buf(),
        });
        (file, app)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (_file, app) = test_app(SAMPLE);
        let (status, body) = get_json(app, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_serves_raw_resource() {
        let (_file, app) = test_app(SAMPLE);
        let (status, body) = get_json(app, "/pokemon.json").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert!(body[0].get("power").is_none(), "raw file carries no power");
    }

    #[tokio::test]
    async fn test_creatures_by_name() {
        let (_file, app) = test_app(SAMPLE);
        let (status, body) = get_json(app.clone(), "/api/creatures?name=char").await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        let names: Vec<&str> = data.iter().map(|c| c["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Charmander", "Charmeleon"]);
        assert_eq!(data[0]["power"], 309);

        let (_, body) = get_json(app.clone(), "/api/creatures?name=mander").await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) = get_json(app, "/api/creatures").await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_summary() {
        let (_file, app) = test_app(SAMPLE);
        let (status, body) = get_json(app.clone(), "/api/summary?search=bulba&threshold=300").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["matched"], 1);
        assert_eq!(body["data"]["count_above"], 1);
        assert_eq!(body["data"]["min"], 318);
        assert_eq!(body["data"]["max"], 318);

        let (_, body) = get_json(app.clone(), "/api/summary?search=xyz").await;
        assert_eq!(body["data"]["matched"], 0);
        assert_eq!(body["data"]["min"], Value::Null);

        let (_, body) = get_json(app, "/api/summary?threshold=abc").await;
        assert_eq!(body["data"]["matched"], 3);
        assert_eq!(body["data"]["count_above"], 0);
        assert_eq!(body["data"]["threshold"], "invalid");
    }

    #[tokio::test]
    async fn test_data_reads_leave_the_runtime_free() {
        let state = AppState {
            data_path: PathBuf::from("unused.json"),
        };
        let slow_read = read_data(&state, |_| {
            std::thread::sleep(std::time::Duration::from_millis(500));
            Ok(())
        });

        // Single-threaded runtime: an inline read would finish before the timer
        tokio::select! {
            biased;
            _ = slow_read => panic!("read blocked the runtime thread"),
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {}
        }
    }

    #[tokio::test]
    async fn test_broken_data_file_is_500() {
        let (_file, app) = test_app("not json");
        let (status, body) = get_json(app, "/api/creatures?name=a").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("not a valid list"));
    }
}
