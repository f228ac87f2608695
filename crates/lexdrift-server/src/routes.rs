//! Route table and request handlers.
//!
//! All session-scoped routes read the session id from the `X-Session-Id`
//! header and validate it against the arbiter. Training status is the one
//! exception: a terminated session's job must report `not_found`, not
//! `Unauthorized`, so the status route skips arbiter validation and only
//! consults the job engine.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::{delete, get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use lexdrift_analysis::{NeighborReport, SimilarityReport, Topic, TopicWithTerms};
use lexdrift_core::errors::DriftError;
use lexdrift_core::ids::{SessionId, TermId, TopicId};
use lexdrift_core::types::{
    AlignmentMethod, CorpusStats, TrainingJob, TrainingSettings, WipeCounts,
};
use lexdrift_embeddings::text::preprocess;
use lexdrift_jobs::StartedTraining;
use lexdrift_session::{SessionInfo, SystemStatus};

use crate::error::ApiError;
use crate::health::{self, HealthResponse};
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Build the router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/sessions/create", post(create_session))
        .route("/api/v1/sessions/status", get(session_status))
        .route("/api/v1/sessions/info", get(session_info))
        .route("/api/v1/sessions/terminate", delete(terminate_session))
        .route("/api/v1/corpus/ingest", post(ingest_corpus))
        .route("/api/v1/corpus/statistics", get(corpus_statistics))
        .route("/api/v1/training/start", post(training_start))
        .route("/api/v1/training/status", get(training_status))
        .route("/api/v1/analysis/similarities", get(similarities))
        .route("/api/v1/analysis/neighbors/{word}", get(neighbors))
        .route("/api/v1/topics", post(create_topic).get(list_topics))
        .route("/api/v1/topics/{id}", delete(delete_topic))
        .route("/api/v1/topics/{id}/terms", post(add_term))
        .route("/api/v1/terms/{id}", delete(delete_term))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Extract and return the caller's session id from `X-Session-Id`.
fn session_id(headers: &HeaderMap) -> Result<SessionId, ApiError> {
    headers
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(SessionId::from)
        .ok_or_else(|| {
            ApiError(DriftError::Unauthorized(
                "missing X-Session-Id header".into(),
            ))
        })
}

/// Extract the session id and validate it against the arbiter.
fn authorized_session(state: &AppState, headers: &HeaderMap) -> Result<SessionId, ApiError> {
    let id = session_id(headers)?;
    state.arbiter.validate(&id)?;
    Ok(id)
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time))
}

// ─────────────────────────────────────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CreateSessionResponse {
    session_id: SessionId,
    expires_in_secs: u64,
    data_cleared: bool,
    wiped: WipeCounts,
}

async fn create_session(State(state): State<AppState>) -> ApiResult<CreateSessionResponse> {
    let created = state.arbiter.create()?;
    info!(session_id = %created.session_id, "session created via api");
    Ok(Json(CreateSessionResponse {
        session_id: created.session_id,
        expires_in_secs: created.expires_in_secs,
        data_cleared: true,
        wiped: created.wiped,
    }))
}

#[derive(Debug, Serialize)]
struct SessionStatusResponse {
    system_status: SystemStatus,
}

async fn session_status(State(state): State<AppState>) -> Json<SessionStatusResponse> {
    Json(SessionStatusResponse {
        system_status: state.arbiter.status(),
    })
}

#[derive(Debug, Serialize)]
struct SessionInfoResponse {
    session_id: SessionId,
    #[serde(flatten)]
    info: SessionInfo,
}

async fn session_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<SessionInfoResponse> {
    let id = session_id(&headers)?;
    let info = state.arbiter.info(&id)?;
    Ok(Json(SessionInfoResponse {
        session_id: id,
        info,
    }))
}

#[derive(Debug, Serialize)]
struct TerminateResponse {
    data_cleared: bool,
    wiped: WipeCounts,
}

async fn terminate_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<TerminateResponse> {
    let id = session_id(&headers)?;
    let wiped = state.arbiter.terminate(&id)?;
    info!(session_id = %id, "session terminated via api");
    Ok(Json(TerminateResponse {
        data_cleared: true,
        wiped,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Corpus
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct IngestRow {
    label: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct IngestRequest {
    rows: Vec<IngestRow>,
}

#[derive(Debug, Serialize)]
struct IngestResponse {
    created: usize,
    skipped: usize,
}

/// Accepts validated `{label, text}` rows (CSV parsing happens upstream),
/// tokenizes them, and stores one index per row. Duplicate labels are
/// skipped rather than overwritten.
async fn ingest_corpus(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<IngestRequest>,
) -> ApiResult<IngestResponse> {
    let _ = authorized_session(&state, &headers)?;

    let mut created = 0;
    let mut skipped = 0;
    for row in &request.rows {
        if row.label.trim().is_empty() {
            return Err(ApiError(DriftError::InvalidInput(
                "row label must not be empty".into(),
            )));
        }
        let tokens = preprocess(&row.text);
        if tokens.is_empty() {
            return Err(ApiError(DriftError::InvalidInput(format!(
                "row '{}' has no usable tokens",
                row.label
            ))));
        }
        match state.corpus.put(row.label.clone(), tokens) {
            Ok(()) => created += 1,
            Err(DriftError::Conflict(_)) => skipped += 1,
            Err(err) => return Err(ApiError(err)),
        }
    }
    info!(created, skipped, "corpus rows ingested");
    Ok(Json(IngestResponse { created, skipped }))
}

async fn corpus_statistics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<CorpusStats> {
    let _ = authorized_session(&state, &headers)?;
    Ok(Json(state.corpus.stats()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Training
// ─────────────────────────────────────────────────────────────────────────────

/// Training request with per-field fallbacks to the configured defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TrainingRequest {
    vector_dim: Option<usize>,
    window: Option<usize>,
    min_count: Option<usize>,
    epochs: Option<usize>,
    alignment_method: Option<AlignmentMethod>,
    seed: Option<u64>,
}

impl TrainingRequest {
    fn resolve(self, defaults: &TrainingSettings) -> TrainingSettings {
        TrainingSettings {
            vector_dim: self.vector_dim.unwrap_or(defaults.vector_dim),
            window: self.window.unwrap_or(defaults.window),
            min_count: self.min_count.unwrap_or(defaults.min_count),
            epochs: self.epochs.unwrap_or(defaults.epochs),
            alignment_method: self
                .alignment_method
                .unwrap_or(defaults.alignment_method),
            seed: self.seed.or(defaults.seed),
        }
    }
}

#[derive(Debug, Serialize)]
struct TrainingStartResponse {
    message: String,
    #[serde(flatten)]
    started: StartedTraining,
}

async fn training_start(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TrainingRequest>,
) -> ApiResult<TrainingStartResponse> {
    let id = authorized_session(&state, &headers)?;
    let settings = request.resolve(&state.settings.training);
    let started = state.jobs.start(id, settings)?;
    Ok(Json(TrainingStartResponse {
        message: format!(
            "training and alignment started for {} indexes using {} method",
            started.labels.len(),
            started.settings.alignment_method
        ),
        started,
    }))
}

/// Job snapshot for the caller's session id.
///
/// Deliberately skips arbiter validation: after termination the job is
/// gone and the correct answer is a `not_found` snapshot, not a 401.
async fn training_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<TrainingJob> {
    let id = session_id(&headers)?;
    Ok(Json(state.jobs.status(&id)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Analysis
// ─────────────────────────────────────────────────────────────────────────────

async fn similarities(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<SimilarityReport> {
    let _ = authorized_session(&state, &headers)?;
    let topics = state.terms.topics();
    Ok(Json(state.analyzer.cosine_similarities(&topics)?))
}

#[derive(Debug, Deserialize)]
struct NeighborsQuery {
    #[serde(default = "default_topn")]
    topn: usize,
}

fn default_topn() -> usize {
    20
}

async fn neighbors(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(word): Path<String>,
    Query(query): Query<NeighborsQuery>,
) -> ApiResult<NeighborReport> {
    let _ = authorized_session(&state, &headers)?;
    Ok(Json(state.analyzer.neighbors(&word, query.topn)?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Topics and terms
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TopicRequest {
    name: String,
}

async fn create_topic(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TopicRequest>,
) -> ApiResult<Topic> {
    let _ = authorized_session(&state, &headers)?;
    Ok(Json(state.terms.create_topic(request.name)?))
}

async fn list_topics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Vec<TopicWithTerms>> {
    let _ = authorized_session(&state, &headers)?;
    Ok(Json(state.terms.topics()))
}

async fn delete_topic(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    let _ = authorized_session(&state, &headers)?;
    state.terms.delete_topic(&TopicId::from(id))?;
    Ok(Json(serde_json::json!({"deleted": true})))
}

#[derive(Debug, Deserialize)]
struct TermRequest {
    term: String,
}

async fn add_term(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<TermRequest>,
) -> ApiResult<lexdrift_analysis::RelatedTerm> {
    let _ = authorized_session(&state, &headers)?;
    Ok(Json(state.terms.add_term(&TopicId::from(id), request.term)?))
}

async fn delete_term(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    let _ = authorized_session(&state, &headers)?;
    state.terms.delete_term(&TermId::from(id))?;
    Ok(Json(serde_json::json!({"deleted": true})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use lexdrift_settings::AppSettings;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;

    fn make_app() -> Router {
        router(AppState::new(AppSettings::default()))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        session: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header("x-session-id", session);
        }
        let request = match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_session_id(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/api/v1/sessions/create", None, None).await;
        assert_eq!(status, StatusCode::OK);
        body["session_id"].as_str().unwrap().to_owned()
    }

    fn corpus_rows() -> Value {
        // A shared sentence with well over ten distinct words (the
        // Procrustes fitting floor) plus index-specific vocabulary, repeated
        // so every word clears min_count and training stays fast.
        let shared = "technology shapes the cost structure and policy debate \
                      across every major market segment today. ";
        let text_1990 = format!("{shared}factory labor steel assembly lines. ").repeat(20);
        let text_2010 = format!("{shared}cloud software data platforms. ").repeat(20);
        json!({"rows": [
            {"label": "1990", "text": text_1990},
            {"label": "2010", "text": text_2010},
        ]})
    }

    async fn wait_for_completed(app: &Router, session: &str) -> Value {
        for _ in 0..600 {
            let (status, body) =
                send(app, "GET", "/api/v1/training/status", Some(session), None).await;
            assert_eq!(status, StatusCode::OK);
            match body["status"].as_str().unwrap() {
                "completed" => return body,
                "failed" => panic!("training failed: {body}"),
                _ => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
        panic!("training did not complete in time");
    }

    // -- health --

    #[tokio::test]
    async fn health_is_public() {
        let app = make_app();
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    // -- session lifecycle --

    #[tokio::test]
    async fn create_then_conflict() {
        let app = make_app();
        let _ = create_session_id(&app).await;
        let (status, body) = send(&app, "POST", "/api/v1/sessions/create", None, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn status_available_then_occupied() {
        let app = make_app();
        let (_, body) = send(&app, "GET", "/api/v1/sessions/status", None, None).await;
        assert_eq!(body["system_status"], "available");
        let _ = create_session_id(&app).await;
        let (_, body) = send(&app, "GET", "/api/v1/sessions/status", None, None).await;
        assert_eq!(body["system_status"], "occupied");
    }

    #[tokio::test]
    async fn info_requires_matching_session() {
        let app = make_app();
        let session = create_session_id(&app).await;

        let (status, body) =
            send(&app, "GET", "/api/v1/sessions/info", Some(&session), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["time_remaining_secs"].as_u64().unwrap() <= 1800);

        let (status, body) =
            send(&app, "GET", "/api/v1/sessions/info", Some("stale-id"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn terminate_frees_the_slot_and_is_idempotent() {
        let app = make_app();
        let session = create_session_id(&app).await;

        let (status, body) = send(
            &app,
            "DELETE",
            "/api/v1/sessions/terminate",
            Some(&session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data_cleared"], true);

        // Second terminate succeeds with nothing to wipe.
        let (status, body) = send(
            &app,
            "DELETE",
            "/api/v1/sessions/terminate",
            Some(&session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["wiped"]["indexes"], 0);

        let (_, body) = send(&app, "GET", "/api/v1/sessions/status", None, None).await;
        assert_eq!(body["system_status"], "available");
    }

    // -- corpus --

    #[tokio::test]
    async fn corpus_routes_require_session() {
        let app = make_app();
        let (status, _) = send(&app, "GET", "/api/v1/corpus/statistics", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/corpus/ingest",
            Some("stale"),
            Some(corpus_rows()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn ingest_and_statistics() {
        let app = make_app();
        let session = create_session_id(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/corpus/ingest",
            Some(&session),
            Some(corpus_rows()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["created"], 2);
        assert_eq!(body["skipped"], 0);

        let (status, body) =
            send(&app, "GET", "/api/v1/corpus/statistics", Some(&session), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indexes"], 2);
        assert!(body["tokens"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn duplicate_labels_are_skipped() {
        let app = make_app();
        let session = create_session_id(&app).await;

        let _ = send(
            &app,
            "POST",
            "/api/v1/corpus/ingest",
            Some(&session),
            Some(corpus_rows()),
        )
        .await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/corpus/ingest",
            Some(&session),
            Some(corpus_rows()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["created"], 0);
        assert_eq!(body["skipped"], 2);
    }

    #[tokio::test]
    async fn empty_text_row_rejected() {
        let app = make_app();
        let session = create_session_id(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/corpus/ingest",
            Some(&session),
            Some(json!({"rows": [{"label": "1990", "text": "a b c"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    // -- training --

    #[tokio::test]
    async fn training_with_one_index_is_invalid() {
        let app = make_app();
        let session = create_session_id(&app).await;

        let _ = send(
            &app,
            "POST",
            "/api/v1/corpus/ingest",
            Some(&session),
            Some(json!({"rows": [{"label": "1990", "text": "technology cost ".repeat(30)}]})),
        )
        .await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/training/start",
            Some(&session),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");

        // No job was created.
        let (_, body) =
            send(&app, "GET", "/api/v1/training/status", Some(&session), None).await;
        assert_eq!(body["status"], "not_found");
    }

    #[tokio::test]
    async fn analysis_before_training_is_not_ready() {
        let app = make_app();
        let session = create_session_id(&app).await;
        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/analysis/similarities",
            Some(&session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "NOT_READY");
    }

    #[tokio::test]
    async fn full_flow_train_analyze_terminate() {
        let app = make_app();
        let session = create_session_id(&app).await;

        // Upload two indexes.
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/corpus/ingest",
            Some(&session),
            Some(corpus_rows()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Define the vocabulary of interest; both words appear in both
        // indexes, so every similarity is non-null.
        let (status, topic) = send(
            &app,
            "POST",
            "/api/v1/topics",
            Some(&session),
            Some(json!({"name": "market"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let topic_id = topic["id"].as_str().unwrap().to_owned();
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/topics/{topic_id}/terms"),
            Some(&session),
            Some(json!({"term": "technology"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Train with procrustes, small and seeded.
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/training/start",
            Some(&session),
            Some(json!({
                "vector_dim": 16,
                "window": 2,
                "min_count": 2,
                "epochs": 3,
                "alignment_method": "procrustes",
                "seed": 7
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "start failed: {body}");
        assert_eq!(body["labels"], json!(["1990", "2010"]));

        let done = wait_for_completed(&app, &session).await;
        assert_eq!(done["current_step"], done["total_steps"]);

        // Similarity matrix: 1 topic x 1 term x 2 indexes.
        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/analysis/similarities",
            Some(&session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        for record in body["similarities"].as_array().unwrap() {
            let similarity = record["similarity"].as_f64().unwrap();
            assert!((-1.0..=1.0).contains(&similarity));
        }

        // Neighbors for a shared word, in both indexes.
        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/analysis/neighbors/technology?topn=3",
            Some(&session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["models_with_word"], 2);
        let first = &body["entries"][0];
        assert_eq!(first["found"], true);
        assert_eq!(first["neighbors"][0]["rank"], 1);
        assert!(first["neighbors"].as_array().unwrap().len() <= 3);

        // Neighbors for an index-specific word: marker, not error.
        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/analysis/neighbors/steel",
            Some(&session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["models_with_word"], 1);

        // Terminate: wipes corpus and terms, job becomes not_found.
        let (status, body) = send(
            &app,
            "DELETE",
            "/api/v1/sessions/terminate",
            Some(&session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["wiped"]["indexes"], 2);
        assert_eq!(body["wiped"]["topics"], 1);

        let (_, body) =
            send(&app, "GET", "/api/v1/training/status", Some(&session), None).await;
        assert_eq!(body["status"], "not_found");
    }

    #[tokio::test]
    async fn terminate_during_training_cancels_job() {
        let app = make_app();
        let session = create_session_id(&app).await;
        let _ = send(
            &app,
            "POST",
            "/api/v1/corpus/ingest",
            Some(&session),
            Some(corpus_rows()),
        )
        .await;

        // Long run so termination lands mid-flight.
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/training/start",
            Some(&session),
            Some(json!({"epochs": 200, "vector_dim": 32, "alignment_method": "procrustes"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "DELETE",
            "/api/v1/sessions/terminate",
            Some(&session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Status reports not_found from now on; analysis finds no models.
        let (_, body) =
            send(&app, "GET", "/api/v1/training/status", Some(&session), None).await;
        assert_eq!(body["status"], "not_found");

        let new_session = create_session_id(&app).await;
        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/analysis/similarities",
            Some(&new_session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "NOT_READY");
    }

    // -- topics --

    #[tokio::test]
    async fn topic_crud_roundtrip() {
        let app = make_app();
        let session = create_session_id(&app).await;

        let (_, topic) = send(
            &app,
            "POST",
            "/api/v1/topics",
            Some(&session),
            Some(json!({"name": "healthcare"})),
        )
        .await;
        let topic_id = topic["id"].as_str().unwrap().to_owned();

        let (_, term) = send(
            &app,
            "POST",
            &format!("/api/v1/topics/{topic_id}/terms"),
            Some(&session),
            Some(json!({"term": "technology"})),
        )
        .await;
        let term_id = term["id"].as_str().unwrap().to_owned();

        let (_, topics) = send(&app, "GET", "/api/v1/topics", Some(&session), None).await;
        assert_eq!(topics.as_array().unwrap().len(), 1);
        assert_eq!(topics[0]["related_terms"][0]["term"], "technology");

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/v1/terms/{term_id}"),
            Some(&session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/v1/topics/{topic_id}"),
            Some(&session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, topics) = send(&app, "GET", "/api/v1/topics", Some(&session), None).await;
        assert!(topics.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_topic_is_404() {
        let app = make_app();
        let session = create_session_id(&app).await;
        let (status, body) = send(
            &app,
            "DELETE",
            "/api/v1/topics/ghost",
            Some(&session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
