use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::aggregator::Granularity;
use crate::cache::SnapshotCache;
use crate::chart::{ChartOptions, build_chart, render_png_bytes};
use crate::config::Config;
use crate::downloader;
use crate::entry::{NewEntry, TimeInput, VOLUME_STEP_ML, default_capture_time, half_hour_slots, local_now};
use crate::record::Method;
use crate::store::SheetFile;
use crate::table::build_table;
use crate::tracker::Tracker;
use crate::Error;

pub struct AppState {
    tracker: Mutex<Tracker<SheetFile>>,
    config: Config,
}

impl AppState {
    pub fn new(tracker: Tracker<SheetFile>, config: Config) -> Self {
        Self {
            tracker: Mutex::new(tracker),
            config,
        }
    }

    /// Open the configured sheet file and wrap it in a tracker
    pub fn from_config(config: Config) -> crate::Result<Self> {
        let store = SheetFile::open_or_create(&config.store_path, config.columns.default_header())?;
        let tracker = Tracker::new(
            store,
            config.columns.clone(),
            SnapshotCache::new(config.cache_ttl()),
        );
        Ok(Self::new(tracker, config))
    }

    fn tracker(&self) -> Result<MutexGuard<'_, Tracker<SheetFile>>, ApiError> {
        self.tracker
            .lock()
            .map_err(|_| ApiError(Error::Store("tracker lock poisoned".to_string())))
    }
}

/// Error wrapper mapping crate errors to JSON responses
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = if self.0.is_user_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!("request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            code,
            Json(StatusResponse {
                status: "error".to_string(),
                message: Some(self.0.to_string()),
            }),
        )
            .into_response()
    }
}

#[derive(Deserialize)]
struct EntryForm {
    date: String,
    time: String,
    volume_ml: u32,
    method: String,
    #[serde(default)]
    comment: String,
}

#[derive(Deserialize)]
struct DeleteRequest {
    label: String,
    #[serde(default)]
    confirm: bool,
}

#[derive(Deserialize)]
struct ChartQuery {
    granularity: Option<String>,
}

impl ChartQuery {
    fn granularity(&self) -> Result<Granularity, ApiError> {
        match &self.granularity {
            Some(g) => Ok(g.parse()?),
            None => Ok(Granularity::Daily),
        }
    }
}

#[derive(Serialize)]
struct LabelEntry {
    label: String,
    row_number: usize,
}

#[derive(Serialize)]
struct FormDefaults {
    date: String,
    time: String,
    time_input: TimeInput,
    slots: Vec<String>,
    methods: Vec<String>,
    volume_step_ml: u32,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/records", get(list_records).post(add_record))
        .route("/api/form", get(form_defaults))
        .route("/api/labels", get(list_labels))
        .route("/api/delete", post(delete_record))
        .route("/api/chart", get(chart_data))
        .route("/api/chart.png", get(chart_png))
        .route("/api/export.csv", get(export_csv))
        .route("/api/export.xlsx", get(export_xlsx))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr = config.bind_addr.clone();
    let app_state = Arc::new(AppState::from_config(config)?);
    let app = router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn list_records(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let records = state.tracker()?.records()?;
    Ok(Json(serde_json::json!({
        "count": records.len(),
        "records": build_table(&records),
    })))
}

async fn add_record(
    State(state): State<Arc<AppState>>,
    Json(form): Json<EntryForm>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = NewEntry::from_form(
        &form.date,
        &form.time,
        &form.volume_ml.to_string(),
        &form.method,
        &form.comment,
    )?;
    let submitted_at = local_now(state.config.utc_offset_hours);
    state.tracker()?.append(entry, submitted_at)?;

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse {
            status: "ok".to_string(),
            message: None,
        }),
    ))
}

async fn form_defaults(State(state): State<Arc<AppState>>) -> Json<FormDefaults> {
    let time_input = state.config.time_input;
    let now = default_capture_time(local_now(state.config.utc_offset_hours), time_input);
    let slots = match time_input {
        TimeInput::HalfHour => half_hour_slots()
            .iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect(),
        TimeInput::Minute => Vec::new(),
    };

    Json(FormDefaults {
        date: now.format("%Y-%m-%d").to_string(),
        time: now.format("%H:%M").to_string(),
        time_input,
        slots,
        methods: Method::ALL.iter().map(Method::to_string).collect(),
        volume_step_ml: VOLUME_STEP_ML,
    })
}

async fn list_labels(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let labels = state.tracker()?.labels_fresh()?;
    let entries: Vec<LabelEntry> = labels
        .into_iter()
        .map(|(label, row_number)| LabelEntry { label, row_number })
        .collect();
    Ok(Json(entries))
}

async fn delete_record(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeleteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.tracker()?.delete(&request.label, request.confirm)?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "label": deleted.label,
        "row_number": deleted.row_number,
    })))
}

async fn chart_data(
    Query(query): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let granularity = query.granularity()?;
    let buckets = state.tracker()?.aggregate(granularity)?;
    Ok(Json(build_chart(&buckets, granularity)))
}

async fn chart_png(
    Query(query): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let granularity = query.granularity()?;
    let buckets = state.tracker()?.aggregate(granularity)?;
    let data = build_chart(&buckets, granularity);

    let png = render_png_bytes(&data, &ChartOptions::default())
        .map_err(|e| Error::Export(format!("chart rendering failed: {}", e)))?;

    Ok(binary_response("image/png", png))
}

async fn export_csv(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let records = state.tracker()?.records()?;
    let csv = downloader::to_csv(&build_table(&records));
    Ok(binary_response("text/csv; charset=utf-8", csv.into_bytes()))
}

async fn export_xlsx(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let records = state.tracker()?.records()?;
    let xlsx = downloader::to_xlsx(&build_table(&records))
        .map_err(|e| Error::Export(format!("XLSX export failed: {}", e)))?;
    Ok(binary_response(
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        xlsx,
    ))
}

fn binary_response(content_type: &'static str, body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        Bytes::from(body),
    )
        .into_response()
}
