// src/routes.rs

use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::{header, header::InvalidHeaderValue, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
//
use crate::{
    db::SalesStore,
    error::Result,
    export::documents_to_csv,
    period::Period,
    sale::{derive_net, Sale},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SalesStore>,
    pub supported_years: Arc<[String]>,
}

impl AppState {
    pub fn new(store: Arc<dyn SalesStore>, supported_years: Vec<String>) -> Self {
        Self { store, supported_years: supported_years.into() }
    }
}

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "csv".to_string()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/sales", get(get_sales))
        .route("/api/sales/{month}/{year}", get(get_sales_for_period))
        .with_state(state)
}

/// Allows a single origin with credentials. Methods and headers mirror the
/// preflight request, since a wildcard cannot be combined with credentials.
pub fn cors(origin: &str) -> std::result::Result<CorsLayer, InvalidHeaderValue> {
    let origin = HeaderValue::from_str(origin)?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

pub fn app(state: AppState, cors: CorsLayer) -> Router {
    router(state).layer(cors).layer(TraceLayer::new_for_http())
}

// every stored sale with net derived; `|` csv of the stored fields inline, or typed json
async fn get_sales(State(state): State<AppState>, Query(query): Query<SalesQuery>) -> Result<Response> {
    let mut documents = state.store.find_all().await?;
    documents.iter_mut().for_each(derive_net);

    tracing::debug!(count = documents.len(), format = %query.format, "listing sales");

    if query.format == "csv" {
        let body = documents_to_csv(&documents, b'|')?;

        return Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response());
    }

    let sales = documents
        .into_iter()
        .map(Sale::from_document)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Json(sales).into_response())
}

// stored documents for one month as a `,` csv attachment; net is left as stored
async fn get_sales_for_period(
    State(state): State<AppState>,
    Path((month, year)): Path<(String, String)>,
) -> Result<Response> {
    let period = match Period::parse(&month, &year, &state.supported_years) {
        Ok(period) => period,
        Err(err) => {
            tracing::info!(%month, %year, %err, "rejected period");
            return Err(err.into());
        }
    };

    let documents = state.store.find_by_key_suffix(&period.key_suffix()).await?;

    tracing::debug!(count = documents.len(), suffix = %period.key_suffix(), "exporting period");

    let body = documents_to_csv(&documents, b',')?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=export.csv"),
        ],
        body,
    )
        .into_response())
}
