//! Geo boundary proxy.
//!
//! A thin pass-through in front of the organization's REST API: the hosting
//! page fetches boundary GeoJSON and canonical listings from here instead of
//! talking to the upstream directly. The one piece of real behavior is the
//! state-layer fallback: when the upstream cannot serve state boundaries, a
//! configured public dataset is fetched instead and each feature gets a
//! usable `properties.id` back-filled from its published name.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "geo_server", about = "Boundary GeoJSON proxy")]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:9200")]
    addr: SocketAddr,

    /// Upstream REST API base, e.g. https://api.example.org/api.
    #[arg(long)]
    upstream: String,

    /// Secondary source for the state layer when the upstream fails.
    #[arg(long)]
    states_fallback: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 8)]
    timeout_secs: u64,
}

#[derive(Clone)]
struct AppState {
    http: reqwest::Client,
    upstream: String,
    states_fallback: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
        .expect("http client");

    let state = AppState {
        http,
        upstream: args.upstream.trim_end_matches('/').to_string(),
        states_fallback: args.states_fallback,
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/geo/states", get(get_states_listing))
        .route("/geo/states-geojson", get(get_states_geojson))
        .route("/geo/districts-geojson", get(get_districts_geojson))
        .route("/geo/mandals-geojson", get(get_mandals_geojson))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("geo server listening on http://{}", args.addr);
    axum::serve(
        tokio::net::TcpListener::bind(args.addr).await.unwrap(),
        app,
    )
    .await
    .unwrap();
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

#[derive(Debug, Deserialize)]
struct CountryQuery {
    #[serde(rename = "countryId")]
    country_id: String,
}

#[derive(Debug, Deserialize)]
struct StateQuery {
    #[serde(rename = "stateId")]
    state_id: String,
}

#[derive(Debug, Deserialize)]
struct DistrictQuery {
    #[serde(rename = "districtId")]
    district_id: String,
}

async fn get_states_listing(
    State(state): State<AppState>,
    Query(q): Query<CountryQuery>,
) -> Response {
    let url = format!("{}/geo/states?countryId={}", state.upstream, q.country_id);
    match fetch_json(&state.http, &url).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => bad_gateway("states listing", e),
    }
}

async fn get_states_geojson(
    State(state): State<AppState>,
    Query(q): Query<CountryQuery>,
) -> Response {
    let url = format!(
        "{}/geo/states-geojson?countryId={}",
        state.upstream, q.country_id
    );
    match fetch_json(&state.http, &url).await {
        Ok(value) => Json(value).into_response(),
        Err(primary) => {
            let Some(fallback_url) = state.states_fallback.as_deref() else {
                return bad_gateway("states geojson", primary);
            };
            warn!("upstream states geojson failed ({primary}); trying fallback source");
            match fetch_json(&state.http, fallback_url).await {
                Ok(mut value) => {
                    backfill_state_ids(&mut value);
                    Json(value).into_response()
                }
                Err(secondary) => {
                    warn!("fallback states geojson failed too: {secondary}");
                    bad_gateway("states geojson", primary)
                }
            }
        }
    }
}

async fn get_districts_geojson(
    State(state): State<AppState>,
    Query(q): Query<StateQuery>,
) -> Response {
    let url = format!(
        "{}/geo/districts-geojson?stateId={}",
        state.upstream, q.state_id
    );
    match fetch_json(&state.http, &url).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => bad_gateway("districts geojson", e),
    }
}

async fn get_mandals_geojson(
    State(state): State<AppState>,
    Query(q): Query<DistrictQuery>,
) -> Response {
    let url = format!(
        "{}/geo/mandals-geojson?districtId={}",
        state.upstream, q.district_id
    );
    match fetch_json(&state.http, &url).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => bad_gateway("mandals geojson", e),
    }
}

async fn fetch_json(http: &reqwest::Client, url: &str) -> Result<Value, String> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?
        .error_for_status()
        .map_err(|e| format!("bad status: {e}"))?;
    response
        .json::<Value>()
        .await
        .map_err(|e| format!("invalid json: {e}"))
}

fn bad_gateway(what: &str, error: String) -> Response {
    warn!("{what} unavailable: {error}");
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": format!("{what} unavailable") })),
    )
        .into_response()
}

/// Public boundary dumps rarely carry `properties.id`; give every feature
/// one, derived from its published name (or its top-level id), so the
/// drill-down client can key selections the same way it does for upstream
/// payloads.
fn backfill_state_ids(fc: &mut Value) {
    let top_ids: Vec<Option<String>> = fc
        .get("features")
        .and_then(|f| f.as_array())
        .map(|features| {
            features
                .iter()
                .map(|f| f.get("id").and_then(|v| v.as_str()).map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let Some(features) = fc.get_mut("features").and_then(|f| f.as_array_mut()) else {
        return;
    };
    for (feature, top_id) in features.iter_mut().zip(top_ids) {
        let Some(obj) = feature.as_object_mut() else {
            continue;
        };
        let props = obj
            .entry("properties")
            .or_insert_with(|| Value::Object(Default::default()));
        let Some(props) = props.as_object_mut() else {
            continue;
        };
        if props.get("id").and_then(|v| v.as_str()).is_some() {
            continue;
        }
        let name = formats::sniff_display_name(props).map(str::to_string);
        if let Some(id) = name.or(top_id) {
            props.insert("id".to_string(), Value::String(id));
        }
    }
}
