//! In-process stand-ins for the geocoding and country-data services.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::{domain::CountryRecord, error::LookupError};
use tokio::net::TcpListener;

use crate::{BorderSink, ServiceEndpoints};

pub(crate) const COUNTRIES_PREFIX: &str = "/v3.1";

pub(crate) fn country(
    common: &str,
    cca3: &str,
    capital: Option<&str>,
    population: u64,
    region: &str,
    borders: &[&str],
) -> Value {
    let mut record = json!({
        "name": { "common": common, "official": format!("Official {common}") },
        "cca3": cca3,
        "population": population,
        "region": region,
        "flags": {
            "png": format!("https://flagcdn.com/w320/{}.png", cca3.to_ascii_lowercase()),
            "svg": format!("https://flagcdn.com/{}.svg", cca3.to_ascii_lowercase())
        },
    });
    if let Some(capital) = capital {
        record["capital"] = json!([capital]);
    }
    if !borders.is_empty() {
        record["borders"] = json!(borders);
    }
    record
}

pub(crate) fn place_key(lat: f64, lon: f64) -> String {
    format!("{lat},{lon}")
}

#[derive(Clone, Default)]
pub(crate) struct MockAtlas {
    places: HashMap<String, String>,
    countries: Vec<Value>,
    failing_codes: HashSet<String>,
    soft_missing_names: HashSet<String>,
    malformed_geocode: bool,
    geocode_status: Option<u16>,
}

impl MockAtlas {
    pub(crate) fn with_place(mut self, lat: f64, lon: f64, country: &str) -> Self {
        self.places.insert(place_key(lat, lon), country.to_string());
        self
    }

    pub(crate) fn with_country(mut self, record: Value) -> Self {
        self.countries.push(record);
        self
    }

    pub(crate) fn failing_code(mut self, code: &str) -> Self {
        self.failing_codes.insert(code.to_ascii_uppercase());
        self
    }

    /// Answers `200 OK` with a `{status: 404}` body for this name.
    pub(crate) fn soft_missing(mut self, name: &str) -> Self {
        self.soft_missing_names.insert(name.to_ascii_lowercase());
        self
    }

    pub(crate) fn malformed_geocode(mut self) -> Self {
        self.malformed_geocode = true;
        self
    }

    pub(crate) fn geocode_status(mut self, status: u16) -> Self {
        self.geocode_status = Some(status);
        self
    }
}

#[derive(Clone)]
struct MockState {
    fixture: Arc<MockAtlas>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockState {
    fn record(&self, request: String) {
        self.requests.lock().expect("request log").push(request);
    }
}

pub(crate) struct MockServices {
    pub(crate) base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockServices {
    pub(crate) fn endpoints(&self) -> ServiceEndpoints {
        ServiceEndpoints {
            geocode_base_url: self.base_url.clone(),
            countries_base_url: format!("{}{COUNTRIES_PREFIX}", self.base_url),
            user_agent: "atlas-tests".into(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("request log").clone()
    }

    pub(crate) fn requests_matching(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|path| path.starts_with(prefix))
            .count()
    }
}

#[derive(Deserialize)]
struct ReverseParams {
    format: String,
    lat: f64,
    lon: f64,
}

pub(crate) async fn spawn_mock_services(fixture: MockAtlas) -> Result<MockServices> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        fixture: Arc::new(fixture),
        requests: Arc::clone(&requests),
    };
    let app = Router::new()
        .route("/reverse", get(handle_reverse))
        .route(&format!("{COUNTRIES_PREFIX}/name/:name"), get(handle_name))
        .route(&format!("{COUNTRIES_PREFIX}/alpha/:code"), get(handle_alpha))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(MockServices {
        base_url: format!("http://{addr}"),
        requests,
    })
}

fn not_found_payload() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": 404, "message": "Not Found" })),
    )
        .into_response()
}

async fn handle_reverse(
    State(state): State<MockState>,
    Query(params): Query<ReverseParams>,
) -> Response {
    state.record(format!(
        "/reverse?format={}&lat={}&lon={}",
        params.format, params.lat, params.lon
    ));
    if let Some(status) = state.fixture.geocode_status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "upstream unavailable").into_response();
    }
    if state.fixture.malformed_geocode {
        return (StatusCode::OK, "<html>slow down</html>").into_response();
    }
    match state.fixture.places.get(&place_key(params.lat, params.lon)) {
        Some(country) => Json(json!({
            "place_id": 1,
            "display_name": format!("Somewhere, {country}"),
            "address": { "country": country, "country_code": "xx" }
        }))
        .into_response(),
        None => Json(json!({ "error": "Unable to geocode" })).into_response(),
    }
}

async fn handle_name(State(state): State<MockState>, Path(name): Path<String>) -> Response {
    state.record(format!("{COUNTRIES_PREFIX}/name/{name}"));
    let needle = name.to_ascii_lowercase();
    if state.fixture.soft_missing_names.contains(&needle) {
        return Json(json!({ "status": 404, "message": "Not Found" })).into_response();
    }
    let matches: Vec<Value> = state
        .fixture
        .countries
        .iter()
        .filter(|record| {
            record["name"]["common"]
                .as_str()
                .is_some_and(|common| common.to_ascii_lowercase().contains(&needle))
        })
        .cloned()
        .collect();
    if matches.is_empty() {
        return not_found_payload();
    }
    Json(Value::Array(matches)).into_response()
}

async fn handle_alpha(State(state): State<MockState>, Path(code): Path<String>) -> Response {
    state.record(format!("{COUNTRIES_PREFIX}/alpha/{code}"));
    if state.fixture.failing_codes.contains(&code.to_ascii_uppercase()) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    match state
        .fixture
        .countries
        .iter()
        .find(|record| {
            record["cca3"]
                .as_str()
                .is_some_and(|cca3| cca3.eq_ignore_ascii_case(&code))
        })
        .cloned()
    {
        Some(record) => Json(json!([record])).into_response(),
        None => not_found_payload(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SinkEvent {
    NoBorders,
    Header,
    Resolved { code: String, name: String },
    Failed { code: String, not_found: bool },
}

#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().expect("sink events").clone()
    }

    pub(crate) fn resolved_names(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Resolved { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SinkEvent) {
        self.events.lock().expect("sink events").push(event);
    }
}

impl BorderSink for RecordingSink {
    fn no_bordering_countries(&self) {
        self.push(SinkEvent::NoBorders);
    }

    fn begin_bordering_countries(&self) {
        self.push(SinkEvent::Header);
    }

    fn bordering_country_resolved(&self, code: &str, record: CountryRecord) {
        self.push(SinkEvent::Resolved {
            code: code.to_string(),
            name: record.common_name,
        });
    }

    fn bordering_country_failed(&self, code: &str, error: &LookupError) {
        self.push(SinkEvent::Failed {
            code: code.to_string(),
            not_found: error.is_not_found(),
        });
    }
}

pub(crate) const FRANCE_BORDERS: [&str; 8] =
    ["BEL", "DEU", "ITA", "LUX", "MCO", "ESP", "CHE", "AND"];

const FRANCE_NEIGHBOURS: [(&str, &str, &str, u64); 8] = [
    ("Belgium", "BEL", "Brussels", 11_555_997),
    ("Germany", "DEU", "Berlin", 83_240_525),
    ("Italy", "ITA", "Rome", 59_554_023),
    ("Luxembourg", "LUX", "Luxembourg", 632_275),
    ("Monaco", "MCO", "Monaco", 39_244),
    ("Spain", "ESP", "Madrid", 47_351_567),
    ("Switzerland", "CHE", "Bern", 8_654_622),
    ("Andorra", "AND", "Andorra la Vella", 77_265),
];

/// France plus its eight neighbours, with Paris resolvable by coordinate.
pub(crate) fn western_europe() -> MockAtlas {
    let fixture = MockAtlas::default()
        .with_place(48.8566, 2.3522, "France")
        .with_place(64.1466, -21.9426, "Iceland")
        .with_country(country(
            "France",
            "FRA",
            Some("Paris"),
            67_391_582,
            "Europe",
            &FRANCE_BORDERS,
        ))
        .with_country(country(
            "Iceland",
            "ISL",
            Some("Reykjavik"),
            366_425,
            "Europe",
            &[],
        ));
    FRANCE_NEIGHBOURS
        .iter()
        .fold(fixture, |fixture, &(common, cca3, capital, population)| {
            fixture.with_country(country(
                common,
                cca3,
                Some(capital),
                population,
                "Europe",
                &["FRA"],
            ))
        })
}
