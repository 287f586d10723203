use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use actix_web::{
    App,
    http::{StatusCode, header},
    test, web,
};
use serde_json::{Value, json};

use pci_service::{
    PredictError, Predictor, PredictionService,
    catalog::{FIELD_CATALOG, FeatureMapping},
    http::{self, ErrorBody},
    load_service,
};

const SCENARIO: &str = r#"{
    "Part_length": "5",
    "Carriageway width in m.": "7",
    "Year of construction /upgradation": "2005",
    "Study Stretch Chainage": "12",
    "Avg Rain fall": "1200",
    "Age of Pavement during Evalution Years ": "10",
    "MDD": "1.9",
    "OMC": "12",
    "LL": "30",
    "PL": "20",
    "PI": "10",
    "CBR": "8",
    "SCI": "50",
    "SN": "4",
    "MSN": "3.5",
    "CVPD": "200",
    "evalution_year": "2020",
    "evalution_month": "6",
    "evalution_quarter": "2"
}"#;

/// Keeps every vector it's asked about and answers with a fixed value.
struct Recorder {
    answer: f64,
    seen: Mutex<Vec<Vec<f64>>>,
}

impl Recorder {
    fn new(answer: f64) -> Arc<Self> {
        Arc::new(Self {
            answer,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<Vec<f64>> {
        self.seen.lock().unwrap().clone()
    }
}

impl Predictor for Recorder {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        self.seen.lock().unwrap().push(features.to_vec());
        Ok(self.answer)
    }
}

struct Exploding;

impl Predictor for Exploding {
    fn predict(&self, _features: &[f64]) -> Result<f64, PredictError> {
        panic!("model blew up");
    }
}

struct Rejecting;

impl Predictor for Rejecting {
    fn predict(&self, _features: &[f64]) -> Result<f64, PredictError> {
        Err(PredictError::NonFinite(f64::INFINITY))
    }
}

/// Builds the app around `$predictor`, the same way `main` wires it.
macro_rules! app {
    ($predictor:expr) => {{
        let service = PredictionService::new($predictor, FeatureMapping::new().unwrap());
        test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(http::configure),
        )
        .await
    }};
}

fn scenario() -> Value {
    serde_json::from_str(SCENARIO).unwrap()
}

fn predict_req(body: &Value) -> test::TestRequest {
    test::TestRequest::post().uri("/predict").set_json(body)
}

#[actix_rt::test]
async fn scenario_feeds_the_expected_vector() {
    let recorder = Recorder::new(71.25);
    let app = app!(recorder.clone());

    let res = test::call_service(&app, predict_req(&scenario()).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["prediction"], json!(71.25));
    assert_eq!(body["inputs"].as_array().unwrap().len(), 19);

    assert_eq!(
        recorder.seen(),
        [vec![0.0, 7.0, 2005.0, 12.0, 1200.0, 10.0, 1.9, 10.0, 50.0, 3.5, 200.0, 2.0]]
    );
}

#[actix_rt::test]
async fn inputs_are_echoed_raw_in_catalog_order() {
    let app = app!(Recorder::new(1.0));

    let mut payload = scenario();
    payload["CVPD"] = json!(200);
    payload["SN"] = json!(4.0);
    payload["extra"] = json!("ignored");

    let res = test::call_service(&app, predict_req(&payload).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = test::read_body_json(res).await;
    let inputs = body["inputs"].as_array().unwrap();

    assert_eq!(inputs.len(), FIELD_CATALOG.len());
    for (input, name) in inputs.iter().zip(FIELD_CATALOG) {
        assert_eq!(input["name"], json!(name));
        assert_eq!(input["value"], payload[name]);
    }
    assert_eq!(inputs[15]["value"], json!(200));
    assert_eq!(inputs[0]["value"], json!("5"));
}

#[actix_rt::test]
async fn empty_payload_lists_every_field() {
    let recorder = Recorder::new(0.0);
    let app = app!(recorder.clone());

    let res = test::call_service(&app, predict_req(&json!({})).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: ErrorBody = test::read_body_json(res).await;
    assert_eq!(
        body.error,
        format!("Missing inputs: {}", FIELD_CATALOG.join(", "))
    );
    assert!(recorder.seen().is_empty());
}

#[actix_rt::test]
async fn missing_fields_are_all_reported() {
    let app = app!(Recorder::new(0.0));

    let mut payload = scenario();
    let map = payload.as_object_mut().unwrap();
    map.remove("LL");
    map.remove("evalution_quarter");

    let res = test::call_service(&app, predict_req(&payload).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: ErrorBody = test::read_body_json(res).await;
    assert_eq!(body.error, "Missing inputs: LL, evalution_quarter");
}

#[actix_rt::test]
async fn non_numeric_value_is_named() {
    let recorder = Recorder::new(0.0);
    let app = app!(recorder.clone());

    let mut payload = scenario();
    payload["SCI"] = json!("abc");

    let res = test::call_service(&app, predict_req(&payload).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: ErrorBody = test::read_body_json(res).await;
    assert_eq!(body.error, "Invalid value for 'SCI'");
    assert!(recorder.seen().is_empty());
}

#[actix_rt::test]
async fn non_numeric_field_outside_the_model_is_named() {
    let recorder = Recorder::new(3.0);
    let app = app!(recorder.clone());

    let mut payload = scenario();
    payload["CBR"] = json!("abc");

    let res = test::call_service(&app, predict_req(&payload).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: ErrorBody = test::read_body_json(res).await;
    assert_eq!(body.error, "Invalid value for 'CBR'");
    assert!(recorder.seen().is_empty());
}

#[actix_rt::test]
async fn identical_payloads_give_identical_predictions() {
    let service = load_service(&sample_model()).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service))
            .configure(http::configure),
    )
    .await;

    let mut predictions = Vec::new();
    for _ in 0..2 {
        let res = test::call_service(&app, predict_req(&scenario()).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        predictions.push(body["prediction"].as_f64().unwrap());
    }

    assert_eq!(predictions[0].to_bits(), predictions[1].to_bits());
}

#[actix_rt::test]
async fn inference_errors_are_server_errors() {
    let app = app!(Arc::new(Rejecting));

    let res = test::call_service(&app, predict_req(&scenario()).to_request()).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: ErrorBody = test::read_body_json(res).await;
    assert_eq!(body.error, "the model produced a non finite prediction: inf");
}

#[actix_rt::test]
async fn panicking_model_does_not_take_the_service_down() {
    let app = app!(Arc::new(Exploding));

    for _ in 0..2 {
        let res = test::call_service(&app, predict_req(&scenario()).to_request()).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: ErrorBody = test::read_body_json(res).await;
        assert_eq!(body.error, "model blew up");
    }
}

fn raw_predict_req(body: &'static str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/predict")
        .insert_header(header::ContentType::json())
        .set_payload(body)
}

#[actix_rt::test]
async fn unparseable_body_is_a_server_error() {
    let recorder = Recorder::new(0.0);
    let app = app!(recorder.clone());

    let res = test::call_service(&app, raw_predict_req("{\"MDD\": ").to_request()).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: ErrorBody = test::read_body_json(res).await;
    assert_eq!(body.error, "EOF while parsing a value at line 1 column 8");
    assert!(recorder.seen().is_empty());

    // The service keeps answering afterwards.
    let res = test::call_service(&app, predict_req(&scenario()).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn array_body_reports_every_field_missing() {
    let app = app!(Recorder::new(0.0));

    let res = test::call_service(&app, raw_predict_req("[1, 2]").to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: ErrorBody = test::read_body_json(res).await;
    assert_eq!(
        body.error,
        format!("Missing inputs: {}", FIELD_CATALOG.join(", "))
    );
}

#[actix_rt::test]
async fn empty_body_counts_as_empty_payload() {
    let app = app!(Recorder::new(0.0));

    let req = test::TestRequest::post().uri("/predict").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: ErrorBody = test::read_body_json(res).await;
    assert!(body.error.starts_with("Missing inputs: Part_length, "));
}

#[actix_rt::test]
async fn landing_page_is_served() {
    let app = app!(Recorder::new(0.0));

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );

    let page = test::read_body(res).await;
    let page = std::str::from_utf8(&page).unwrap();
    for field in FIELD_CATALOG {
        assert!(page.contains(&format!("name=\"{field}\"")), "{field} has no input");
    }

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/static/script.js").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn predict_only_accepts_post() {
    let app = app!(Recorder::new(0.0));

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/predict").to_request(),
    )
    .await;
    assert!(matches!(
        res.status(),
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED
    ));
}

fn sample_model() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("models/MMGSY_best_model.json")
}

#[::std::prelude::v1::test]
fn startup_fails_without_a_model() {
    let err = load_service(Path::new("/nonexistent/MMGSY_best_model.json")).unwrap_err();
    assert!(err.to_string().starts_with("failed to load model"));
}
