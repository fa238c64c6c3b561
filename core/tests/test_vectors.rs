//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or errors. Bodies are compared as parsed JSON,
//! so key order does not matter.

use serde_json::Value;
use splist_core::{ApiError, EntityType, Fields, HttpMethod, HttpRequest, HttpResponse, ListClient};

const BASE_URL: &str = "https://contoso.sharepoint.com/sites/team";

fn client() -> ListClient {
    ListClient::new(BASE_URL)
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: u16::try_from(sim["status"].as_u64().unwrap()).unwrap(),
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn fields(case: &Value) -> Fields {
    case["input"].as_object().unwrap().clone()
}

/// Check method, path and headers, plus the body when the vector has one.
fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn assert_error(name: &str, err: ApiError, expected: &Value) {
    match expected["kind"].as_str().unwrap() {
        "OperationFailed" => {
            assert!(matches!(err, ApiError::OperationFailed { .. }), "{name}: expected OperationFailed");
            let expected_status = u16::try_from(expected["status"].as_u64().unwrap()).unwrap();
            assert_eq!(err.status(), Some(expected_status), "{name}: status");
            assert!(
                err.to_string().contains(expected["contains"].as_str().unwrap()),
                "{name}: message {err}"
            );
        }
        other => panic!("{name}: unknown expected_error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[test]
fn metadata_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/metadata.json")) {
        let name = case["name"].as_str().unwrap();
        let req = c.build_metadata(case["input_list"].as_str().unwrap());
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_metadata(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected = EntityType::from(case["expected_result"].as_str().unwrap());
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let entity_type = EntityType::from(case["entity_type"].as_str().unwrap());
        let req = c
            .build_create_item(
                case["input_list"].as_str().unwrap(),
                &entity_type,
                case["digest"].as_str().unwrap(),
                &fields(&case),
            )
            .unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_create_item(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[test]
fn read_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/read.json")) {
        let name = case["name"].as_str().unwrap();
        let req = c.build_get_items(
            case["input_list"].as_str().unwrap(),
            case["filter"].as_str(),
            case["top"].as_u64().unwrap() as u32,
        );
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_get_items(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: Vec<Fields> = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let entity_type = EntityType::from(case["entity_type"].as_str().unwrap());
        let req = c
            .build_update_item(
                case["input_list"].as_str().unwrap(),
                case["input_id"].as_u64().unwrap(),
                &entity_type,
                case["digest"].as_str().unwrap(),
                &fields(&case),
            )
            .unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_update_item(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            assert!(result.is_ok(), "{name}: expected success");
        }
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let req = c.build_delete_item(
            case["input_list"].as_str().unwrap(),
            case["input_id"].as_u64().unwrap(),
            case["digest"].as_str().unwrap(),
        );
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_delete_item(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            assert!(result.is_ok(), "{name}: expected success");
        }
    }
}
