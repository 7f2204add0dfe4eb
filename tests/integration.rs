//! End-to-end tests for the scenario runner
//!
//! These tests run scenarios over the real reqwest transport against a
//! local stub of the objects API:
//! 1. Spawning the stub on an ephemeral port
//! 2. Pointing built-in or file-based scenarios at it
//! 3. Verifying step ordering, identifier propagation and failure isolation

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use apiflow::common::config::HttpConfig;
use apiflow::http::ReqwestTransport;
use apiflow::testing::{builtin, run_suite, SuiteEntry};
use apiflow::{Error, ScenarioRunner, TestScenario};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

/// In-memory objects store with a request log
#[derive(Default)]
struct StubState {
    objects: BTreeMap<String, Value>,
    next_id: u64,
    /// (method, path, content-type)
    log: Vec<(String, String, Option<String>)>,
}

type Stub = Arc<Mutex<StubState>>;

fn record(stub: &Stub, method: &str, path: String, headers: &HeaderMap) {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    stub.lock()
        .unwrap()
        .log
        .push((method.to_string(), path, content_type));
}

async fn list_objects(State(stub): State<Stub>, headers: HeaderMap) -> Json<Value> {
    record(&stub, "GET", "/objects".into(), &headers);
    let state = stub.lock().unwrap();
    Json(Value::Array(state.objects.values().cloned().collect()))
}

async fn create_object(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&stub, "POST", "/objects".into(), &headers);
    let mut state = stub.lock().unwrap();
    state.next_id += 1;
    let id = format!("ff80818{:012x}", state.next_id);
    let object = json!({
        "id": id,
        "name": body["name"],
        "createdAt": "2026-10-18T10:00:00.000+00:00",
        "data": body["data"],
    });
    state.objects.insert(id, object.clone());
    Json(object)
}

async fn replace_object(
    State(stub): State<Stub>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    record(&stub, "PUT", format!("/objects/{}", id), &headers);
    let mut state = stub.lock().unwrap();
    let object = state.objects.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    *object = json!({"id": id, "name": body["name"], "data": body["data"]});
    Ok(Json(object.clone()))
}

async fn patch_object(
    State(stub): State<Stub>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    record(&stub, "PATCH", format!("/objects/{}", id), &headers);
    let mut state = stub.lock().unwrap();
    let object = state.objects.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let (Some(target), Some(changes)) = (object.as_object_mut(), body.as_object()) {
        for (k, v) in changes {
            target.insert(k.clone(), v.clone());
        }
    }
    Ok(Json(object.clone()))
}

async fn delete_object(
    State(stub): State<Stub>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    record(&stub, "DELETE", format!("/objects/{}", id), &headers);
    let mut state = stub.lock().unwrap();
    state.objects.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({
        "message": format!("Object with id = {} has been deleted.", id)
    })))
}

async fn list_users(State(stub): State<Stub>, headers: HeaderMap) -> Json<Value> {
    record(&stub, "GET", "/users".into(), &headers);
    Json(json!([{"id": 1, "name": "Leanne Graham"}, {"id": 2, "name": "Ervin Howell"}]))
}

/// Spawn the stub and return its base URL and state
async fn spawn_stub() -> (String, Stub) {
    let stub: Stub = Arc::new(Mutex::new(StubState::default()));
    let app = Router::new()
        .route("/objects", get(list_objects).post(create_object))
        .route(
            "/objects/{id}",
            axum::routing::put(replace_object)
                .patch(patch_object)
                .delete(delete_object),
        )
        .route("/users", get(list_users))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Failed to read stub address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}", addr), stub)
}

fn transport() -> ReqwestTransport {
    ReqwestTransport::new(&HttpConfig::default()).expect("Failed to build transport")
}

fn log_of(stub: &Stub) -> Vec<(String, String, Option<String>)> {
    stub.lock().unwrap().log.clone()
}

#[tokio::test]
async fn test_crud_builtin_against_stub() {
    let (base_url, stub) = spawn_stub().await;
    let transport = transport();
    let runner = ScenarioRunner::new(&transport).base_url_override(Some(base_url));

    let result = runner.run(&builtin("crud").unwrap()).await;

    assert!(result.passed, "{:?}", result.error);
    assert_eq!(result.steps_run, 5);
    let id = result.identifier.expect("identifier captured").to_string();
    assert!(!id.is_empty());

    let log = log_of(&stub);
    let calls: Vec<(&str, &str)> = log.iter().map(|(m, p, _)| (m.as_str(), p.as_str())).collect();
    let item = format!("/objects/{}", id);
    assert_eq!(
        calls,
        vec![
            ("GET", "/objects"),
            ("POST", "/objects"),
            ("PUT", item.as_str()),
            ("PATCH", item.as_str()),
            ("DELETE", item.as_str()),
        ]
    );

    // Every request with a body declared JSON
    for (method, _, content_type) in &log[1..4] {
        assert_eq!(content_type.as_deref(), Some("application/json"), "{}", method);
    }

    // DELETE removed the object
    assert!(stub.lock().unwrap().objects.is_empty());
}

#[tokio::test]
async fn test_collection_get_does_not_mutate() {
    let (base_url, stub) = spawn_stub().await;
    let transport = transport();
    let runner = ScenarioRunner::new(&transport).base_url_override(Some(base_url));

    let scenario = TestScenario::from_yaml(
        "name: list twice\nsteps:\n  - { method: GET, url: /objects }\n  - { method: GET, url: /objects }\n",
        "inline",
    )
    .unwrap();

    let result = runner.run(&scenario).await;

    assert!(result.passed, "{:?}", result.error);
    let state = stub.lock().unwrap();
    assert!(state.objects.is_empty());
    assert_eq!(state.next_id, 0);
}

#[tokio::test]
async fn test_suite_isolates_scenarios() {
    let (base_url, stub) = spawn_stub().await;
    let transport = transport();
    let runner = ScenarioRunner::new(&transport).base_url_override(Some(base_url));

    // PUT against an unknown id gets 404 and halts the first scenario
    let broken = TestScenario::from_yaml(
        r#"
name: broken crud
steps:
  - method: PUT
    url: /objects/missing
    body: { name: ghost }
  - method: DELETE
    url: /objects/missing
"#,
        "inline",
    )
    .unwrap();

    let report = run_suite(
        &runner,
        vec![
            SuiteEntry {
                name: "broken crud".into(),
                scenario: Ok(broken),
            },
            SuiteEntry {
                name: "collection".into(),
                scenario: builtin("collection"),
            },
        ],
    )
    .await;

    assert_eq!(report.passed(), 1);
    assert!(!report.results[0].passed);
    assert_eq!(report.results[0].steps_run, 1);
    assert!(report.results[0]
        .error
        .as_deref()
        .unwrap()
        .contains("Expected status 200, got 404"));
    assert!(report.results[1].passed);

    // The halted scenario never sent its DELETE
    let methods: Vec<String> = log_of(&stub).into_iter().map(|(m, _, _)| m).collect();
    assert_eq!(methods, vec!["PUT", "GET"]);
}

#[tokio::test]
async fn test_scenario_file_with_patch_assertion() {
    let (base_url, _stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rename.yaml");
    std::fs::write(
        &path,
        format!(
            r#"
name: rename
base_url: {base_url}
steps:
  - method: POST
    url: /objects
    body:
      name: Google Pixel 6 Pro
      data: {{ color: Cloudy White }}
    capture: id
  - method: PATCH
    url: /objects/{{id}}
    body:
      name: Google Pixel 6 Pro (Renamed)
    expect:
      body:
        - path: id
          equals: "{{id}}"
        - path: name
          contains: Renamed
        - path: data.color
          equals: Cloudy White
"#
        ),
    )
    .unwrap();

    let scenario = TestScenario::load(&path).unwrap();
    let transport = transport();
    let result = ScenarioRunner::new(&transport).run(&scenario).await;

    assert!(result.passed, "{:?}", result.error);
    assert_eq!(result.steps_run, 2);
}

#[tokio::test]
async fn test_connection_refused_fails_step() {
    // Bind and drop to get a port nothing listens on
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let transport = transport();
    let runner =
        ScenarioRunner::new(&transport).base_url_override(Some(format!("http://{}", addr)));

    let result = runner.run(&builtin("collection").unwrap()).await;

    assert!(!result.passed);
    assert_eq!(result.steps_run, 1);
    assert!(result.error.unwrap().contains("GET"));
}

#[test]
fn test_missing_scenario_file() {
    let err = TestScenario::load(std::path::Path::new("/no/such/scenario.yaml")).unwrap_err();
    assert!(matches!(err, Error::FileRead { .. }));
}
