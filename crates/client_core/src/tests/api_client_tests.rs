use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::protocol::EnlistmentStatus;
use tokio::{net::TcpListener, sync::Mutex};

use super::*;
use crate::{
    config::Features,
    error::{ClientError, FailureKind},
};

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
}

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn api_for(server_url: &str) -> HttpCharacterApi {
    let settings = ClientSettings::local()
        .expect("built-in settings")
        .with_server_url(server_url)
        .expect("server url");
    HttpCharacterApi::new(&settings).expect("api client")
}

async fn record_reveal(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    recorded.bodies.lock().await.push(body);
    Json(json!({ "upp": "789ABC", "revealed": ["strength", "dex"] }))
}

async fn record_enlistment(
    State(recorded): State<Recorded>,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorded.bodies.lock().await.push(body);
    Json(json!({
        "service": "Navy",
        "enlistment_status": "drafted",
        "required_roll": 8,
        "enlistment_roll": 5,
        "modifier": 1
    }))
}

async fn record_create(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    recorded.bodies.lock().await.push(body);
    Json(json!({ "name": "Nova Kin", "age": 18 }))
}

#[tokio::test]
async fn reveal_posts_characteristic_and_decodes_revealed_set() {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/reveal_characteristic", post(record_reveal))
        .with_state(recorded.clone());
    let api = api_for(&spawn_server(app).await);

    let response = api
        .reveal_characteristic(Characteristic::Strength)
        .await
        .expect("reveal");

    assert_eq!(response.upp.as_deref(), Some("789ABC"));
    assert!(response.revealed.contains(Characteristic::Strength));
    assert!(response.revealed.contains(Characteristic::Dexterity));
    assert_eq!(response.revealed.len(), 2);
    assert_eq!(
        recorded.bodies.lock().await.as_slice(),
        &[json!({ "characteristic": "strength" })]
    );
}

#[tokio::test]
async fn rejected_reveal_is_a_validation_rejection() {
    let app = Router::new().route(
        "/reveal_characteristic",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "already revealed" })),
            )
        }),
    );
    let api = api_for(&spawn_server(app).await);

    let err = api
        .reveal_characteristic(Characteristic::Social)
        .await
        .expect_err("reveal should be rejected");

    assert_eq!(err.kind(), FailureKind::ValidationRejection);
    match err {
        ClientError::Rejected { endpoint, detail } => {
            assert_eq!(endpoint, Endpoint::RevealCharacteristic);
            assert_eq!(detail.as_deref(), Some("already revealed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn bad_request_elsewhere_is_a_network_failure() {
    let app = Router::new().route(
        "/attempt_enlistment",
        post(|| async { (StatusCode::BAD_REQUEST, Json(json!({ "message": "pick one" }))) }),
    );
    let api = api_for(&spawn_server(app).await);

    let err = api
        .attempt_enlistment(Service::Scouts)
        .await
        .expect_err("enlistment should fail");

    assert_eq!(err.kind(), FailureKind::Network);
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert!(err.to_string().contains("pick one"));
}

#[tokio::test]
async fn server_error_carries_status_and_detail() {
    let app = Router::new().route(
        "/term_survival",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "No character loaded" })),
            )
        }),
    );
    let api = api_for(&spawn_server(app).await);

    let err = api.term_survival().await.expect_err("survival should fail");

    match err {
        ClientError::Status {
            endpoint,
            status,
            detail,
        } => {
            assert_eq!(endpoint, Endpoint::TermSurvival);
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(detail.as_deref(), Some("No character loaded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn enlistment_sends_service_name_and_reads_draft() {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/attempt_enlistment", post(record_enlistment))
        .with_state(recorded.clone());
    let api = api_for(&spawn_server(app).await);

    let response = api
        .attempt_enlistment(Service::Navy)
        .await
        .expect("enlist");

    assert_eq!(response.enlistment_status, EnlistmentStatus::Drafted);
    assert_eq!(response.service.as_deref(), Some("Navy"));
    assert_eq!(response.required_roll, Some(8));
    assert_eq!(
        recorded.bodies.lock().await.as_slice(),
        &[json!({ "service": "Navy" })]
    );
}

#[tokio::test]
async fn payloadless_posts_send_an_empty_object() {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/create_character", post(record_create))
        .with_state(recorded.clone());
    let api = api_for(&spawn_server(app).await);

    let created = api.create_character().await.expect("create");

    assert_eq!(created.name.as_deref(), Some("Nova Kin"));
    assert_eq!(created.age, Some(18));
    assert_eq!(recorded.bodies.lock().await.as_slice(), &[json!({})]);
}

#[tokio::test]
async fn read_endpoints_use_get_and_tolerate_loose_types() {
    let app = Router::new()
        .route(
            "/character_status",
            get(|| async {
                Json(json!({
                    "name": "Nova Kin",
                    "age": 22,
                    "terms_served": 1,
                    "service": "",
                    "revealed": ["str", "dex", "end"],
                    "social": 12,
                    "last_survival": {}
                }))
            }),
        )
        .route(
            "/term_button_status",
            get(|| async { Json(json!({ "survival_completed": true })) }),
        )
        .route("/term_info", get(|| async { "" }));
    let api = api_for(&spawn_server(app).await);

    let status = api.character_status().await.expect("status");
    assert_eq!(status.name.as_deref(), Some("Nova Kin"));
    assert_eq!(status.age.as_deref(), Some("22"));
    assert_eq!(status.terms.as_deref(), Some("1"));
    assert_eq!(status.service, None);
    assert_eq!(status.revealed.len(), 3);
    assert_eq!(status.social, Some(12));

    let buttons = api.term_button_status().await.expect("buttons");
    assert!(buttons.survival_completed);
    assert!(!buttons.commission_completed);

    let term = api.term_info().await.expect("blank term info");
    assert!(term.term.is_none());
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let app = Router::new().nest(
        "/traveller",
        Router::new().route(
            "/delete_character",
            post(|| async { Json(json!({ "deleted": true })) }),
        ),
    );
    let server_url = spawn_server(app).await;
    let api = api_for(&format!("{server_url}/traveller"));

    let deleted = api.delete_character().await.expect("delete");

    assert!(deleted.deleted);
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let api = api_for(&format!("http://{addr}"));

    let err = api.character_status().await.expect_err("nothing listening");

    assert!(matches!(err, ClientError::Transport { .. }));
    assert_eq!(err.kind(), FailureKind::Network);
}

#[tokio::test]
async fn unknown_revealed_entry_still_yields_a_character() {
    let app = Router::new().route(
        "/character_status",
        get(|| async {
            Json(json!({
                "name": "Nova Kin",
                "revealed": ["strength", "Dexterity", "psionics"]
            }))
        }),
    );
    let api = api_for(&spawn_server(app).await);

    let snapshot = crate::sync::fetch_snapshot(&api, &Features::default()).await;

    let character = snapshot.character.expect("character survives a bad entry");
    assert_eq!(character.name, "Nova Kin");
    assert_eq!(character.revealed.len(), 2);
    assert!(character.revealed.contains(Characteristic::Dexterity));
}
