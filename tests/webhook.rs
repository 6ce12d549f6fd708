//! end-to-end tests: inbound alertmanager webhook through the router to a
//! mocked provider endpoint

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gong::credentials::CredentialStore;
use gong::log::LogSettings;
use gong::settings::Settings;
use gong::webhook_receiver::{build_router, AppState};

fn state(api: &str, vars: &[(&str, &str)]) -> Arc<AppState> {
    let settings = Settings {
        bind_address: "127.0.0.1".parse().unwrap(),
        port: 5000,
        external_url: Some("http://alertmanager.example".into()),
        request_timeout: Duration::from_secs(2),
        dingtalk_api: Url::parse(&format!("{api}/robot/send")).unwrap(),
        wechat_api: Url::parse(&format!("{api}/cgi-bin/webhook/send")).unwrap(),
        log: LogSettings {
            level: "Info".into(),
        },
    };
    let credentials = CredentialStore::from_vars(
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
    );

    Arc::new(AppState::new(settings, credentials).unwrap())
}

fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn firing_batch_reaches_dingtalk_as_markdown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/robot/send"))
        .and(query_param("access_token", "t1"))
        .and(body_string_contains("HighCPU"))
        .and(body_string_contains("cpu high"))
        .and(body_string_contains("markdown"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"errcode": 0, "errmsg": "ok"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = build_router(state(
        &server.uri(),
        &[("ROBOT_TOKEN_PRO", "t1"), ("ROBOT_SECRET_PRO", "s1")],
    ));

    let response = app
        .oneshot(post(
            "/dingtalk/hook/pro",
            json!({
                "status": "firing",
                "alerts": [{
                    "labels": { "alertname": "HighCPU", "job": "svc" },
                    "annotations": { "summary": "cpu high", "description": "cpu > 90%" }
                }]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Success");
}

#[tokio::test]
async fn one_push_per_alert_name_group() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/webhook/send"))
        .and(query_param("key", "k1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"errcode": 0, "errmsg": "ok"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let app = build_router(state(&server.uri(), &[("ROBOT_KEY_PRO", "k1")]));

    let alert = |name: &str| {
        json!({
            "labels": { "alertname": name },
            "annotations": { "summary": "s", "description": "d" }
        })
    };
    let response = app
        .oneshot(post(
            "/wechat/hook/pro",
            json!({
                "status": "firing",
                "alerts": [alert("HighCPU"), alert("DiskFull"), alert("HighCPU")]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_batch_sends_nothing_but_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errcode": 0})))
        .expect(0)
        .mount(&server)
        .await;

    let app = build_router(state(&server.uri(), &[("ROBOT_KEY_PRO", "k1")]));

    let response = app
        .oneshot(post(
            "/wechat/hook/pro",
            json!({ "status": "firing", "alerts": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Success");
}

#[tokio::test]
async fn provider_rejection_never_reaches_the_caller() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"errcode": 93000, "errmsg": "invalid key"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = build_router(state(&server.uri(), &[("ROBOT_KEY_PRO", "k1")]));

    let response = app
        .oneshot(post(
            "/wechat/hook/pro",
            json!({
                "status": "firing",
                "alerts": [{
                    "labels": { "alertname": "HighCPU" },
                    "annotations": { "summary": "s", "description": "d" }
                }]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Success");
}

#[tokio::test]
async fn resolved_batch_renders_resolved_wording() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("alerts resolved"))
        .and(body_string_contains("view full details"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"errcode": 0, "errmsg": "ok"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = build_router(state(&server.uri(), &[("ROBOT_KEY_PRO", "k1")]));

    let response = app
        .oneshot(post(
            "/wechat/hook/pro",
            json!({
                "status": "resolved",
                "alerts": [{
                    "labels": { "alertname": "HighCPU" },
                    "annotations": { "summary": "s", "description": "d" }
                }]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
