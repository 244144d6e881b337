#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests of the HTTP surface over the in-memory stores.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use fornecedor_api::auth::TokenClaims;
use fornecedor_api::config::{JwtSettings, LockoutSettings, ServerSettings};
use fornecedor_api::models::{User, UserClaim};
use fornecedor_api::{app, build_token, AppState, MemorySupplierStore, MemoryUserStore, UserStore, DELETE_SUPPLIER_CLAIM};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    users: Arc<MemoryUserStore>,
    jwt: JwtSettings,
}

fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret_key: "test-secret-test-secret-test-secret!".into(),
        expiration_hours: 1,
        issuer: "fornecedor-api".into(),
        audience: "https://localhost".into(),
    }
}

fn test_app() -> TestApp {
    let users = Arc::new(MemoryUserStore::new());
    let jwt = jwt_settings();
    let state = AppState::new(
        Arc::new(MemorySupplierStore::new()),
        users.clone(),
        jwt.clone(),
        LockoutSettings {
            max_failed_attempts: 3,
            duration: Duration::from_secs(300),
        },
    );
    let server = ServerSettings {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        request_timeout: Duration::from_secs(10),
        enable_docs: true,
    };
    TestApp {
        router: app(state, &server),
        users,
        jwt,
    }
}

impl TestApp {
    /// Token for a user stored directly (no password hashing), with the given claims granted.
    async fn token(&self, email: &str, claims: &[UserClaim]) -> String {
        let user = User::new(email, "unused".into());
        self.users.insert(&user).await.unwrap();
        for claim in claims {
            self.users.add_claim(user.id, claim).await.unwrap();
        }
        let granted = self.users.claims(user.id).await.unwrap();
        build_token(&user, &granted, &self.jwt).unwrap().access_token
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("request failed")
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn supplier_routes_require_a_token() {
    let app = test_app();
    for (method, uri) in [
        (Method::GET, "/fornecedor"),
        (Method::GET, "/fornecedor/acme"),
        (Method::POST, "/fornecedor"),
        (Method::DELETE, "/fornecedor/00000000-0000-0000-0000-000000000000"),
    ] {
        let response = app.send(method, uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
    let response = app.send(Method::GET, "/fornecedor", Some("garbage"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = test_app();
    let issued = chrono::Utc::now().timestamp() - 7200;
    let claims = TokenClaims {
        sub: uuid::Uuid::new_v4().to_string(),
        email: "old@example.com".into(),
        jti: uuid::Uuid::new_v4().to_string(),
        nbf: issued,
        iat: issued,
        exp: issued + 3600,
        iss: app.jwt.issuer.clone(),
        aud: app.jwt.audience.clone(),
        extra: Default::default(),
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(app.jwt.secret_key.as_bytes()),
    )
    .unwrap();

    let response = app.send(Method::GET, "/fornecedor", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
}

#[tokio::test]
async fn create_read_update_list_flow() {
    let app = test_app();
    let token = app.token("ana@example.com", &[]).await;

    let response = app
        .send(
            Method::POST,
            "/fornecedor",
            Some(&token),
            Some(json!({"name": "Acme Corp", "document": "12345678901234", "active": true})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
    let created = json_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(location, format!("/fornecedor/{id}"));

    let response = app.send(Method::GET, &location, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, created);

    let response = app.send(Method::GET, "/fornecedor", Some(&token), None).await;
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = app
        .send(
            Method::PUT,
            &location,
            Some(&token),
            Some(json!({"name": "Acme Corp", "document": "12345678901234", "active": false})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["active"], json!(false));

    let response = app.send(Method::GET, "/fornecedor", Some(&token), None).await;
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn invalid_supplier_is_unprocessable_and_not_persisted() {
    let app = test_app();
    let token = app.token("ana@example.com", &[]).await;

    for body in [
        json!({"name": "", "document": "123", "active": true}),
        json!({"name": "Acme", "document": "   ", "active": true}),
        json!({"document": "123", "active": true}),
        json!({"name": "Acme", "document": "1".repeat(21), "active": true}),
    ] {
        let response = app.send(Method::POST, "/fornecedor", Some(&token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    let response = app.send(Method::GET, "/fornecedor/acme", Some(&token), None).await;
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn update_of_unknown_id_is_a_bad_request() {
    let app = test_app();
    let token = app.token("ana@example.com", &[]).await;
    let body = json!({"name": "Acme", "document": "1", "active": true});

    let response = app
        .send(Method::PUT, &format!("/fornecedor/{}", uuid::Uuid::new_v4()), Some(&token), Some(body.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send(Method::PUT, "/fornecedor/not-a-uuid", Some(&token), Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let invalid = json!({"name": "", "document": "1", "active": true});
    let response = app
        .send(Method::PUT, &format!("/fornecedor/{}", uuid::Uuid::new_v4()), Some(&token), Some(invalid))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send(Method::GET, "/fornecedor", Some(&token), None).await;
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let app = test_app();
    let token = app.token("ana@example.com", &[]).await;
    let response = app
        .send(Method::GET, &format!("/fornecedor/{}", uuid::Uuid::new_v4()), Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_requires_the_delete_claim() {
    let app = test_app();
    let reader = app.token("reader@example.com", &[]).await;
    let admin = app
        .token("admin@example.com", &[UserClaim::new(DELETE_SUPPLIER_CLAIM, "true")])
        .await;

    let response = app
        .send(
            Method::POST,
            "/fornecedor",
            Some(&reader),
            Some(json!({"name": "Globex", "document": "987", "ativo": true})),
        )
        .await;
    let uri = response.headers()[header::LOCATION].to_str().unwrap().to_string();

    let response = app.send(Method::DELETE, &uri, Some(&reader), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send(Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.send(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_by_term() {
    let app = test_app();
    let token = app.token("ana@example.com", &[]).await;
    for (name, document, active) in [("Acme Corp", "AB-100", true), ("Globex", "XY-200", false)] {
        let response = app
            .send(
                Method::POST,
                "/fornecedor",
                Some(&token),
                Some(json!({"name": name, "document": document, "active": active})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.send(Method::GET, "/fornecedor/ACME", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let hits = json_body(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["name"], "Acme Corp");

    // Inactive suppliers are searchable; document matches ignore case.
    let response = app.send(Method::GET, "/fornecedor/xy-2", Some(&token), None).await;
    assert_eq!(json_body(response).await[0]["name"], "Globex");

    let response = app.send(Method::GET, "/fornecedor/%20%20", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_then_login_issues_usable_tokens() {
    let app = test_app();
    let credentials = json!({
        "email": "bia@example.com",
        "password": "Str0ng!pass",
        "confirmPassword": "Str0ng!pass"
    });

    let response = app.send(Method::POST, "/registro", None, Some(credentials.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let registered = json_body(response).await;
    assert_eq!(registered["userToken"]["email"], "bia@example.com");
    assert_eq!(registered["expiresIn"], json!(3600.0));

    let response = app.send(Method::POST, "/registro", None, Some(credentials)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["details"][0]["code"], "DuplicateUserName");

    let response = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({"email": "BIA@example.com", "password": "Str0ng!pass"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = json_body(response).await["accessToken"].as_str().unwrap().to_string();

    let response = app.send(Method::GET, "/fornecedor", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn registration_input_is_validated() {
    let app = test_app();

    let response = app.send(Method::POST, "/registro", None, Some(Value::Null)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(
            Method::POST,
            "/registro",
            None,
            Some(json!({"email": "nope", "password": "Str0ng!pass", "confirmPassword": "other"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/problem+json");
    let problem = json_body(response).await;
    assert!(problem["errors"]["email"].is_array());
    assert!(problem["errors"]["confirmPassword"].is_array());

    let response = app
        .send(
            Method::POST,
            "/registro",
            None,
            Some(json!({"email": "bia@example.com", "password": "weakpw", "confirmPassword": "weakpw"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "identity_error");
}

#[tokio::test]
async fn repeated_bad_passwords_lock_the_account() {
    let app = test_app();
    let response = app
        .send(
            Method::POST,
            "/registro",
            None,
            Some(json!({"email": "cid@example.com", "password": "Str0ng!pass", "confirmPassword": "Str0ng!pass"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let wrong = json!({"email": "cid@example.com", "password": "Wr0ng!pass"});
    for _ in 0..2 {
        let response = app.send(Method::POST, "/login", None, Some(wrong.clone())).await;
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "bad request: invalid user or password");
    }
    let response = app.send(Method::POST, "/login", None, Some(wrong)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["message"], "bad request: user locked out");

    let response = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({"email": "cid@example.com", "password": "Str0ng!pass"})),
        )
        .await;
    assert_eq!(json_body(response).await["error"]["message"], "bad request: user locked out");
}

#[tokio::test]
async fn operational_routes() {
    let app = test_app();
    let response = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["database"], "ok");

    let response = app.send(Method::GET, "/version", None, None).await;
    assert_eq!(json_body(response).await["name"], "fornecedor-api");

    let response = app.send(Method::GET, "/swagger.json", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await["paths"]["/fornecedor"].is_object());

    let response = app.send(Method::GET, "/swagger", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
}
