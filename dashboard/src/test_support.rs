//! In-process stand-in for the URL-shortening backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_PASSWORD: &str = "correct-horse";

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub struct MockBackend {
    pub url: String,
    pub register_calls: Arc<AtomicUsize>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let register_calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/me", get(me))
            .route("/me/urls", get(list_urls).post(shorten))
            .route("/me/links/{short}/redirects", get(redirects))
            .with_state(Arc::clone(&register_calls));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockBackend {
            url: format!("http://{addr}"),
            register_calls,
        }
    }
}

fn failure(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

fn authorize(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let expected = format!("Bearer {TEST_TOKEN}");
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(failure(StatusCode::UNAUTHORIZED, "Not authenticated")),
    }
}

async fn register(State(calls): State<Arc<AtomicUsize>>, Json(body): Json<Value>) -> Reply {
    calls.fetch_add(1, Ordering::SeqCst);
    if body["username"] == "taken" {
        return Err(failure(StatusCode::CONFLICT, "Username already taken"));
    }
    Ok(Json(json!({
        "username": body["username"],
        "full_name": body["full_name"],
        "links": 0,
    })))
}

async fn login(Form(form): Form<HashMap<String, String>>) -> Reply {
    match form.get("password").map(String::as_str) {
        Some(TEST_PASSWORD) => Ok(Json(json!({
            "access_token": TEST_TOKEN,
            "token_type": "bearer",
        }))),
        _ => Err(failure(
            StatusCode::UNAUTHORIZED,
            "Incorrect username or password",
        )),
    }
}

async fn me(headers: HeaderMap) -> Reply {
    authorize(&headers)?;
    Ok(Json(json!({ "username": "johndoe", "full_name": "John Doe", "links": 4 })))
}

async fn list_urls(headers: HeaderMap) -> Reply {
    authorize(&headers)?;
    let urls: Vec<Value> = [("abc", 3), ("def", 0), ("ghi", 1), ("jkl", 0)]
        .into_iter()
        .map(|(short, redirects)| {
            json!({
                "url": format!("https://example.com/{short}"),
                "short": short,
                "owner": "johndoe",
                "redirects": redirects,
                "created_at": "2024-01-01T09:00:00",
            })
        })
        .collect();
    Ok(Json(Value::Array(urls)))
}

async fn shorten(headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    authorize(&headers)?;
    Ok(Json(json!({
        "url": body["url"],
        "short": "new123",
        "owner": "johndoe",
        "redirects": 0,
        "created_at": "2024-01-03T12:00:00",
    })))
}

async fn redirects(headers: HeaderMap, Path(short): Path<String>) -> Reply {
    authorize(&headers)?;
    match short.as_str() {
        "abc" => Ok(Json(json!([
            "2024-01-01T10:15:00Z",
            "2024-01-01T10:45:00Z",
            "2024-01-02T09:00:00Z",
        ]))),
        "weird" => Ok(Json(json!({ "detail": "not a list" }))),
        "mixed" => Ok(Json(json!([
            "2024-01-01T10:15:00Z",
            "garbage",
            1704103200000_i64,
        ]))),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(Json(json!([])))
        }
        _ => Err(failure(StatusCode::NOT_FOUND, "Not Found")),
    }
}
