use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::guard;
use crate::state::AppState;
use crate::views::{self, all_urls, auth, link_clicks, shorten};

pub fn router(state: Arc<AppState>) -> Router {
    // Visitor-only pages: /register, /login
    let public_routes = Router::new()
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            guard::requires_no_session,
        ));

    // Signed-in pages and their fragments
    let protected_routes = Router::new()
        .route("/shorten", get(shorten::shorten_page).post(shorten::shorten))
        .route("/all-urls", get(all_urls::all_urls))
        .route("/link/{short}", get(link_clicks::link_clicks))
        .route(
            "/fragments/link/{short}/chart",
            get(link_clicks::fragment_chart),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            guard::requires_session,
        ));

    Router::new()
        .route("/", get(views::index))
        .route("/logout", post(auth::logout))
        .route("/styles.css", get(views::styles))
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(guard::reject_cross_site))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::api::BackendClient;
    use crate::session::Session;
    use crate::test_support::{MockBackend, TEST_PASSWORD, TEST_TOKEN};

    use super::*;

    struct TestApp {
        router: Router,
        state: Arc<AppState>,
        backend: MockBackend,
    }

    impl TestApp {
        async fn new(signed_in: bool) -> Self {
            let backend = MockBackend::spawn().await;
            let session = Session::in_memory();
            if signed_in {
                session.sign_in(TEST_TOKEN).unwrap();
            }
            let client = BackendClient::new(&backend.url).unwrap();
            let state = Arc::new(AppState::new(client, session, "http://sho.rt"));
            TestApp {
                router: router(Arc::clone(&state)),
                state,
                backend,
            }
        }

        async fn get(&self, uri: &str) -> Response {
            let request = Request::get(uri).body(Body::empty()).unwrap();
            self.router.clone().oneshot(request).await.unwrap()
        }

        async fn post_form(&self, uri: &str, body: &str) -> Response {
            let request = Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_owned()))
                .unwrap();
            self.router.clone().oneshot(request).await.unwrap()
        }
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn root_goes_to_login() {
        let app = TestApp::new(false).await;
        let response = app.get("/").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn protected_page_without_session_redirects_to_login() {
        let app = TestApp::new(false).await;
        for uri in ["/shorten", "/all-urls", "/link/abc"] {
            let response = app.get(uri).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), "/login", "{uri}");
        }
    }

    #[tokio::test]
    async fn public_page_with_session_redirects_home() {
        let app = TestApp::new(true).await;
        for uri in ["/login", "/register"] {
            let response = app.get(uri).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), "/shorten", "{uri}");
        }
    }

    #[tokio::test]
    async fn htmx_request_without_session_gets_hx_redirect() {
        let app = TestApp::new(false).await;
        let request = Request::get("/fragments/link/abc/chart")
            .header("HX-Request", "true")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["hx-redirect"], "/login");
    }

    #[tokio::test]
    async fn short_password_is_rejected_before_any_backend_call() {
        let app = TestApp::new(false).await;
        let response = app
            .post_form("/register", "username=johndoe&password=1234567&full_name=John+Doe")
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("The password must be at least 8 characters long."));
        assert_eq!(app.backend.register_calls.load(Ordering::SeqCst), 0);
        assert!(!app.state.session.is_signed_in());
    }

    #[tokio::test]
    async fn registration_signs_in_and_goes_home() {
        let app = TestApp::new(false).await;
        let response = app
            .post_form(
                "/register",
                &format!("username=janedoe&password={TEST_PASSWORD}&full_name=Jane"),
            )
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/shorten");
        assert_eq!(app.backend.register_calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.state.session.token().as_deref(), Some(TEST_TOKEN));
    }

    #[tokio::test]
    async fn taken_username_is_reported_inline() {
        let app = TestApp::new(false).await;
        let response = app
            .post_form(
                "/register",
                &format!("username=taken&password={TEST_PASSWORD}&full_name=Someone"),
            )
            .await;

        let body = body_text(response).await;
        assert!(body.contains("This login is already taken or another error occurred"));
        assert!(!app.state.session.is_signed_in());
    }

    #[tokio::test]
    async fn wrong_password_shows_login_error() {
        let app = TestApp::new(false).await;
        let response = app
            .post_form("/login", "username=johndoe&password=nope-nope")
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Invalid login or password"));
        assert!(!app.state.session.is_signed_in());
    }

    #[tokio::test]
    async fn empty_login_fields_are_flagged() {
        let app = TestApp::new(false).await;
        let response = app.post_form("/login", "username=&password=").await;
        let body = body_text(response).await;
        assert!(body.contains("The Login field cannot be empty"));
        assert!(body.contains("The Password field cannot be empty"));
    }

    #[tokio::test]
    async fn login_stores_token() {
        let app = TestApp::new(false).await;
        let response = app
            .post_form("/login", &format!("username=johndoe&password={TEST_PASSWORD}"))
            .await;

        assert_eq!(location(&response), "/shorten");
        assert_eq!(app.state.session.token().as_deref(), Some(TEST_TOKEN));
    }

    #[tokio::test]
    async fn logout_erases_token() {
        let app = TestApp::new(true).await;
        let response = app.post_form("/logout", "").await;

        assert_eq!(location(&response), "/login");
        assert!(!app.state.session.is_signed_in());
    }

    #[tokio::test]
    async fn shorten_page_greets_and_previews_links() {
        let app = TestApp::new(true).await;
        let body = body_text(app.get("/shorten").await).await;

        assert!(body.contains("Welcome, John Doe"));
        assert_eq!(body.matches(">Statistics<").count(), 3);
        assert!(body.contains("href=\"/link/abc\""));
        assert!(!body.contains("href=\"/link/jkl\""));
        assert!(body.contains("Show all..."));
    }

    #[tokio::test]
    async fn shortening_shows_new_link() {
        let app = TestApp::new(true).await;

        let blank = body_text(app.post_form("/shorten", "url=++").await).await;
        assert!(blank.contains("Please enter a URL."));

        let created = body_text(
            app.post_form("/shorten", "url=https%3A%2F%2Fexample.com%2Flong")
                .await,
        )
        .await;
        assert!(created.contains("Your short link"));
        assert!(created.contains("http://sho.rt/new123"));
    }

    #[tokio::test]
    async fn all_urls_lists_every_link() {
        let app = TestApp::new(true).await;
        let body = body_text(app.get("/all-urls").await).await;

        assert_eq!(body.matches("View click chart").count(), 4);
        assert!(body.contains("January 1, 2024, 09:00 AM"));
        assert!(body.contains("Number of clicks"));
    }

    #[tokio::test]
    async fn chart_page_buckets_redirects() {
        let app = TestApp::new(true).await;
        let body = body_text(app.get("/link/abc?granularity=hour").await).await;

        assert!(body.contains("<svg"));
        assert!(body.contains("2024-01-01 10:00: 2"));
        assert!(body.contains("2024-01-02 09:00: 1"));
        assert!(body.contains("http://sho.rt/abc"));
    }

    #[tokio::test]
    async fn chart_fragment_defaults_to_days() {
        let app = TestApp::new(true).await;
        let body = body_text(app.get("/fragments/link/abc/chart").await).await;

        assert!(body.contains("2024-01-01: 2"));
        assert!(body.contains("By minutes"));
        assert!(!body.contains("<html"));
    }

    #[tokio::test]
    async fn non_array_redirects_render_no_data() {
        let app = TestApp::new(true).await;
        let body = body_text(app.get("/fragments/link/weird/chart").await).await;
        assert!(body.contains("No data available to build the chart"));
    }

    #[tokio::test]
    async fn skipped_entries_are_noted() {
        let app = TestApp::new(true).await;
        let uri = "/fragments/link/mixed/chart?granularity=day";
        let body = body_text(app.get(uri).await).await;
        assert!(body.contains("2024-01-01: 2"));
        assert!(body.contains("1 unreadable entry was skipped"));
    }

    #[tokio::test]
    async fn backend_failure_renders_inline_error() {
        let app = TestApp::new(true).await;
        let response = app.get("/fragments/link/missing/chart").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Error while loading clicks"));
    }

    #[tokio::test]
    async fn concurrent_chart_pages_both_render() {
        let app = TestApp::new(true).await;
        let (first, second) = tokio::join!(app.get("/link/slow"), app.get("/link/slow"));

        for response in [first, second] {
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_text(response).await;
            assert!(body.contains("No data available to build the chart"));
            assert!(body.contains("By days"));
        }
    }

    #[tokio::test]
    async fn newer_request_from_same_view_wins() {
        let app = TestApp::new(true).await;
        let stale = app.get("/fragments/link/slow/chart?view=5");
        let fresh = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            app.get("/fragments/link/abc/chart?view=5&granularity=hour").await
        };
        let (stale, fresh) = tokio::join!(stale, fresh);

        assert_eq!(stale.status(), StatusCode::NO_CONTENT);
        assert_eq!(fresh.status(), StatusCode::OK);
        assert!(body_text(fresh).await.contains("2024-01-01 10:00: 2"));
    }

    #[tokio::test]
    async fn overtaken_chart_page_reloads_its_chart() {
        let app = TestApp::new(true).await;
        let page = app.get("/link/slow?view=9");
        let fragment = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            app.get("/fragments/link/abc/chart?view=9").await
        };
        let (page, _) = tokio::join!(page, fragment);

        let body = body_text(page).await;
        assert!(body.contains("id=\"chart-container\""));
        assert!(body.contains("hx-trigger=\"load\""));
        assert!(body.contains("/fragments/link/slow/chart?granularity=day&amp;view=9"));
    }

    #[tokio::test]
    async fn cross_site_logout_is_refused() {
        let app = TestApp::new(true).await;
        let request = Request::post("/logout")
            .header(header::HOST, "127.0.0.1:3000")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(app.state.session.is_signed_in());

        let request = Request::post("/logout")
            .header("Sec-Fetch-Site", "cross-site")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(app.state.session.is_signed_in());
    }

    #[tokio::test]
    async fn same_origin_logout_is_accepted() {
        let app = TestApp::new(true).await;
        let request = Request::post("/logout")
            .header(header::HOST, "127.0.0.1:3000")
            .header(header::ORIGIN, "http://127.0.0.1:3000")
            .header("Sec-Fetch-Site", "same-origin")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(!app.state.session.is_signed_in());
    }

    #[tokio::test]
    async fn stylesheet_is_served() {
        let app = TestApp::new(false).await;
        let response = app.get("/styles.css").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
    }
}
