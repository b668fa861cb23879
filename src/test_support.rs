//! A cookie-carrying client over the full router, backed by the in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use crate::{app::build_app, state::AppState, store::memory::InMemoryStore, urls};

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub struct TestClient {
    app: Router,
    cookie: Option<String>,
    csrf: Option<String>,
    pub store: Arc<InMemoryStore>,
}

impl TestClient {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::default());
        let app = build_app(AppState::fake(store.clone()), MemoryStore::default());
        Self {
            app,
            cookie: None,
            csrf: None,
            store,
        }
    }

    /// Another browser against the same server: shared data, separate session.
    pub fn other_browser(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: None,
            csrf: None,
            store: self.store.clone(),
        }
    }

    async fn send(&mut self, mut req: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            req.headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }
        let res = self.app.clone().oneshot(req).await.unwrap();
        if let Some(set) = res.headers().get(header::SET_COOKIE) {
            let pair = set.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        let status = res.status();
        let location = res
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let req = Request::get(path).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn post(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let req = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
            .unwrap();
        self.send(req).await
    }

    /// The session's CSRF token, read once from the login form.
    pub async fn csrf(&mut self) -> String {
        if let Some(token) = &self.csrf {
            return token.clone();
        }
        let page = self.get("/login").await;
        let marker = "name=\"csrf_token\" value=\"";
        let start = page.body.find(marker).expect("csrf field") + marker.len();
        let len = page.body[start..].find('"').unwrap();
        let token = page.body[start..start + len].to_string();
        self.csrf = Some(token.clone());
        token
    }

    pub async fn register(&mut self, username: &str, password: &str) -> TestResponse {
        let token = self.csrf().await;
        let email = format!("{username}@example.com");
        self.post(
            "/register",
            &[
                ("username", username),
                ("password", password),
                ("email", email.as_str()),
                ("first_name", "First"),
                ("last_name", "Last"),
                ("csrf_token", token.as_str()),
            ],
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        let token = self.csrf().await;
        self.post(
            "/login",
            &[
                ("username", username),
                ("password", password),
                ("csrf_token", token.as_str()),
            ],
        )
        .await
    }

    pub async fn add_feedback(
        &mut self,
        path_user: &str,
        title: &str,
        content: &str,
    ) -> TestResponse {
        let token = self.csrf().await;
        self.post(
            &urls::add_feedback(path_user),
            &[
                ("title", title),
                ("content", content),
                ("csrf_token", token.as_str()),
            ],
        )
        .await
    }
}
