//! HTTP request handlers

use super::state::AppState;
use super::templates::Templates;
use crate::search::UserEvent;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use tracing::warn;

/// Search box form
#[derive(Debug, Deserialize)]
pub struct QueryForm {
    #[serde(default)]
    pub q: String,
}

/// Suggestion pick form
#[derive(Debug, Deserialize)]
pub struct SelectForm {
    pub title: String,
}

/// Search page handler
pub async fn index(State(state): State<AppState>) -> Response {
    let snapshot = state.search.snapshot();
    let ctx = Templates::index_context(state.instance_name(), &snapshot);

    match state.templates.render_with_context("index.html", &ctx) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// Dispatch `events` in order, letting each settle, then go back to the page.
async fn settle_and_redirect(state: &AppState, events: Vec<UserEvent>) -> Response {
    for event in events {
        if let Err(e) = state
            .search
            .dispatch_and_settle(event, state.settle_timeout())
            .await
        {
            warn!("Search did not settle: {}", e);
            break;
        }
    }
    Redirect::to("/").into_response()
}

/// Query edit
pub async fn search(State(state): State<AppState>, Form(form): Form<QueryForm>) -> Response {
    settle_and_redirect(&state, vec![UserEvent::Edit { term: form.q }]).await
}

pub async fn select(State(state): State<AppState>, Form(form): Form<SelectForm>) -> Response {
    settle_and_redirect(&state, vec![UserEvent::Select { title: form.title }]).await
}

pub async fn scrape(State(state): State<AppState>) -> Response {
    settle_and_redirect(&state, vec![UserEvent::Scrape]).await
}

/// Enter pressed; a changed query is looked up before submitting.
pub async fn submit(State(state): State<AppState>, Form(form): Form<QueryForm>) -> Response {
    let mut events = Vec::with_capacity(2);
    if form.q != state.search.snapshot().query {
        events.push(UserEvent::Edit { term: form.q });
    }
    events.push(UserEvent::Submit);
    settle_and_redirect(&state, events).await
}

/// Current search snapshot as JSON
pub async fn api_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.search.snapshot())
}

/// Dispatch one JSON-encoded intent and return the settled snapshot
pub async fn api_event(State(state): State<AppState>, Json(event): Json<UserEvent>) -> Response {
    match state
        .search
        .dispatch_and_settle(event, state.settle_timeout())
        .await
    {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => {
            warn!("Search did not settle: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "error": e.to_string(),
                    "snapshot": state.search.snapshot(),
                })),
            )
                .into_response()
        }
    }
}

/// Metrics handler
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::metrics::Metrics;
    use crate::network::HttpClient;
    use crate::search::{Backends, Orchestrator};
    use crate::web::create_router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct TestApp {
        base: String,
        http: reqwest::Client,
        _store: MockServer,
    }

    async fn spawn_app(store: MockServer) -> TestApp {
        let mut settings = Settings::default();
        settings.store.url = store.uri();
        settings.scrape.base_url = store.uri();
        settings.search.debounce_ms = 20;

        let client = HttpClient::new().unwrap();
        let metrics = Arc::new(Metrics::new());
        let backends = Backends::from_settings(client, &settings);
        let handle = Orchestrator::from_settings(backends, &settings, metrics.clone());
        let state = AppState::new(settings, handle, metrics).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });

        TestApp {
            base: format!("http://{}", addr),
            http: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap(),
            _store: store,
        }
    }

    async fn mount_suggestions(store: &MockServer, term: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/cards"))
            .and(query_param("title", format!("ilike.*{}*", term)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(store)
            .await;
    }

    #[tokio::test]
    async fn test_health() {
        let app = spawn_app(MockServer::start().await).await;
        let body: Value = app
            .http
            .get(format!("{}/health", app.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_api_event_returns_settled_snapshot() {
        let store = MockServer::start().await;
        mount_suggestions(&store, "Char", json!([{"id": 1, "title": "Charizard"}])).await;
        let app = spawn_app(store).await;

        let snapshot: Value = app
            .http
            .post(format!("{}/api/events", app.base))
            .json(&json!({"type": "edit", "term": "Char"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(snapshot["query"], "Char");
        assert_eq!(snapshot["suggestions"][0]["title"], "Charizard");
        assert_eq!(snapshot["suggestions"].as_array().map(Vec::len), Some(1));

        let state: Value = app
            .http
            .get(format!("{}/api/state", app.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(state["phase"], "has_suggestions");
    }

    #[tokio::test]
    async fn test_select_form_loads_card_group() {
        let store = MockServer::start().await;
        mount_suggestions(&store, "Char", json!([{"id": 1, "title": "Charizard"}])).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/cards"))
            .and(query_param("title", "eq.Charizard"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 1,
                "title": "Charizard",
                "sold_cards": [
                    {"link_url": "https://ebay/1", "sold_date": "2024-01-01", "price": 120.5, "currency": "£"},
                    {"link_url": "https://ebay/2", "sold_date": "2024-01-02", "price": 99.0, "currency": "£"}
                ]
            }])))
            .mount(&store)
            .await;
        let app = spawn_app(store).await;

        let response = app
            .http
            .post(format!("{}/search", app.base))
            .form(&[("q", "Char")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);

        app.http
            .post(format!("{}/select", app.base))
            .form(&[("title", "Charizard")])
            .send()
            .await
            .unwrap();

        let page = app
            .http
            .get(format!("{}/", app.base))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.contains("2 sales found for this card group."));
        assert!(page.contains("£120.50"));
        assert!(page.contains("£99.00"));
    }

    #[tokio::test]
    async fn test_submit_without_suggestions_scrapes() {
        let store = MockServer::start().await;
        mount_suggestions(&store, "Zzzznotfound", json!([])).await;
        Mock::given(method("GET"))
            .and(path("/scrape_cards"))
            .and(query_param("query", "Zzzznotfound"))
            .and(query_param("region", "uk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
            .expect(1)
            .mount(&store)
            .await;
        let app = spawn_app(store).await;

        app.http
            .post(format!("{}/submit", app.base))
            .form(&[("q", "Zzzznotfound")])
            .send()
            .await
            .unwrap();

        let state: Value = app
            .http
            .get(format!("{}/api/state", app.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(state["phase"], "no_results");
        assert_eq!(state["error_message"], "No records found by scrape");

        let stats: Value = app
            .http
            .get(format!("{}/stats", app.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats["operations"]["scrape"]["issued"], 1);
    }
}
