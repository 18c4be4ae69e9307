// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # HTTP API
//!
//! Route table of the Stride backend. Versioned routes live under `/api/v1`;
//! probes and Swagger UI sit at the root.
//!
//! Protected methods are wrapped individually with [`protect`], so a path
//! can serve a public `GET` next to a protected `POST`.

use axum::{
    http::Request,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::protect,
    error::{ApiError, ErrorBody},
    models::{
        Club, ClubMember, CreateRelationRequest, NewClub, NewClubMember, NewRunLog, RunLog,
        UpdateRelationRequest, User, UserPreferences,
    },
    relations::{RelationContext, RelationError, UserRelation},
    state::AppState,
    storage::StoreError,
};

pub mod clubs;
pub mod extract;
pub mod health;
pub mod logs;
pub mod relations;
pub mod users;

pub fn router(state: AppState) -> Router {
    let gate = &state.auth;

    let v1_routes = Router::new()
        .route("/users", protect(gate, post(users::create_user)))
        .route("/users/{user_id}", get(users::get_user))
        .route("/users/me", protect(gate, get(users::get_self)))
        .route(
            "/users/me/preferences",
            protect(
                gate,
                get(users::get_preferences).put(users::update_preferences),
            ),
        )
        .route(
            "/users/me/relations",
            protect(
                gate,
                post(relations::create_relation).get(relations::list_relations),
            ),
        )
        .route(
            "/users/me/relations/{relation_id}",
            protect(
                gate,
                put(relations::update_relation).delete(relations::delete_relation),
            ),
        )
        .route(
            "/users/me/logs",
            protect(gate, post(logs::add_run_log).get(logs::list_run_logs)),
        )
        .route(
            "/clubs",
            get(clubs::list_clubs).merge(protect(gate, post(clubs::create_club))),
        )
        .route(
            "/clubs/{club_id}",
            get(clubs::get_club).merge(protect(gate, delete(clubs::delete_club))),
        )
        .route(
            "/clubs/{club_id}/members",
            protect(
                gate,
                post(clubs::add_club_member).get(clubs::list_club_members),
            ),
        )
        .route(
            "/clubs/{club_id}/members/{member_id}",
            protect(gate, delete(clubs::remove_club_member)),
        );

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        tracing::info_span!(
            "http.request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    Router::new()
        .nest("/api/v1", v1_routes)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(trace_layer)
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::new()),
        )
        .layer(CorsLayer::permissive())
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Translate a storage failure into its HTTP error.
///
/// Server-side causes are logged and replaced by an opaque body.
pub(crate) fn store_failure(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(what) => {
            ApiError::not_found("Not found", format!("{what} does not exist"))
        }
        StoreError::AlreadyExists(what) => {
            ApiError::conflict("Already exists", format!("{what} already exists"))
        }
        StoreError::NotImplemented(what) => ApiError::not_implemented(what),
        other => {
            tracing::error!(error = %other, "Storage operation failed");
            ApiError::internal("Database error")
        }
    }
}

/// Like [`store_failure`], except a missing row means the caller has no account.
pub(crate) fn account_failure(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(_) => ApiError::unregistered_account(),
        other => store_failure(other),
    }
}

pub(crate) fn relation_failure(err: RelationError) -> ApiError {
    match err {
        RelationError::UnknownContext(context) => ApiError::bad_request(
            "Unknown relation context",
            format!("{context:?} is not one of friend, club, blocked"),
        ),
        RelationError::NotImplemented(what) => ApiError::not_implemented(what),
        RelationError::Store(err) => store_failure(err),
    }
}

// =============================================================================
// OpenAPI
// =============================================================================

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        users::create_user,
        users::get_user,
        users::get_self,
        users::get_preferences,
        users::update_preferences,
        relations::create_relation,
        relations::list_relations,
        relations::update_relation,
        relations::delete_relation,
        logs::add_run_log,
        logs::list_run_logs,
        clubs::create_club,
        clubs::list_clubs,
        clubs::get_club,
        clubs::delete_club,
        clubs::add_club_member,
        clubs::list_club_members,
        clubs::remove_club_member,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            User,
            UserPreferences,
            RunLog,
            NewRunLog,
            CreateRelationRequest,
            UpdateRelationRequest,
            UserRelation,
            RelationContext,
            Club,
            NewClub,
            ClubMember,
            NewClubMember,
            ErrorBody,
            health::HealthChecks,
            health::HealthResponse,
            health::ReadyResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Accounts, profiles and preferences"),
        (name = "Relations", description = "Friend requests, club memberships and blocks"),
        (name = "Logs", description = "Recorded runs"),
        (name = "Clubs", description = "Clubs and their members"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        extract::{Query, State},
        http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, StatusCode},
        response::{IntoResponse, Response},
        Json,
    };
    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use tower::ServiceExt;
    use url::Url;

    use crate::auth::{AuthGate, ClaimCache, TokenIntrospector};
    use crate::relations::{RelationCollection, RelationStore};
    use crate::storage::{Database, RedbStore};

    const CLIENT_ID: &str = "CID";

    async fn tokeninfo(
        State(tokens): State<Arc<HashMap<String, Value>>>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        match query.get("id_token").and_then(|t| tokens.get(t)) {
            Some(claims) => Json(claims.clone()).into_response(),
            None => StatusCode::BAD_REQUEST.into_response(),
        }
    }

    /// Identity provider knowing `ada@x.com` (token `ADA`), `bob@x.com`
    /// (token `BOB`) and a token without email (`ANON`).
    async fn spawn_idp() -> Url {
        let tokens: HashMap<String, Value> = [
            ("ADA", json!({"aud": CLIENT_ID, "email": "ada@x.com", "name": "Ada"})),
            ("BOB", json!({"aud": CLIENT_ID, "email": "bob@x.com"})),
            ("ANON", json!({"aud": CLIENT_ID})),
        ]
        .into_iter()
        .map(|(token, claims)| (token.to_string(), claims))
        .collect();

        let app = Router::new()
            .route("/tokeninfo", get(tokeninfo))
            .with_state(Arc::new(tokens));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Url::parse(&format!("http://{addr}/tokeninfo")).unwrap()
    }

    struct TestApp {
        router: Router,
        db: Arc<RedbStore>,
        cache: ClaimCache,
        _dir: tempfile::TempDir,
    }

    impl TestApp {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let db = Arc::new(RedbStore::open(&dir.path().join("api.redb")).unwrap());
            let cache = ClaimCache::new();
            let gate = AuthGate::new(
                CLIENT_ID,
                TokenIntrospector::new(spawn_idp().await).unwrap(),
                cache.clone(),
            );
            let state = AppState::new(db.clone() as Arc<dyn Database>, gate);
            Self {
                router: router(state),
                db,
                cache,
                _dir: dir,
            }
        }

        async fn call(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        async fn register(&self, token: &str) -> Value {
            let (status, user) = self.call(Method::POST, "/api/v1/users", Some(token), None).await;
            assert_eq!(status, StatusCode::CREATED);
            user
        }
    }

    #[tokio::test]
    async fn register_and_fetch_profiles() {
        let app = TestApp::new().await;

        let ada = app.register("ADA").await;
        assert_eq!(ada["name"], "Ada");
        assert_eq!(ada["email"], "ada@x.com");
        assert_eq!(ada["country"], "USA");

        // Name falls back to the email local part
        let bob = app.register("BOB").await;
        assert_eq!(bob["name"], "bob");

        let (status, me) = app.call(Method::GET, "/api/v1/users/me", Some("ADA"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me, ada);

        let uri = format!("/api/v1/users/{}", ada["id"]);
        let (status, public) = app.call(Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(public["name"], "Ada");
        assert!(public.get("email").is_none());

        assert!(app.cache.is_empty());
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let app = TestApp::new().await;
        app.register("ADA").await;

        let (status, body) = app.call(Method::POST, "/api/v1/users", Some("ADA"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 409);
    }

    #[tokio::test]
    async fn unknown_user_id_is_not_found() {
        let app = TestApp::new().await;
        let (status, body) = app.call(Method::GET, "/api/v1/users/77", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
        assert_eq!(body["details"], "No user with the id 77 exists");
    }

    #[tokio::test]
    async fn unregistered_account_gets_404_on_self_routes() {
        let app = TestApp::new().await;

        for path in ["/api/v1/users/me", "/api/v1/users/me/preferences", "/api/v1/users/me/logs"] {
            let (status, body) = app.call(Method::GET, path, Some("ADA"), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
            assert_eq!(
                body,
                json!({
                    "code": 404,
                    "message": "Account not registered",
                    "details": "The valid token does not belong to any user account"
                })
            );
        }
        assert!(app.cache.is_empty());
    }

    #[tokio::test]
    async fn token_without_email_is_rejected_by_handler() {
        let app = TestApp::new().await;
        let (status, body) = app.call(Method::GET, "/api/v1/users/me", Some("ANON"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Token lacks email claim");
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let app = TestApp::new().await;

        for (method, path) in [
            (Method::POST, "/api/v1/users"),
            (Method::GET, "/api/v1/users/me/preferences"),
            (Method::POST, "/api/v1/users/me/relations"),
            (Method::DELETE, "/api/v1/users/me/relations/1?context=friend"),
            (Method::GET, "/api/v1/users/me/logs"),
            (Method::POST, "/api/v1/clubs"),
            (Method::DELETE, "/api/v1/clubs/1"),
            (Method::GET, "/api/v1/clubs/1/members"),
        ] {
            let (status, body) = app.call(method, path, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
            assert_eq!(body["code"], 401);
        }

        let (status, _) = app.call(Method::GET, "/api/v1/users/me", Some("FORGED"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn preferences_round_trip() {
        let app = TestApp::new().await;
        app.register("ADA").await;

        let (status, prefs) = app
            .call(Method::GET, "/api/v1/users/me/preferences", Some("ADA"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(prefs, json!({"uses-metric": false}));

        let (status, _) = app
            .call(
                Method::PUT,
                "/api/v1/users/me/preferences",
                Some("ADA"),
                Some(json!({"uses-metric": true})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, prefs) = app
            .call(Method::GET, "/api/v1/users/me/preferences", Some("ADA"), None)
            .await;
        assert_eq!(prefs, json!({"uses-metric": true}));
    }

    #[tokio::test]
    async fn run_logs_are_recorded_for_the_caller() {
        let app = TestApp::new().await;
        let ada = app.register("ADA").await;
        app.register("BOB").await;

        let run = json!({
            "started-at": "2026-03-01T07:00:00Z",
            "ended-at": "2026-03-01T07:30:00Z",
            "distance": 5000.0,
            "split-interval": 1000.0,
            "splits": [360.0, 355.0, 362.0, 359.0, 350.0],
            "comment": "easy"
        });
        let (status, created) = app
            .call(Method::POST, "/api/v1/users/me/logs", Some("ADA"), Some(run))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["user-id"], ada["id"]);

        let (status, logs) = app
            .call(Method::GET, "/api/v1/users/me/logs", Some("ADA"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(logs.as_array().map(Vec::len), Some(1));
        assert_eq!(logs[0]["comment"], "easy");

        let (_, logs) = app.call(Method::GET, "/api/v1/users/me/logs", Some("BOB"), None).await;
        assert_eq!(logs, json!([]));
    }

    #[tokio::test]
    async fn friend_request_lifecycle() {
        let app = TestApp::new().await;
        app.register("ADA").await;
        let bob = app.register("BOB").await;

        let (status, created) = app
            .call(
                Method::POST,
                "/api/v1/users/me/relations",
                Some("ADA"),
                Some(json!({"receiver-id": bob["id"], "context": "friend"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_u64().unwrap();

        let uri = format!("/api/v1/users/me/relations/{id}");
        let (status, _) = app
            .call(
                Method::PUT,
                &uri,
                Some("BOB"),
                Some(json!({"context": "friend", "accept": true})),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app
            .call(Method::DELETE, &format!("{uri}?context=friend"), Some("ADA"), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        // Accepting a relation that no longer exists
        let (status, _) = app
            .call(
                Method::PUT,
                &uri,
                Some("BOB"),
                Some(json!({"context": "friend", "accept": true})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn club_relation_is_written_to_club_collection() {
        let app = TestApp::new().await;
        app.register("ADA").await;

        let (status, created) = app
            .call(
                Method::POST,
                "/api/v1/users/me/relations",
                Some("ADA"),
                Some(json!({"receiver-id": 42, "context": "club"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_u64().unwrap();

        assert!(matches!(
            app.db.accept_relation(RelationCollection::UserRelations, id),
            Err(StoreError::NotFound(_))
        ));
        app.db
            .accept_relation(RelationCollection::ClubRelations, id)
            .unwrap();
    }

    #[tokio::test]
    async fn relation_errors_map_to_statuses() {
        let app = TestApp::new().await;
        app.register("ADA").await;

        let (status, body) = app
            .call(
                Method::POST,
                "/api/v1/users/me/relations",
                Some("ADA"),
                Some(json!({"receiver-id": 2, "context": "enemy"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Unknown relation context");

        let (status, _) = app
            .call(
                Method::PUT,
                "/api/v1/users/me/relations/1",
                Some("ADA"),
                Some(json!({"context": "blocked", "accept": false})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

        let (status, _) = app
            .call(Method::GET, "/api/v1/users/me/relations", Some("ADA"), None)
            .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

        let (status, _) = app
            .call(Method::DELETE, "/api/v1/users/me/relations/1?context=", Some("ADA"), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_requests_get_the_error_body() {
        let app = TestApp::new().await;
        app.register("ADA").await;

        let (status, body) = app
            .call(Method::DELETE, "/api/v1/users/me/relations/1", Some("ADA"), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
        assert_eq!(body["message"], "Invalid query string");
        assert!(body["details"].as_str().unwrap().contains("context"));

        let (status, body) = app
            .call(
                Method::PUT,
                "/api/v1/users/me/relations/1",
                Some("ADA"),
                Some(json!({"accept": true})),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], 422);
        assert_eq!(body["message"], "Invalid request body");

        let (status, body) = app
            .call(Method::POST, "/api/v1/users/me/logs", Some("ADA"), None)
            .await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["code"], 415);

        let (status, body) = app.call(Method::GET, "/api/v1/users/abc", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({
                "code": 404,
                "message": "User not found",
                "details": "No user with the id abc exists"
            })
        );

        let (status, body) = app.call(Method::GET, "/api/v1/clubs/abc", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
        assert_eq!(body["message"], "Not found");
    }

    #[tokio::test]
    async fn club_endpoints_are_not_implemented() {
        let app = TestApp::new().await;
        app.register("ADA").await;

        let (status, body) = app.call(Method::GET, "/api/v1/clubs", None, None).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["code"], 501);

        let (status, _) = app.call(Method::GET, "/api/v1/clubs/3", None, None).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

        let (status, _) = app
            .call(
                Method::POST,
                "/api/v1/clubs",
                Some("ADA"),
                Some(json!({"name": "Morning Milers"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

        let (status, _) = app
            .call(Method::DELETE, "/api/v1/clubs/3/members/4", Some("ADA"), None)
            .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn health_probes_and_request_ids() {
        let app = TestApp::new().await;

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let (status, body) = app.call(Method::GET, "/health/live", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[test]
    fn openapi_document_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/users/me/relations/{relation_id}"));
        assert!(doc.paths.paths.contains_key("/api/v1/clubs/{club_id}/members"));
    }
}
