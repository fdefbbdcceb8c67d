// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        permissions::{DELETE_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS},
        require_permission, Authorizer,
    },
    models::{
        CreateDrinkRequest, DeleteResponse, DrinkLong, DrinkShort, DrinksResponse, Ingredient,
        IngredientShort, MenuResponse, UpdateDrinkRequest,
    },
    state::AppState,
};

pub mod drinks;
pub mod extract;
pub mod health;

/// Put `route` behind a permission gate.
fn gated(
    route: MethodRouter<AppState>,
    authorizer: &Authorizer,
    permission: &'static str,
) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(
        authorizer.gate(permission),
        require_permission,
    ))
}

pub fn router(state: AppState) -> Router {
    let authorizer = state.authorizer.clone();

    let api_routes = Router::new()
        .route(
            "/drinks",
            get(drinks::list_drinks).merge(gated(
                post(drinks::create_drink),
                &authorizer,
                POST_DRINKS,
            )),
        )
        .route(
            "/drinks-detail",
            gated(get(drinks::drinks_detail), &authorizer, GET_DRINKS_DETAIL),
        )
        .route(
            "/drinks/{id}",
            gated(patch(drinks::update_drink), &authorizer, PATCH_DRINKS).merge(gated(
                delete(drinks::delete_drink),
                &authorizer,
                DELETE_DRINKS,
            )),
        )
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        drinks::list_drinks,
        drinks::drinks_detail,
        drinks::create_drink,
        drinks::update_drink,
        drinks::delete_drink,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Ingredient,
            IngredientShort,
            DrinkShort,
            DrinkLong,
            CreateDrinkRequest,
            UpdateDrinkRequest,
            MenuResponse,
            DrinksResponse,
            DeleteResponse
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Drinks", description = "Drink menu and recipe management"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

/// Registers the `bearer` JWT scheme referenced by gated routes.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::test_support::{
        issue_token, jwks_document, key_material, now, valid_claims, TEST_AUDIENCE, TEST_DOMAIN,
        TEST_KID,
    };
    use crate::auth::AuthConfig;
    use crate::store::InMemoryStore;
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Method, Request, StatusCode},
    };
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// State whose authorizer reads keys from `jwks_url`.
    pub(crate) fn test_state(jwks_url: &str) -> AppState {
        let config = AuthConfig::new(TEST_DOMAIN, TEST_AUDIENCE).with_jwks_url(jwks_url);
        let authorizer = Authorizer::new(config).expect("authorizer");
        AppState::new(InMemoryStore::new(), authorizer)
    }

    async fn app_with_jwks(server: &MockServer) -> Router {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/.well-known/jwks.json");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(jwks_document(TEST_KID).to_string());
            })
            .await;
        router(test_state(&server.url("/.well-known/jwks.json")))
    }

    fn token(permissions: &[&str]) -> String {
        issue_token(
            &key_material().encoding,
            Some(TEST_KID),
            valid_claims(permissions),
        )
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn mocha() -> Value {
        json!({
            "title": "mocha",
            "recipe": [{"name": "chocolate", "color": "brown", "parts": 2}]
        })
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_state("http://127.0.0.1:9/.well-known/jwks.json"));
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn missing_header_on_protected_route() {
        let server = MockServer::start_async().await;
        let app = app_with_jwks(&server).await;

        let (status, body) = send(&app, request(Method::GET, "/drinks-detail", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": 401,
                "message": "Authorization header missing."
            })
        );
    }

    #[tokio::test]
    async fn token_without_permission_is_forbidden() {
        let server = MockServer::start_async().await;
        let app = app_with_jwks(&server).await;
        let token = token(&["get:drinks-detail"]);

        let (status, body) = send(
            &app,
            request(Method::POST, "/drinks", Some(&token), Some(mocha())),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], 403);
        assert_eq!(
            body["message"],
            "The user doesn't have the required permission"
        );
    }

    #[tokio::test]
    async fn public_menu_needs_no_token() {
        let server = MockServer::start_async().await;
        let app = app_with_jwks(&server).await;

        let (status, body) = send(&app, request(Method::GET, "/drinks", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "drinks": []}));
    }

    #[tokio::test]
    async fn manager_lifecycle() {
        let server = MockServer::start_async().await;
        let app = app_with_jwks(&server).await;
        let manager = token(&[
            "get:drinks-detail",
            "post:drinks",
            "patch:drinks",
            "delete:drinks",
        ]);

        let (status, body) = send(
            &app,
            request(Method::POST, "/drinks", Some(&manager), Some(mocha())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["drinks"][0]["id"].as_u64().unwrap();

        let (_, menu) = send(&app, request(Method::GET, "/drinks", None, None)).await;
        assert_eq!(
            menu["drinks"][0]["recipe"][0],
            json!({"color": "brown", "parts": 2})
        );

        let (status, detail) = send(
            &app,
            request(Method::GET, "/drinks-detail", Some(&manager), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["drinks"][0]["recipe"][0]["name"], "chocolate");

        let (status, patched) = send(
            &app,
            request(
                Method::PATCH,
                &format!("/drinks/{id}"),
                Some(&manager),
                Some(json!({"title": "white mocha"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["drinks"][0]["title"], "white mocha");

        let (status, deleted) = send(
            &app,
            request(Method::DELETE, &format!("/drinks/{id}"), Some(&manager), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted, json!({"success": true, "delete": id}));

        let (status, body) = send(
            &app,
            request(Method::DELETE, &format!("/drinks/{id}"), Some(&manager), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "resource not found");
    }

    #[tokio::test]
    async fn each_method_checks_its_own_permission() {
        let server = MockServer::start_async().await;
        let app = app_with_jwks(&server).await;
        let editor = token(&["patch:drinks"]);

        let (status, _) = send(
            &app,
            request(Method::DELETE, "/drinks/1", Some(&editor), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            request(
                Method::PATCH,
                "/drinks/1",
                Some(&editor),
                Some(json!({"title": "latte"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unreadable_body_gets_error_envelope() {
        let server = MockServer::start_async().await;
        let app = app_with_jwks(&server).await;
        let manager = token(&["post:drinks", "patch:drinks"]);
        let unprocessable = json!({"success": false, "error": 422, "message": "unprocessable"});

        let (status, body) = send(
            &app,
            request(Method::POST, "/drinks", Some(&manager), Some(json!({"recipe": []}))),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, unprocessable);

        let no_content_type = Request::builder()
            .method(Method::POST)
            .uri("/drinks")
            .header(AUTHORIZATION, format!("Bearer {manager}"))
            .body(Body::from(mocha().to_string()))
            .unwrap();
        let (status, body) = send(&app, no_content_type).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, unprocessable);

        let (status, body) = send(
            &app,
            request(Method::PATCH, "/drinks/1", Some(&manager), Some(json!({"title": 5}))),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, unprocessable);
    }

    #[tokio::test]
    async fn non_numeric_id_is_not_found() {
        let server = MockServer::start_async().await;
        let app = app_with_jwks(&server).await;
        let manager = token(&["patch:drinks", "delete:drinks"]);
        let not_found = json!({"success": false, "error": 404, "message": "resource not found"});

        let (status, body) = send(
            &app,
            request(
                Method::PATCH,
                "/drinks/abc",
                Some(&manager),
                Some(json!({"title": "latte"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, not_found);

        let (status, body) = send(
            &app,
            request(Method::DELETE, "/drinks/abc", Some(&manager), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, not_found);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let server = MockServer::start_async().await;
        let app = app_with_jwks(&server).await;
        let mut claims = valid_claims(&["get:drinks-detail"]);
        claims["exp"] = json!(now() - 60);
        let expired = issue_token(&key_material().encoding, Some(TEST_KID), claims);

        let (status, body) = send(
            &app,
            request(Method::GET, "/drinks-detail", Some(&expired), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token expired.");
    }

    #[tokio::test]
    async fn malformed_header_is_rejected() {
        let server = MockServer::start_async().await;
        let app = app_with_jwks(&server).await;

        let request = Request::builder()
            .uri("/drinks-detail")
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["message"],
            "Authorization header must be in \"bearer\" token format."
        );
    }

    #[tokio::test]
    async fn unreachable_key_set_is_service_unavailable() {
        let app = router(test_state("http://127.0.0.1:9/.well-known/jwks.json"));
        let token = token(&["get:drinks-detail"]);

        let (status, body) = send(
            &app,
            request(Method::GET, "/drinks-detail", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], "Unable to fetch signing keys.");
    }

    #[test]
    fn openapi_declares_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
        assert!(doc.paths.paths.contains_key("/drinks-detail"));
    }
}
