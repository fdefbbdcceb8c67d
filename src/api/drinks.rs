// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    api::extract::{JsonBody, PathParam},
    auth::Claims,
    error::ApiError,
    models::{
        CreateDrinkRequest, DeleteResponse, DrinksResponse, MenuResponse, UpdateDrinkRequest,
    },
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/drinks",
    tag = "Drinks",
    responses((status = 200, body = MenuResponse))
)]
pub async fn list_drinks(State(state): State<AppState>) -> Json<MenuResponse> {
    let store = state.store.read().await;
    Json(MenuResponse {
        success: true,
        drinks: store.list_drinks().iter().map(|drink| drink.short()).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/drinks-detail",
    tag = "Drinks",
    security(("bearer" = ["get:drinks-detail"])),
    responses(
        (status = 200, body = DrinksResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Permission not granted")
    )
)]
pub async fn drinks_detail(
    Claims(claims): Claims,
    State(state): State<AppState>,
) -> Json<DrinksResponse> {
    tracing::debug!(subject = claims.subject().unwrap_or("-"), "drink details requested");
    let store = state.store.read().await;
    Json(DrinksResponse {
        success: true,
        drinks: store.list_drinks().iter().map(|drink| drink.long()).collect(),
    })
}

#[utoipa::path(
    post,
    path = "/drinks",
    request_body = CreateDrinkRequest,
    tag = "Drinks",
    security(("bearer" = ["post:drinks"])),
    responses(
        (status = 200, body = DrinksResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Permission not granted"),
        (status = 422, description = "Body unreadable, title missing or already taken")
    )
)]
pub async fn create_drink(
    Claims(claims): Claims,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateDrinkRequest>,
) -> Result<Json<DrinksResponse>, ApiError> {
    let mut store = state.store.write().await;
    let drink = store.create_drink(request)?;
    tracing::info!(
        drink_id = drink.id,
        subject = claims.subject().unwrap_or("-"),
        "drink created"
    );
    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![drink.long()],
    }))
}

#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    params(
        ("id" = u64, Path, description = "Identifier of the drink to update")
    ),
    request_body = UpdateDrinkRequest,
    tag = "Drinks",
    security(("bearer" = ["patch:drinks"])),
    responses(
        (status = 200, body = DrinksResponse),
        (status = 404, description = "Drink not found or id not numeric"),
        (status = 422, description = "Title empty or already taken")
    )
)]
pub async fn update_drink(
    Claims(claims): Claims,
    PathParam(id): PathParam<u64>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdateDrinkRequest>,
) -> Result<Json<DrinksResponse>, ApiError> {
    let mut store = state.store.write().await;
    let drink = store.update_drink(id, request)?;
    tracing::info!(
        drink_id = id,
        subject = claims.subject().unwrap_or("-"),
        "drink updated"
    );
    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![drink.long()],
    }))
}

#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    params(
        ("id" = u64, Path, description = "Identifier of the drink to delete")
    ),
    tag = "Drinks",
    security(("bearer" = ["delete:drinks"])),
    responses(
        (status = 200, body = DeleteResponse),
        (status = 404, description = "Drink not found")
    )
)]
pub async fn delete_drink(
    Claims(claims): Claims,
    PathParam(id): PathParam<u64>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut store = state.store.write().await;
    store.delete_drink(id)?;
    tracing::info!(
        drink_id = id,
        subject = claims.subject().unwrap_or("-"),
        "drink deleted"
    );
    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}
