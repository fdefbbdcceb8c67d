// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures of the drinks API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and the OpenAPI
//! document.
//!
//! ## Representations
//!
//! A drink is rendered in two shapes:
//!
//! - **short**: public menu view, ingredients reduced to `color` and `parts`
//! - **long**: full recipe, only for callers holding `get:drinks-detail` or
//!   a write permission

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Drink Models
// =============================================================================

/// One ingredient of a drink recipe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Ingredient {
    /// Ingredient name, e.g. "milk".
    pub name: String,
    /// Display color used to draw the drink.
    pub color: String,
    /// Relative amount.
    pub parts: u32,
}

/// A stored drink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|ingredient| IngredientShort {
                    color: ingredient.color.clone(),
                    parts: ingredient.parts,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

/// Ingredient without its name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct IngredientShort {
    pub color: String,
    pub parts: u32,
}

/// Public menu representation of a drink.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DrinkShort {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<IngredientShort>,
}

/// Full representation of a drink.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DrinkLong {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Request to create a drink.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDrinkRequest {
    /// Unique, non-empty title.
    pub title: String,
    /// Recipe ingredients.
    pub recipe: Vec<Ingredient>,
}

/// Request to update a drink. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateDrinkRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<Vec<Ingredient>>,
}

// =============================================================================
// Responses
// =============================================================================

/// `GET /drinks` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuResponse {
    pub success: bool,
    pub drinks: Vec<DrinkShort>,
}

/// Response carrying full drink representations.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinksResponse {
    pub success: bool,
    pub drinks: Vec<DrinkLong>,
}

/// `DELETE /drinks/{id}` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: u64,
}
