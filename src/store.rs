// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory drink store.
//!
//! Ids are assigned sequentially and never reused. Listing order is id order.

use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::models::{CreateDrinkRequest, Drink, UpdateDrinkRequest};

#[derive(Default)]
pub struct InMemoryStore {
    drinks: BTreeMap<u64, Drink>,
    next_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_drinks(&self) -> Vec<Drink> {
        self.drinks.values().cloned().collect()
    }

    pub fn create_drink(&mut self, request: CreateDrinkRequest) -> Result<Drink, ApiError> {
        let title = self.validate_title(&request.title, None)?;

        self.next_id += 1;
        let drink = Drink {
            id: self.next_id,
            title,
            recipe: request.recipe,
        };
        self.drinks.insert(drink.id, drink.clone());
        Ok(drink)
    }

    pub fn update_drink(&mut self, id: u64, request: UpdateDrinkRequest) -> Result<Drink, ApiError> {
        if !self.drinks.contains_key(&id) {
            return Err(ApiError::not_found());
        }

        let title = match request.title {
            Some(title) => Some(self.validate_title(&title, Some(id))?),
            None => None,
        };

        let drink = self.drinks.get_mut(&id).ok_or_else(ApiError::not_found)?;
        if let Some(title) = title {
            drink.title = title;
        }
        if let Some(recipe) = request.recipe {
            drink.recipe = recipe;
        }
        Ok(drink.clone())
    }

    pub fn delete_drink(&mut self, id: u64) -> Result<(), ApiError> {
        if self.drinks.remove(&id).is_some() {
            Ok(())
        } else {
            Err(ApiError::not_found())
        }
    }

    /// Titles are trimmed, non-empty and unique.
    fn validate_title(&self, title: &str, updating: Option<u64>) -> Result<String, ApiError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ApiError::unprocessable());
        }

        let taken = self
            .drinks
            .values()
            .any(|drink| drink.title == title && Some(drink.id) != updating);
        if taken {
            return Err(ApiError::unprocessable());
        }

        Ok(title.to_string())
    }
}
