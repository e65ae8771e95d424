use serde::Serialize;
use serde_json::Number;

use crate::database::models::drink::{Drink, Ingredient};

/// Public view of an ingredient: no name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: Number,
}

/// `{id, title, recipe: [{color, parts}]}`, served to anonymous callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortDrink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

/// `{id, title, recipe: [{name, color, parts}]}`, served to authorized callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongDrink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> ShortDrink {
        ShortDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|ingredient| ShortIngredient {
                    color: ingredient.color.clone(),
                    parts: ingredient.parts.clone(),
                })
                .collect(),
        }
    }

    pub fn long(&self) -> LongDrink {
        LongDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

/// `{"drinks": [...]}` payload
#[derive(Debug, Serialize)]
pub struct DrinkList<T: Serialize> {
    pub drinks: Vec<T>,
}

impl DrinkList<ShortDrink> {
    pub fn short(drinks: &[Drink]) -> Self {
        Self {
            drinks: drinks.iter().map(Drink::short).collect(),
        }
    }
}

impl DrinkList<LongDrink> {
    pub fn long(drinks: &[Drink]) -> Self {
        Self {
            drinks: drinks.iter().map(Drink::long).collect(),
        }
    }
}

/// `{"delete": id}` payload
#[derive(Debug, Serialize)]
pub struct DeletedDrink {
    pub delete: i32,
}
