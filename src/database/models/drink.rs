use serde::{Deserialize, Serialize};
use serde_json::Number;
use sqlx::FromRow;

use crate::database::codec::RecipeCodec;
use crate::database::manager::DatabaseError;

/// Longest title the `VARCHAR(80)` column holds, in characters
pub const MAX_TITLE_CHARS: usize = 80;

/// One recipe entry. `parts` keeps the number exactly as the client sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrinkPatch {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

impl DrinkPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }
}

/// Accepts either a list of ingredients or a single ingredient object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<RecipeInput> for Vec<Ingredient> {
    fn from(input: RecipeInput) -> Self {
        match input {
            RecipeInput::Many(list) => list,
            RecipeInput::One(single) => vec![single],
        }
    }
}

/// Storage shape of a drink: the recipe is still encoded text.
#[derive(Debug, Clone, FromRow)]
pub struct DrinkRow {
    pub id: i32,
    pub title: String,
    pub recipe: String,
}

impl DrinkRow {
    pub fn into_drink(self) -> Result<Drink, DatabaseError> {
        let recipe = RecipeCodec::decode(&self.recipe).map_err(|source| DatabaseError::CorruptRecipe {
            id: self.id,
            source,
        })?;
        Ok(Drink {
            id: self.id,
            title: self.title,
            recipe,
        })
    }
}

/// The row `db reset` leaves behind.
pub fn seed_drink() -> NewDrink {
    NewDrink {
        title: "water".to_string(),
        recipe: vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: Number::from(1),
        }],
    }
}
