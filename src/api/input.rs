use serde::Deserialize;

use crate::database::models::drink::{DrinkPatch, NewDrink, RecipeInput, MAX_TITLE_CHARS};
use crate::error::ApiError;

/// Body of `POST /drinks`
#[derive(Debug, Deserialize)]
pub struct CreateDrink {
    pub title: String,
    pub recipe: RecipeInput,
}

/// Body of `PATCH /drinks/:id`; both fields optional
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDrink {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

fn validate_title(title: String) -> Result<String, ApiError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ApiError::unprocessable_entity("title must not be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(ApiError::unprocessable_entity(format!(
            "title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

impl CreateDrink {
    pub fn into_new_drink(self) -> Result<NewDrink, ApiError> {
        Ok(NewDrink {
            title: validate_title(self.title)?,
            recipe: self.recipe.into(),
        })
    }
}

impl UpdateDrink {
    pub fn into_patch(self) -> Result<DrinkPatch, ApiError> {
        Ok(DrinkPatch {
            title: self.title.map(validate_title).transpose()?,
            recipe: self.recipe.map(Into::into),
        })
    }
}
