use crate::database::models::drink::{Ingredient, RecipeInput};

/// Text encoding of a recipe at the storage boundary.
///
/// Every write goes through [`RecipeCodec::encode`], so stored text is always a
/// JSON array. [`RecipeCodec::decode`] also accepts a bare object, which older
/// rows may hold.
pub struct RecipeCodec;

impl RecipeCodec {
    pub fn encode(recipe: &[Ingredient]) -> Result<String, serde_json::Error> {
        serde_json::to_string(recipe)
    }

    pub fn decode(text: &str) -> Result<Vec<Ingredient>, serde_json::Error> {
        let input: RecipeInput = serde_json::from_str(text)?;
        Ok(input.into())
    }
}
