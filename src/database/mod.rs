pub mod codec;
pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;

pub use codec::RecipeCodec;
pub use manager::DatabaseError;
pub use memory::MemoryDrinkStore;
pub use models::drink::MAX_TITLE_CHARS;
pub use models::{Drink, DrinkPatch, Ingredient, NewDrink, RecipeInput};
pub use repository::{DrinkStore, PgDrinkStore};
