pub mod drink;

pub use drink::{Drink, DrinkPatch, Ingredient, NewDrink, RecipeInput};
