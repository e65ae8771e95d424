pub mod format;
pub mod input;

pub use format::{DeletedDrink, DrinkList, LongDrink, ShortDrink, ShortIngredient};
pub use input::{CreateDrink, UpdateDrink};
