// handlers/public - endpoints that need no bearer token

pub mod drinks;
pub mod health;

pub use drinks::list as list_drinks;
pub use health::health;
