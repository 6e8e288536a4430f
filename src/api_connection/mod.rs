pub mod connection;
pub mod endpoints;
pub mod retry;

pub use connection::{ApiConnectionError, NutritionClient, NutritionLookup};
pub use endpoints::{NutritionItem, NutritionResponse};
pub use retry::RetryPolicy;
