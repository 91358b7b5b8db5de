//! Column-oriented user statistics.

pub mod data;
pub mod loader;
pub mod stats;

pub use data::UserData;
pub use loader::{LoadError, load_data, load_from_readers};
pub use stats::{average_age, average_payment_amount, stddev_payment_amount};
