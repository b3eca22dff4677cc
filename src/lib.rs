pub mod constants;
pub mod db;
pub mod errors;
pub mod portfolio;
pub mod positions;
pub mod rulesets;
pub mod schema;
pub mod simulation;

pub use errors::{Error, Result};
