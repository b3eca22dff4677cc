pub mod exporter;
pub mod importer;
pub mod percent;
pub mod rulesets_model;
pub mod rulesets_repository;
pub mod rulesets_service;
pub mod rulesets_traits;

pub use rulesets_model::{
    GlidepathBand, ImportOptions, NameCollision, RuleAllocations, RuleSet,
};
pub use rulesets_repository::RuleSetRepository;
pub use rulesets_service::RuleSetService;
pub use rulesets_traits::{RuleSetRepositoryTrait, RuleSetServiceTrait};
