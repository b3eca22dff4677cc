pub mod positions_model;
pub mod positions_repository;
pub mod positions_service;
pub mod positions_traits;

pub use positions_model::{AccountPosition, AccountUpload, PositionRecord};
pub use positions_repository::PositionRepository;
pub use positions_service::PositionService;
pub use positions_traits::{PositionRepositoryTrait, PositionServiceTrait};
