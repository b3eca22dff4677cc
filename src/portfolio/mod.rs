pub mod portfolio_model;
pub mod portfolio_repository;
pub mod portfolio_service;
pub mod portfolio_traits;

pub use portfolio_model::{
    CategoryDetail, Fund, Portfolio, PortfolioAnalysis, PortfolioDraft, PortfolioItem,
    SymbolValue,
};
pub use portfolio_repository::PortfolioRepository;
pub use portfolio_service::{current_age_on, PortfolioService};
pub use portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
