use std::sync::Arc;

use log::info;
use rust_decimal::prelude::ToPrimitive;

use crate::errors::{Result, ValidationError};
use crate::portfolio::portfolio_service::current_age_on;
use crate::portfolio::portfolio_traits::PortfolioServiceTrait;
use crate::rulesets::rulesets_traits::RuleSetRepositoryTrait;
use crate::simulation::monte_carlo::{
    run_simulation, GlidepathLookup, SimulationInputs, SimulationResult, WithdrawalMode,
};

/// Caller-tunable knobs for a retirement projection.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionRequest {
    pub annual_contribution: f64,
    pub withdrawal: WithdrawalMode,
    pub inflation_rate: f64,
    pub num_paths: u32,
    pub end_age: i32,
    pub seed: u64,
}

impl Default for ProjectionRequest {
    fn default() -> Self {
        ProjectionRequest {
            annual_contribution: 0.0,
            withdrawal: WithdrawalMode::Percent(4.0),
            inflation_rate: 0.03,
            num_paths: 1000,
            end_age: 95,
            seed: 42,
        }
    }
}

/// Projects a portfolio's balance through retirement using its assigned
/// glidepath rule set and the current holdings valuation.
pub struct SimulationService<PS: PortfolioServiceTrait, R: RuleSetRepositoryTrait> {
    portfolio_service: Arc<PS>,
    rule_set_repo: Arc<R>,
}

impl<PS: PortfolioServiceTrait, R: RuleSetRepositoryTrait> SimulationService<PS, R> {
    pub fn new(portfolio_service: Arc<PS>, rule_set_repo: Arc<R>) -> Self {
        SimulationService {
            portfolio_service,
            rule_set_repo,
        }
    }

    pub fn project_retirement(
        &self,
        portfolio_id: &str,
        request: ProjectionRequest,
    ) -> Result<SimulationResult> {
        let portfolio = self.portfolio_service.get_portfolio(portfolio_id)?;
        let rule_set_id = portfolio.rule_set_id.clone().ok_or_else(|| {
            ValidationError::InvalidInput(format!(
                "Portfolio '{}' has no glidepath rule set assigned",
                portfolio.name
            ))
        })?;

        let analysis = self.portfolio_service.get_portfolio_analysis(portfolio_id)?;
        let rules = self.rule_set_repo.load_rules(&rule_set_id)?;
        let glidepath = GlidepathLookup::from_rules(&rules);

        let current_age = current_age_on(&portfolio, chrono::Utc::now().date_naive());
        let inputs = SimulationInputs {
            starting_balance: analysis.total_value.to_f64().unwrap_or(0.0),
            current_age,
            retirement_age: portfolio.retirement_age,
            end_age: request.end_age,
            annual_contribution: request.annual_contribution,
            withdrawal: request.withdrawal,
            inflation_rate: request.inflation_rate,
            num_paths: request.num_paths,
            seed: request.seed,
        };

        info!(
            "Projecting portfolio '{}' over {} path(s), ages {}..{}",
            portfolio.name, inputs.num_paths, inputs.current_age, inputs.end_age
        );
        run_simulation(&inputs, &glidepath)
    }
}
