use crate::errors::Result;
use crate::portfolio::portfolio_model::{
    Fund, Portfolio, PortfolioAnalysis, PortfolioDraft, PortfolioItem,
};

pub trait PortfolioRepositoryTrait: Send + Sync {
    fn load_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>>;
    fn load_portfolio(&self, portfolio_id: &str) -> Result<Portfolio>;
    fn insert_portfolio(&self, draft: &PortfolioDraft) -> Result<Portfolio>;
    fn set_rule_set(&self, portfolio_id: &str, rule_set_id: Option<&str>) -> Result<Portfolio>;
    fn delete_portfolio(&self, portfolio_id: &str) -> Result<usize>;

    fn load_items(&self, portfolio_id: &str) -> Result<Vec<PortfolioItem>>;
    fn add_item(
        &self,
        portfolio_id: &str,
        account_number: &str,
        symbol: &str,
    ) -> Result<PortfolioItem>;
    fn remove_item(&self, item_id: &str) -> Result<usize>;

    /// (category name, asset class name) for a fund ticker, when the fund is
    /// known and categorized.
    fn load_fund_category(&self, ticker: &str) -> Result<Option<(String, String)>>;
    /// Create or update a fund and its category/class reference rows.
    fn upsert_fund(
        &self,
        ticker: &str,
        name: &str,
        class_name: &str,
        category_name: &str,
        preference: i32,
    ) -> Result<Fund>;
}

pub trait PortfolioServiceTrait: Send + Sync {
    fn get_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>>;
    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio>;
    fn create_portfolio(&self, draft: PortfolioDraft) -> Result<Portfolio>;
    fn delete_portfolio(&self, portfolio_id: &str) -> Result<usize>;
    fn add_item(
        &self,
        portfolio_id: &str,
        account_number: &str,
        symbol: &str,
    ) -> Result<PortfolioItem>;
    fn remove_item(&self, item_id: &str) -> Result<usize>;
    fn get_portfolio_analysis(&self, portfolio_id: &str) -> Result<PortfolioAnalysis>;
}
