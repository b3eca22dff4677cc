use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use log::debug;
use rust_decimal::Decimal;

use crate::errors::Result;
use crate::portfolio::portfolio_model::{
    CategoryDetail, Portfolio, PortfolioAnalysis, PortfolioDraft, PortfolioItem, SymbolValue,
};
use crate::portfolio::portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
use crate::positions::positions_model::AccountUpload;
use crate::positions::positions_traits::PositionRepositoryTrait;

const UNKNOWN_BUCKET: &str = "Unknown";

/// Parse a brokerage money string ("$1,234.56") leniently. Positions store
/// raw strings; anything unparseable counts as zero rather than failing the
/// whole analysis.
fn parse_money(raw: &str) -> Decimal {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Age in the given year, as the original app computed it.
pub fn current_age_on(portfolio: &Portfolio, today: NaiveDate) -> i32 {
    today.year() - portfolio.year_born
}

pub struct PortfolioService<T: PortfolioRepositoryTrait, P: PositionRepositoryTrait> {
    portfolio_repo: Arc<T>,
    position_repo: Arc<P>,
}

impl<T: PortfolioRepositoryTrait, P: PositionRepositoryTrait> PortfolioService<T, P> {
    pub fn new(portfolio_repo: Arc<T>, position_repo: Arc<P>) -> Self {
        PortfolioService {
            portfolio_repo,
            position_repo,
        }
    }
}

impl<T: PortfolioRepositoryTrait, P: PositionRepositoryTrait> PortfolioServiceTrait
    for PortfolioService<T, P>
{
    fn get_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        self.portfolio_repo.load_portfolios(user_id)
    }

    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        self.portfolio_repo.load_portfolio(portfolio_id)
    }

    fn create_portfolio(&self, draft: PortfolioDraft) -> Result<Portfolio> {
        self.portfolio_repo.insert_portfolio(&draft)
    }

    fn delete_portfolio(&self, portfolio_id: &str) -> Result<usize> {
        self.portfolio_repo.delete_portfolio(portfolio_id)
    }

    fn add_item(
        &self,
        portfolio_id: &str,
        account_number: &str,
        symbol: &str,
    ) -> Result<PortfolioItem> {
        self.portfolio_repo
            .add_item(portfolio_id, account_number, symbol)
    }

    fn remove_item(&self, item_id: &str) -> Result<usize> {
        self.portfolio_repo.remove_item(item_id)
    }

    /// Roll the portfolio's current holdings up into class, category, and
    /// ticker breakdowns, using only the most recent upload for each account.
    fn get_portfolio_analysis(&self, portfolio_id: &str) -> Result<PortfolioAnalysis> {
        let portfolio = self.portfolio_repo.load_portfolio(portfolio_id)?;
        let items = self.portfolio_repo.load_items(portfolio_id)?;
        if items.is_empty() {
            return Ok(PortfolioAnalysis::default());
        }

        let mut latest_uploads: HashMap<String, Option<AccountUpload>> = HashMap::new();
        for item in &items {
            if !latest_uploads.contains_key(&item.account_number) {
                let upload = self
                    .position_repo
                    .latest_upload_for_account(&portfolio.user_id, &item.account_number)?;
                latest_uploads.insert(item.account_number.clone(), upload);
            }
        }

        let mut symbol_totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for item in &items {
            let Some(Some(upload)) = latest_uploads.get(&item.account_number) else {
                debug!(
                    "No upload found for account '{}', skipping",
                    item.account_number
                );
                continue;
            };
            let positions = self.position_repo.load_account_positions(
                &upload.id,
                &item.account_number,
                &item.symbol,
            )?;
            for position in positions {
                *symbol_totals.entry(item.symbol.clone()).or_default() +=
                    parse_money(&position.current_value);
            }
        }

        let mut class_breakdown: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut category_breakdown: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut ticker_breakdown: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut details: BTreeMap<String, (String, Decimal, BTreeMap<String, Decimal>)> =
            BTreeMap::new();

        for (symbol, value) in &symbol_totals {
            ticker_breakdown.insert(symbol.clone(), *value);

            let (category, class) = match self.portfolio_repo.load_fund_category(symbol)? {
                Some((category, class)) => (category, class),
                None => (UNKNOWN_BUCKET.to_string(), UNKNOWN_BUCKET.to_string()),
            };

            *class_breakdown.entry(class.clone()).or_default() += *value;
            *category_breakdown.entry(category.clone()).or_default() += *value;

            let entry = details
                .entry(category)
                .or_insert_with(|| (class, Decimal::ZERO, BTreeMap::new()));
            entry.1 += *value;
            *entry.2.entry(symbol.clone()).or_default() += *value;
        }

        let total_value = symbol_totals.values().copied().sum();
        let category_details = details
            .into_iter()
            .map(|(category, (asset_class, subtotal, symbols))| CategoryDetail {
                category,
                asset_class,
                subtotal,
                symbols: symbols
                    .into_iter()
                    .map(|(ticker, value)| SymbolValue { ticker, value })
                    .collect(),
            })
            .collect();

        Ok(PortfolioAnalysis {
            class_breakdown,
            category_breakdown,
            ticker_breakdown,
            category_details,
            total_value,
        })
    }
}
