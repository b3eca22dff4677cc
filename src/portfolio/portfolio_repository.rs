use std::sync::Arc;

use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{DbConnection, DbPool};
use crate::errors::{Error, Result, ValidationError};
use crate::portfolio::portfolio_model::{
    Fund, NewFund, NewPortfolio, NewPortfolioItem, Portfolio, PortfolioDraft, PortfolioItem,
};
use crate::portfolio::portfolio_traits::PortfolioRepositoryTrait;
use crate::rulesets::rulesets_model::{NewAssetCategory, NewAssetClass};
use crate::schema::{asset_categories, asset_classes, funds, portfolio_items, portfolios};

pub struct PortfolioRepository {
    pool: Arc<DbPool>,
}

impl PortfolioRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        PortfolioRepository { pool }
    }

    fn conn(&self) -> Result<DbConnection> {
        self.pool.get().map_err(Error::from)
    }
}

impl PortfolioRepositoryTrait for PortfolioRepository {
    fn load_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        let mut conn = self.conn()?;
        portfolios::table
            .filter(portfolios::user_id.eq(user_id))
            .order(portfolios::name.asc())
            .load::<Portfolio>(&mut conn)
            .map_err(Error::from)
    }

    fn load_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        let mut conn = self.conn()?;
        portfolios::table
            .find(portfolio_id)
            .first::<Portfolio>(&mut conn)
            .optional()?
            .ok_or_else(|| {
                ValidationError::NotFound(format!("Portfolio '{}' not found", portfolio_id))
                    .into()
            })
    }

    fn insert_portfolio(&self, draft: &PortfolioDraft) -> Result<Portfolio> {
        let mut conn = self.conn()?;
        let id = Uuid::new_v4().to_string();
        diesel::insert_into(portfolios::table)
            .values(NewPortfolio {
                id: &id,
                user_id: &draft.user_id,
                name: &draft.name,
                year_born: draft.year_born,
                retirement_age: draft.retirement_age,
                rule_set_id: draft.rule_set_id.as_deref(),
                created_at: chrono::Utc::now().naive_utc(),
            })
            .get_result::<Portfolio>(&mut conn)
            .map_err(Error::from)
    }

    fn set_rule_set(&self, portfolio_id: &str, rule_set_id: Option<&str>) -> Result<Portfolio> {
        let mut conn = self.conn()?;
        diesel::update(portfolios::table.find(portfolio_id))
            .set(portfolios::rule_set_id.eq(rule_set_id))
            .get_result::<Portfolio>(&mut conn)
            .map_err(Error::from)
    }

    fn delete_portfolio(&self, portfolio_id: &str) -> Result<usize> {
        let mut conn = self.conn()?;
        diesel::delete(portfolios::table.find(portfolio_id))
            .execute(&mut conn)
            .map_err(Error::from)
    }

    fn load_items(&self, portfolio_id: &str) -> Result<Vec<PortfolioItem>> {
        let mut conn = self.conn()?;
        portfolio_items::table
            .filter(portfolio_items::portfolio_id.eq(portfolio_id))
            .order((
                portfolio_items::account_number.asc(),
                portfolio_items::symbol.asc(),
            ))
            .load::<PortfolioItem>(&mut conn)
            .map_err(Error::from)
    }

    fn add_item(
        &self,
        portfolio_id: &str,
        account_number: &str,
        symbol: &str,
    ) -> Result<PortfolioItem> {
        let mut conn = self.conn()?;
        let id = Uuid::new_v4().to_string();
        diesel::insert_into(portfolio_items::table)
            .values(NewPortfolioItem {
                id: &id,
                portfolio_id,
                account_number,
                symbol,
            })
            .get_result::<PortfolioItem>(&mut conn)
            .map_err(Error::from)
    }

    fn remove_item(&self, item_id: &str) -> Result<usize> {
        let mut conn = self.conn()?;
        diesel::delete(portfolio_items::table.find(item_id))
            .execute(&mut conn)
            .map_err(Error::from)
    }

    fn load_fund_category(&self, ticker: &str) -> Result<Option<(String, String)>> {
        let mut conn = self.conn()?;
        funds::table
            .inner_join(asset_categories::table.inner_join(asset_classes::table))
            .filter(funds::ticker.eq(ticker))
            .select((asset_categories::name, asset_classes::name))
            .first::<(String, String)>(&mut conn)
            .optional()
            .map_err(Error::from)
    }

    fn upsert_fund(
        &self,
        ticker: &str,
        name: &str,
        class_name: &str,
        category_name: &str,
        preference: i32,
    ) -> Result<Fund> {
        let mut conn = self.conn()?;
        conn.transaction::<Fund, Error, _>(|conn| {
            let class_id = match asset_classes::table
                .filter(asset_classes::name.eq(class_name))
                .select(asset_classes::id)
                .first::<String>(conn)
                .optional()?
            {
                Some(id) => id,
                None => {
                    let id = Uuid::new_v4().to_string();
                    diesel::insert_into(asset_classes::table)
                        .values(NewAssetClass {
                            id: &id,
                            name: class_name,
                        })
                        .execute(conn)?;
                    id
                }
            };

            let category_id = match asset_categories::table
                .filter(asset_categories::asset_class_id.eq(&class_id))
                .filter(asset_categories::name.eq(category_name))
                .select(asset_categories::id)
                .first::<String>(conn)
                .optional()?
            {
                Some(id) => id,
                None => {
                    let id = Uuid::new_v4().to_string();
                    diesel::insert_into(asset_categories::table)
                        .values(NewAssetCategory {
                            id: &id,
                            asset_class_id: &class_id,
                            name: category_name,
                        })
                        .execute(conn)?;
                    id
                }
            };

            diesel::delete(funds::table.filter(funds::ticker.eq(ticker))).execute(conn)?;
            let id = Uuid::new_v4().to_string();
            diesel::insert_into(funds::table)
                .values(NewFund {
                    id: &id,
                    ticker,
                    name,
                    category_id: Some(&category_id),
                    preference,
                })
                .get_result::<Fund>(conn)
                .map_err(Error::from)
        })
    }
}
