use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schema::{funds, portfolio_items, portfolios};

/// A user's retirement portfolio: a set of tracked account positions plus
/// the glidepath rule set that drives its projections.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = portfolios)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub year_born: i32,
    pub retirement_age: i32,
    pub rule_set_id: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = portfolios)]
pub struct NewPortfolio<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub name: &'a str,
    pub year_born: i32,
    pub retirement_age: i32,
    pub rule_set_id: Option<&'a str>,
    pub created_at: NaiveDateTime,
}

/// Everything needed to create a portfolio.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDraft {
    pub user_id: String,
    pub name: String,
    pub year_born: i32,
    pub retirement_age: i32,
    pub rule_set_id: Option<String>,
}

/// One tracked (account number, symbol) pair inside a portfolio.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = portfolio_items)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: String,
    pub portfolio_id: String,
    pub account_number: String,
    pub symbol: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = portfolio_items)]
pub struct NewPortfolioItem<'a> {
    pub id: &'a str,
    pub portfolio_id: &'a str,
    pub account_number: &'a str,
    pub symbol: &'a str,
}

/// Fund reference data: maps a ticker to an asset category (and through it
/// to an asset class) for allocation breakdowns.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = funds)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: String,
    pub ticker: String,
    pub name: String,
    pub category_id: Option<String>,
    pub preference: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = funds)]
pub struct NewFund<'a> {
    pub id: &'a str,
    pub ticker: &'a str,
    pub name: &'a str,
    pub category_id: Option<&'a str>,
    pub preference: i32,
}

/// Allocation breakdown of a portfolio's current holdings, shaped for the
/// chart layer. Tickers without fund reference data land in an "Unknown"
/// bucket rather than being dropped.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalysis {
    pub class_breakdown: BTreeMap<String, Decimal>,
    pub category_breakdown: BTreeMap<String, Decimal>,
    pub ticker_breakdown: BTreeMap<String, Decimal>,
    pub category_details: Vec<CategoryDetail>,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    pub category: String,
    pub asset_class: String,
    pub subtotal: Decimal,
    pub symbols: Vec<SymbolValue>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolValue {
    pub ticker: String,
    pub value: Decimal,
}
