use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{account_positions, account_uploads};

/// One imported brokerage positions file. Re-importing the same
/// (user, upload type, filename) replaces the previous upload.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = account_uploads)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpload {
    pub id: String,
    pub user_id: String,
    pub file_datetime: String,
    pub upload_type: String,
    pub filename: String,
    pub entry_count: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = account_uploads)]
pub struct NewAccountUpload<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub file_datetime: &'a str,
    pub upload_type: &'a str,
    pub filename: &'a str,
    pub entry_count: i32,
    pub created_at: NaiveDateTime,
}

/// One position row from an upload. Quantities, prices, and values keep the
/// raw trimmed strings from the source file; they are parsed lazily when a
/// portfolio is analyzed.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = account_positions)]
#[serde(rename_all = "camelCase")]
pub struct AccountPosition {
    pub id: String,
    pub upload_id: String,
    pub account_number: String,
    pub account_name: String,
    pub symbol: String,
    pub description: String,
    pub quantity: String,
    pub last_price: String,
    pub last_price_change: String,
    pub current_value: String,
    pub todays_gain_loss_dollar: String,
    pub todays_gain_loss_percent: String,
    pub total_gain_loss_dollar: String,
    pub total_gain_loss_percent: String,
    pub percent_of_account: String,
    pub cost_basis_total: String,
    pub average_cost_basis: String,
    pub position_type: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = account_positions)]
pub struct NewAccountPosition<'a> {
    pub id: &'a str,
    pub upload_id: &'a str,
    pub account_number: &'a str,
    pub account_name: &'a str,
    pub symbol: &'a str,
    pub description: &'a str,
    pub quantity: &'a str,
    pub last_price: &'a str,
    pub last_price_change: &'a str,
    pub current_value: &'a str,
    pub todays_gain_loss_dollar: &'a str,
    pub todays_gain_loss_percent: &'a str,
    pub total_gain_loss_dollar: &'a str,
    pub total_gain_loss_percent: &'a str,
    pub percent_of_account: &'a str,
    pub cost_basis_total: &'a str,
    pub average_cost_basis: &'a str,
    pub position_type: &'a str,
}

/// A parsed position row before it is tied to an upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionRecord {
    pub account_number: String,
    pub account_name: String,
    pub symbol: String,
    pub description: String,
    pub quantity: String,
    pub last_price: String,
    pub last_price_change: String,
    pub current_value: String,
    pub todays_gain_loss_dollar: String,
    pub todays_gain_loss_percent: String,
    pub total_gain_loss_dollar: String,
    pub total_gain_loss_percent: String,
    pub percent_of_account: String,
    pub cost_basis_total: String,
    pub average_cost_basis: String,
    pub position_type: String,
}
