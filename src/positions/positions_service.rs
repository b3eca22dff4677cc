use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use lazy_static::lazy_static;
use log::info;
use regex::Regex;

use crate::errors::{ImportError, Result};
use crate::positions::positions_model::{AccountPosition, AccountUpload, PositionRecord};
use crate::positions::positions_traits::{PositionRepositoryTrait, PositionServiceTrait};

const FIDELITY_UPLOAD_TYPE: &str = "fidelity";
const FILE_DATETIME_MARKER: &str = "Date downloaded";
const FILE_DATETIME_MISSING: &str = "Date not found in file";

lazy_static! {
    static ref NON_SYMBOL_CHARS: Regex = Regex::new(r"[^A-Za-z0-9-]").unwrap();
}

/// Strip everything but letters, digits, and hyphens from a ticker symbol,
/// e.g. "FCASH**" -> "FCASH".
pub fn normalize_symbol(symbol: &str) -> String {
    NON_SYMBOL_CHARS.replace_all(symbol, "").trim().to_string()
}

/// Brokerage exports end with a footer like
/// `"Date downloaded Nov-08-2025 7:54 p.m ET"`. Scan the last few lines
/// for it.
pub fn extract_file_datetime(content: &str) -> String {
    for line in content.trim().lines().rev().take(5) {
        if line.contains(FILE_DATETIME_MARKER) {
            return line.trim().trim_matches('"').to_string();
        }
    }
    FILE_DATETIME_MISSING.to_string()
}

pub struct PositionService<T: PositionRepositoryTrait> {
    position_repo: Arc<T>,
}

impl<T: PositionRepositoryTrait> PositionService<T> {
    pub fn new(position_repo: Arc<T>) -> Self {
        PositionService { position_repo }
    }
}

fn parse_position_rows(content: &str) -> Result<Vec<PositionRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let header_index: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_string(), idx))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |name: &str| -> &str {
            header_index
                .get(name)
                .and_then(|idx| record.get(*idx))
                .unwrap_or("")
                .trim()
        };

        // Footer lines and blank spacer rows have no symbol or account
        // number; skip them.
        if field("Symbol").is_empty() || field("Account Number").is_empty() {
            continue;
        }

        rows.push(PositionRecord {
            account_number: field("Account Number").to_string(),
            account_name: field("Account Name").to_string(),
            symbol: normalize_symbol(field("Symbol")),
            description: field("Description").to_string(),
            quantity: field("Quantity").to_string(),
            last_price: field("Last Price").to_string(),
            last_price_change: field("Last Price Change").to_string(),
            current_value: field("Current Value").to_string(),
            todays_gain_loss_dollar: field("Today's Gain/Loss Dollar").to_string(),
            todays_gain_loss_percent: field("Today's Gain/Loss Percent").to_string(),
            total_gain_loss_dollar: field("Total Gain/Loss Dollar").to_string(),
            total_gain_loss_percent: field("Total Gain/Loss Percent").to_string(),
            percent_of_account: field("Percent Of Account").to_string(),
            cost_basis_total: field("Cost Basis Total").to_string(),
            average_cost_basis: field("Average Cost Basis").to_string(),
            position_type: field("Type").to_string(),
        });
    }
    Ok(rows)
}

impl<T: PositionRepositoryTrait> PositionServiceTrait for PositionService<T> {
    fn import_fidelity_positions(
        &self,
        input: &mut dyn Read,
        user_id: &str,
        filename: &str,
    ) -> Result<AccountUpload> {
        let mut bytes = Vec::new();
        input
            .read_to_end(&mut bytes)
            .map_err(|e| ImportError::MalformedInput(format!("Error reading file: {}", e)))?;
        let content = String::from_utf8(bytes)
            .map_err(|_| ImportError::MalformedInput("File is not valid UTF-8".to_string()))?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        if content.trim().is_empty() {
            return Err(ImportError::MalformedInput("CSV file is empty".to_string()).into());
        }

        let file_datetime = extract_file_datetime(content);
        let positions = parse_position_rows(content)?;
        if positions.is_empty() {
            return Err(ImportError::MalformedInput(
                "No valid position data found in CSV file".to_string(),
            )
            .into());
        }

        let upload = self.position_repo.replace_upload(
            user_id,
            FIDELITY_UPLOAD_TYPE,
            filename,
            &file_datetime,
            &positions,
        )?;
        info!(
            "Imported {} position(s) from '{}' for user '{}'",
            upload.entry_count, filename, user_id
        );
        Ok(upload)
    }

    fn get_uploads(&self, user_id: &str) -> Result<Vec<AccountUpload>> {
        self.position_repo.load_uploads(user_id)
    }

    fn get_positions(&self, upload_id: &str) -> Result<Vec<AccountPosition>> {
        self.position_repo.load_positions(upload_id)
    }

    fn delete_upload(&self, upload_id: &str) -> Result<usize> {
        self.position_repo.delete_upload(upload_id)
    }
}
