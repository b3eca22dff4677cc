use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::constants::{GT_RETIRE_AGE_HEADER, LT_RETIRE_AGE_HEADER};
use crate::errors::{Result, ValidationError};
use crate::rulesets::rulesets_model::RuleAllocations;

/// Render the percentage with up to 2 decimal digits, trailing zeros
/// trimmed, no percent sign.
fn format_percent(pct: Decimal) -> String {
    pct.normalize().to_string()
}

/// Produce CSV for a rule set: one row per rule ascending by lower bound,
/// bound columns first, then class columns and "Class:Category" columns in
/// alphabetical order. Columns that are zero in every rule are omitted, and
/// zero cells inside kept columns render empty.
pub fn export_rules_csv(rules: &[RuleAllocations]) -> Result<Vec<u8>> {
    let mut class_cols: BTreeSet<&str> = BTreeSet::new();
    let mut category_cols: BTreeSet<(&str, &str)> = BTreeSet::new();
    for rule in rules {
        for (class, pct) in &rule.class_allocations {
            if !pct.is_zero() {
                class_cols.insert(class);
            }
        }
        for (class, category, pct) in &rule.category_allocations {
            if !pct.is_zero() {
                category_cols.insert((class, category));
            }
        }
    }

    let mut sorted: Vec<&RuleAllocations> = rules.iter().collect();
    sorted.sort_by_key(|r| r.gt_retire_age);

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<String> = vec![
        GT_RETIRE_AGE_HEADER.to_string(),
        LT_RETIRE_AGE_HEADER.to_string(),
    ];
    header.extend(class_cols.iter().map(|c| c.to_string()));
    header.extend(
        category_cols
            .iter()
            .map(|(class, category)| format!("{}:{}", class, category)),
    );
    writer.write_record(&header)?;

    for rule in sorted {
        let mut record: Vec<String> = vec![
            rule.gt_retire_age.to_string(),
            rule.lt_retire_age.to_string(),
        ];
        for class in &class_cols {
            let cell = rule
                .class_allocations
                .iter()
                .find(|(name, pct)| name == class && !pct.is_zero())
                .map(|(_, pct)| format_percent(*pct))
                .unwrap_or_default();
            record.push(cell);
        }
        for (class, category) in &category_cols {
            let cell = rule
                .category_allocations
                .iter()
                .find(|(c, k, pct)| c == class && k == category && !pct.is_zero())
                .map(|(_, _, pct)| format_percent(*pct))
                .unwrap_or_default();
            record.push(cell);
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ValidationError::InvalidInput(format!("CSV write failed: {}", e)).into())
}
