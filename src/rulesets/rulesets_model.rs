use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schema::{
    asset_categories, asset_classes, category_allocations, class_allocations, glidepath_rules,
    rule_sets,
};

/// A named, validated import of glidepath rules.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = rule_sets)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    pub id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = rule_sets)]
pub struct NewRuleSet<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub created_at: NaiveDateTime,
}

/// One age band on the "years relative to retirement" axis. Across a rule
/// set the bands partition [-100, 100] exactly.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = glidepath_rules)]
#[serde(rename_all = "camelCase")]
pub struct GlidepathRule {
    pub id: String,
    pub rule_set_id: String,
    pub gt_retire_age: i32,
    pub lt_retire_age: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = glidepath_rules)]
pub struct NewGlidepathRule<'a> {
    pub id: &'a str,
    pub rule_set_id: &'a str,
    pub gt_retire_age: i32,
    pub lt_retire_age: i32,
}

/// A top-level allocation bucket, shared across all rule sets.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = asset_classes)]
#[serde(rename_all = "camelCase")]
pub struct AssetClass {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = asset_classes)]
pub struct NewAssetClass<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

/// A sub-bucket owned by exactly one asset class, identified by
/// (name, asset class).
#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = asset_categories)]
#[serde(rename_all = "camelCase")]
pub struct AssetCategory {
    pub id: String,
    pub asset_class_id: String,
    pub name: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = asset_categories)]
pub struct NewAssetCategory<'a> {
    pub id: &'a str,
    pub asset_class_id: &'a str,
    pub name: &'a str,
}

/// Percentage of a rule assigned to an asset class. Percentages are stored
/// as the canonical 2-decimal strings produced by the importer.
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = class_allocations)]
pub struct ClassAllocation {
    pub id: String,
    pub rule_id: String,
    pub asset_class_id: String,
    pub percentage: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = class_allocations)]
pub struct NewClassAllocation<'a> {
    pub id: &'a str,
    pub rule_id: &'a str,
    pub asset_class_id: &'a str,
    pub percentage: String,
}

/// Percentage of a rule assigned to an asset category.
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = category_allocations)]
pub struct CategoryAllocation {
    pub id: String,
    pub rule_id: String,
    pub asset_category_id: String,
    pub percentage: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = category_allocations)]
pub struct NewCategoryAllocation<'a> {
    pub id: &'a str,
    pub rule_id: &'a str,
    pub asset_category_id: &'a str,
    pub percentage: String,
}

/// One fully parsed and validated age band, ready to persist.
///
/// Allocations keep CSV column order; zero percentages are dropped at parse
/// time so "present" always means "nonzero".
#[derive(Debug, Clone, PartialEq)]
pub struct GlidepathBand {
    pub gt_retire_age: i32,
    pub lt_retire_age: i32,
    /// Class name -> percentage.
    pub class_allocations: Vec<(String, Decimal)>,
    /// (class name, category name) -> percentage.
    pub category_allocations: Vec<(String, String, Decimal)>,
}

/// A persisted rule with its allocations resolved to names, as loaded for
/// export and simulation. Class allocations are ordered by class name,
/// category allocations by (class name, category name).
#[derive(Debug, Clone)]
pub struct RuleAllocations {
    pub gt_retire_age: i32,
    pub lt_retire_age: i32,
    pub class_allocations: Vec<(String, Decimal)>,
    pub category_allocations: Vec<(String, String, Decimal)>,
}

/// What the importer does when the requested rule set name is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameCollision {
    /// Append " (n)" with the smallest free n >= 2.
    #[default]
    Rename,
    /// Fail with a validation error instead of renaming.
    Fail,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub on_name_collision: NameCollision,
}
