use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::{DbConnection, DbPool};
use crate::errors::{Error, Result, ValidationError};
use crate::rulesets::rulesets_model::{
    AssetClass, GlidepathBand, GlidepathRule, NewAssetCategory, NewAssetClass,
    NewCategoryAllocation, NewClassAllocation, NewGlidepathRule, NewRuleSet, RuleAllocations,
    RuleSet,
};
use crate::rulesets::rulesets_traits::RuleSetRepositoryTrait;
use crate::schema::{
    asset_categories, asset_classes, category_allocations, class_allocations, glidepath_rules,
    rule_sets,
};

pub struct RuleSetRepository {
    pool: Arc<DbPool>,
}

impl RuleSetRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        RuleSetRepository { pool }
    }

    fn conn(&self) -> Result<DbConnection> {
        self.pool.get().map_err(Error::from)
    }
}

fn stored_percent(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|_| {
        ValidationError::InvalidInput(format!("Stored percentage '{}' is not numeric", raw)).into()
    })
}

/// Resolve the asset class id for `name`, inserting the class when it is not
/// yet known. New classes referenced by an import are created inside the
/// import transaction.
fn class_id_for(
    conn: &mut SqliteConnection,
    class_ids: &mut HashMap<String, String>,
    name: &str,
) -> Result<String> {
    if let Some(id) = class_ids.get(name) {
        return Ok(id.clone());
    }
    let id = Uuid::new_v4().to_string();
    diesel::insert_into(asset_classes::table)
        .values(NewAssetClass { id: &id, name })
        .execute(conn)?;
    class_ids.insert(name.to_string(), id.clone());
    Ok(id)
}

fn category_id_for(
    conn: &mut SqliteConnection,
    category_ids: &mut HashMap<(String, String), String>,
    class_id: &str,
    class_name: &str,
    category_name: &str,
) -> Result<String> {
    let key = (class_name.to_string(), category_name.to_string());
    if let Some(id) = category_ids.get(&key) {
        return Ok(id.clone());
    }
    let id = Uuid::new_v4().to_string();
    diesel::insert_into(asset_categories::table)
        .values(NewAssetCategory {
            id: &id,
            asset_class_id: class_id,
            name: category_name,
        })
        .execute(conn)?;
    category_ids.insert(key, id.clone());
    Ok(id)
}

impl RuleSetRepositoryTrait for RuleSetRepository {
    fn load_rule_sets(&self) -> Result<Vec<RuleSet>> {
        let mut conn = self.conn()?;
        rule_sets::table
            .order(rule_sets::name.asc())
            .load::<RuleSet>(&mut conn)
            .map_err(Error::from)
    }

    fn load_rule_set(&self, rule_set_id: &str) -> Result<RuleSet> {
        let mut conn = self.conn()?;
        rule_sets::table
            .find(rule_set_id)
            .first::<RuleSet>(&mut conn)
            .optional()?
            .ok_or_else(|| {
                ValidationError::NotFound(format!("Rule set '{}' not found", rule_set_id)).into()
            })
    }

    fn load_rule_set_names(&self) -> Result<Vec<String>> {
        let mut conn = self.conn()?;
        rule_sets::table
            .select(rule_sets::name)
            .load::<String>(&mut conn)
            .map_err(Error::from)
    }

    fn load_rules(&self, rule_set_id: &str) -> Result<Vec<RuleAllocations>> {
        let mut conn = self.conn()?;

        let rules = glidepath_rules::table
            .filter(glidepath_rules::rule_set_id.eq(rule_set_id))
            .order(glidepath_rules::gt_retire_age.asc())
            .load::<GlidepathRule>(&mut conn)?;

        let mut result = Vec::with_capacity(rules.len());
        for rule in rules {
            let classes: Vec<(String, String)> = class_allocations::table
                .inner_join(asset_classes::table)
                .filter(class_allocations::rule_id.eq(&rule.id))
                .order(asset_classes::name.asc())
                .select((asset_classes::name, class_allocations::percentage))
                .load(&mut conn)?;

            let categories: Vec<(String, String, String)> = category_allocations::table
                .inner_join(asset_categories::table.inner_join(asset_classes::table))
                .filter(category_allocations::rule_id.eq(&rule.id))
                .order((asset_classes::name.asc(), asset_categories::name.asc()))
                .select((
                    asset_classes::name,
                    asset_categories::name,
                    category_allocations::percentage,
                ))
                .load(&mut conn)?;

            let class_allocations = classes
                .into_iter()
                .map(|(name, pct)| Ok((name, stored_percent(&pct)?)))
                .collect::<Result<Vec<_>>>()?;
            let category_allocations = categories
                .into_iter()
                .map(|(class, category, pct)| Ok((class, category, stored_percent(&pct)?)))
                .collect::<Result<Vec<_>>>()?;

            result.push(RuleAllocations {
                gt_retire_age: rule.gt_retire_age,
                lt_retire_age: rule.lt_retire_age,
                class_allocations,
                category_allocations,
            });
        }
        Ok(result)
    }

    fn insert_rule_set(&self, name: &str, bands: &[GlidepathBand]) -> Result<RuleSet> {
        let mut conn = self.conn()?;
        let created_at = chrono::Utc::now().naive_utc();

        conn.transaction::<RuleSet, Error, _>(|conn| {
            let rule_set_id = Uuid::new_v4().to_string();
            let rule_set = diesel::insert_into(rule_sets::table)
                .values(NewRuleSet {
                    id: &rule_set_id,
                    name,
                    created_at,
                })
                .get_result::<RuleSet>(conn)?;

            let mut class_ids: HashMap<String, String> = asset_classes::table
                .load::<AssetClass>(conn)?
                .into_iter()
                .map(|c| (c.name, c.id))
                .collect();
            let mut category_ids: HashMap<(String, String), String> = asset_categories::table
                .inner_join(asset_classes::table)
                .select((asset_classes::name, asset_categories::name, asset_categories::id))
                .load::<(String, String, String)>(conn)?
                .into_iter()
                .map(|(class, category, id)| ((class, category), id))
                .collect();

            let mut ordered: Vec<&GlidepathBand> = bands.iter().collect();
            ordered.sort_by_key(|b| b.gt_retire_age);

            for band in ordered {
                let rule_id = Uuid::new_v4().to_string();
                diesel::insert_into(glidepath_rules::table)
                    .values(NewGlidepathRule {
                        id: &rule_id,
                        rule_set_id: &rule_set_id,
                        gt_retire_age: band.gt_retire_age,
                        lt_retire_age: band.lt_retire_age,
                    })
                    .execute(conn)?;

                for (class, pct) in &band.class_allocations {
                    let class_id = class_id_for(conn, &mut class_ids, class)?;
                    diesel::insert_into(class_allocations::table)
                        .values(NewClassAllocation {
                            id: &Uuid::new_v4().to_string(),
                            rule_id: &rule_id,
                            asset_class_id: &class_id,
                            percentage: pct.to_string(),
                        })
                        .execute(conn)?;
                }

                for (class, category, pct) in &band.category_allocations {
                    let class_id = class_id_for(conn, &mut class_ids, class)?;
                    let category_id =
                        category_id_for(conn, &mut category_ids, &class_id, class, category)?;
                    diesel::insert_into(category_allocations::table)
                        .values(NewCategoryAllocation {
                            id: &Uuid::new_v4().to_string(),
                            rule_id: &rule_id,
                            asset_category_id: &category_id,
                            percentage: pct.to_string(),
                        })
                        .execute(conn)?;
                }
            }

            Ok(rule_set)
        })
    }

    fn delete_rule_set(&self, rule_set_id: &str) -> Result<usize> {
        let mut conn = self.conn()?;
        diesel::delete(rule_sets::table.find(rule_set_id))
            .execute(&mut conn)
            .map_err(Error::from)
    }
}
