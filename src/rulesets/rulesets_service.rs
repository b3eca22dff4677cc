use std::collections::HashSet;
use std::io::Read;
use std::sync::Arc;

use log::info;

use crate::errors::{Result, ValidationError};
use crate::rulesets::exporter::export_rules_csv;
use crate::rulesets::importer::parse_and_validate;
use crate::rulesets::rulesets_model::{
    ImportOptions, NameCollision, RuleAllocations, RuleSet,
};
use crate::rulesets::rulesets_traits::{RuleSetRepositoryTrait, RuleSetServiceTrait};

pub struct RuleSetService<T: RuleSetRepositoryTrait> {
    rule_set_repo: Arc<T>,
}

impl<T: RuleSetRepositoryTrait> RuleSetService<T> {
    pub fn new(rule_set_repo: Arc<T>) -> Self {
        RuleSetService { rule_set_repo }
    }
}

/// Pick the name a new rule set is stored under. A taken name resolves
/// silently to "name (n)" with the smallest free n >= 2, unless the caller
/// asked for strict naming.
fn resolve_name(
    requested: &str,
    existing: &HashSet<String>,
    on_collision: NameCollision,
) -> Result<String> {
    if !existing.contains(requested) {
        return Ok(requested.to_string());
    }
    match on_collision {
        NameCollision::Fail => {
            Err(ValidationError::DuplicateRuleSetName(requested.to_string()).into())
        }
        NameCollision::Rename => {
            let mut n = 2;
            loop {
                let candidate = format!("{} ({})", requested, n);
                if !existing.contains(&candidate) {
                    return Ok(candidate);
                }
                n += 1;
            }
        }
    }
}

impl<T: RuleSetRepositoryTrait> RuleSetServiceTrait for RuleSetService<T> {
    fn get_rule_sets(&self) -> Result<Vec<RuleSet>> {
        self.rule_set_repo.load_rule_sets()
    }

    fn get_rule_set(&self, rule_set_id: &str) -> Result<RuleSet> {
        self.rule_set_repo.load_rule_set(rule_set_id)
    }

    fn get_rules(&self, rule_set_id: &str) -> Result<Vec<RuleAllocations>> {
        self.rule_set_repo.load_rule_set(rule_set_id)?;
        self.rule_set_repo.load_rules(rule_set_id)
    }

    fn import_rule_set(
        &self,
        input: &mut dyn Read,
        name: &str,
        options: ImportOptions,
    ) -> Result<RuleSet> {
        let name = name.trim();
        if name.is_empty() {
            return Err(
                ValidationError::InvalidInput("Rule set name must not be empty".to_string())
                    .into(),
            );
        }

        let bands = parse_and_validate(input)?;
        let existing: HashSet<String> =
            self.rule_set_repo.load_rule_set_names()?.into_iter().collect();
        let final_name = resolve_name(name, &existing, options.on_name_collision)?;

        let rule_set = self.rule_set_repo.insert_rule_set(&final_name, &bands)?;
        info!(
            "Imported rule set '{}' with {} age band(s)",
            rule_set.name,
            bands.len()
        );
        Ok(rule_set)
    }

    fn export_rule_set(&self, rule_set_id: &str) -> Result<Vec<u8>> {
        self.rule_set_repo.load_rule_set(rule_set_id)?;
        let rules = self.rule_set_repo.load_rules(rule_set_id)?;
        export_rules_csv(&rules)
    }

    fn delete_rule_set(&self, rule_set_id: &str) -> Result<usize> {
        let deleted = self.rule_set_repo.delete_rule_set(rule_set_id)?;
        info!("Deleted rule set '{}'", rule_set_id);
        Ok(deleted)
    }
}
