use std::io::Read;

use crate::errors::Result;
use crate::rulesets::rulesets_model::{
    GlidepathBand, ImportOptions, RuleAllocations, RuleSet,
};

pub trait RuleSetRepositoryTrait: Send + Sync {
    fn load_rule_sets(&self) -> Result<Vec<RuleSet>>;
    fn load_rule_set(&self, rule_set_id: &str) -> Result<RuleSet>;
    fn load_rule_set_names(&self) -> Result<Vec<String>>;
    fn load_rules(&self, rule_set_id: &str) -> Result<Vec<RuleAllocations>>;
    /// Persist a rule set and everything under it as one transaction.
    fn insert_rule_set(&self, name: &str, bands: &[GlidepathBand]) -> Result<RuleSet>;
    fn delete_rule_set(&self, rule_set_id: &str) -> Result<usize>;
}

pub trait RuleSetServiceTrait: Send + Sync {
    fn get_rule_sets(&self) -> Result<Vec<RuleSet>>;
    fn get_rule_set(&self, rule_set_id: &str) -> Result<RuleSet>;
    fn get_rules(&self, rule_set_id: &str) -> Result<Vec<RuleAllocations>>;
    fn import_rule_set(
        &self,
        input: &mut dyn Read,
        name: &str,
        options: ImportOptions,
    ) -> Result<RuleSet>;
    fn export_rule_set(&self, rule_set_id: &str) -> Result<Vec<u8>>;
    fn delete_rule_set(&self, rule_set_id: &str) -> Result<usize>;
}
