use std::collections::HashMap;
use std::f64::consts::PI;

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::errors::{Result, ValidationError};
use crate::rulesets::rulesets_model::RuleAllocations;
use crate::simulation::assumptions::assumption_for;

/// How retirement spending is funded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WithdrawalMode {
    /// Percentage of the balance at retirement, inflated in later years.
    Percent(f64),
    /// Today's dollars, inflated to retirement and onward.
    Dollar(f64),
}

#[derive(Debug, Clone)]
pub struct SimulationInputs {
    pub starting_balance: f64,
    pub current_age: i32,
    pub retirement_age: i32,
    pub end_age: i32,
    pub annual_contribution: f64,
    pub withdrawal: WithdrawalMode,
    pub inflation_rate: f64,
    pub num_paths: u32,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathPoint {
    pub age: i32,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub percentile_10: Vec<PathPoint>,
    pub percentile_50: Vec<PathPoint>,
    pub percentile_90: Vec<PathPoint>,
    /// Share of paths (in percent) that never hit zero.
    pub probability_of_success: f64,
    pub expected_balance_at_retirement: f64,
    pub expected_balance_at_end: f64,
    pub starting_balance: f64,
    pub current_age: i32,
    pub retirement_age: i32,
}

/// Target allocation per year-relative-to-retirement, expanded from a rule
/// set's age bands. Weights are fractions of 1, keyed by asset class name.
#[derive(Debug, Clone, Default)]
pub struct GlidepathLookup {
    by_offset: HashMap<i32, Vec<(String, f64)>>,
}

impl GlidepathLookup {
    pub fn from_rules(rules: &[RuleAllocations]) -> Self {
        let mut by_offset = HashMap::new();
        for rule in rules {
            let allocation: Vec<(String, f64)> = rule
                .class_allocations
                .iter()
                .map(|(class, pct)| (class.clone(), pct.to_f64().unwrap_or(0.0) / 100.0))
                .collect();
            for offset in rule.gt_retire_age..=rule.lt_retire_age {
                by_offset.insert(offset, allocation.clone());
            }
        }
        GlidepathLookup { by_offset }
    }

    fn allocation(&self, offset: i32) -> &[(String, f64)] {
        self.by_offset.get(&offset).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub fn run_simulation(
    inputs: &SimulationInputs,
    glidepath: &GlidepathLookup,
) -> Result<SimulationResult> {
    if inputs.num_paths == 0 {
        return Err(
            ValidationError::InvalidInput("num_paths must be at least 1".to_string()).into(),
        );
    }
    if !(inputs.current_age <= inputs.retirement_age && inputs.retirement_age <= inputs.end_age) {
        return Err(ValidationError::InvalidInput(format!(
            "Ages must satisfy current ({}) <= retirement ({}) <= end ({})",
            inputs.current_age, inputs.retirement_age, inputs.end_age
        ))
        .into());
    }
    if inputs.starting_balance < 0.0 {
        return Err(
            ValidationError::InvalidInput("Starting balance must not be negative".to_string())
                .into(),
        );
    }

    let years_to_retirement = (inputs.retirement_age - inputs.current_age) as usize;
    let mut all_paths = Vec::with_capacity(inputs.num_paths as usize);
    let mut successful = 0usize;

    for path_id in 0..inputs.num_paths {
        let mut rng = Rng::new(derive_seed(inputs.seed, path_id));
        let path = simulate_path(inputs, glidepath, &mut rng);
        if path.iter().all(|p| p.balance > 0.0) {
            successful += 1;
        }
        all_paths.push(path);
    }

    let mut retirement_balances: Vec<f64> = all_paths
        .iter()
        .map(|p| p[years_to_retirement].balance)
        .collect();
    let mut end_balances: Vec<f64> = all_paths
        .iter()
        .map(|p| p[p.len() - 1].balance)
        .collect();

    Ok(SimulationResult {
        percentile_10: percentile_path(&all_paths, 10.0),
        percentile_50: percentile_path(&all_paths, 50.0),
        percentile_90: percentile_path(&all_paths, 90.0),
        probability_of_success: successful as f64 / inputs.num_paths as f64 * 100.0,
        expected_balance_at_retirement: percentile(&mut retirement_balances, 50.0),
        expected_balance_at_end: percentile(&mut end_balances, 50.0),
        starting_balance: inputs.starting_balance,
        current_age: inputs.current_age,
        retirement_age: inputs.retirement_age,
    })
}

fn simulate_path(
    inputs: &SimulationInputs,
    glidepath: &GlidepathLookup,
    rng: &mut Rng,
) -> Vec<PathPoint> {
    let years_to_retirement = inputs.retirement_age - inputs.current_age;
    let mut balance = inputs.starting_balance;
    let mut path = vec![PathPoint {
        age: inputs.current_age,
        balance,
    }];

    // Dollar withdrawals are stated in today's money; inflate them forward
    // to the first retirement year.
    let mut current_withdrawal = match inputs.withdrawal {
        WithdrawalMode::Dollar(amount) => {
            amount * (1.0 + inputs.inflation_rate).powi(years_to_retirement)
        }
        WithdrawalMode::Percent(_) => 0.0,
    };

    for age in (inputs.current_age + 1)..=inputs.end_age {
        let offset = age - inputs.retirement_age;
        let annual_return = sample_portfolio_return(glidepath.allocation(offset), rng);
        balance *= 1.0 + annual_return;

        if age < inputs.retirement_age {
            balance += inputs.annual_contribution;
        } else {
            match inputs.withdrawal {
                WithdrawalMode::Percent(rate) => {
                    if age == inputs.retirement_age {
                        current_withdrawal = balance * rate / 100.0;
                    } else {
                        current_withdrawal *= 1.0 + inputs.inflation_rate;
                    }
                }
                WithdrawalMode::Dollar(_) => {
                    if age > inputs.retirement_age {
                        current_withdrawal *= 1.0 + inputs.inflation_rate;
                    }
                }
            }
            balance -= current_withdrawal;
            balance = balance.max(0.0);
        }

        path.push(PathPoint { age, balance });
    }

    path
}

/// One year's portfolio return: an independent normal draw per asset class,
/// weighted by the target allocation. Classes without return assumptions
/// contribute nothing.
fn sample_portfolio_return(allocation: &[(String, f64)], rng: &mut Rng) -> f64 {
    let mut portfolio_return = 0.0;
    for (class, weight) in allocation {
        if let Some(assumption) = assumption_for(class) {
            let class_return = assumption.mean_return + assumption.std_dev * rng.standard_normal();
            portfolio_return += weight * class_return;
        }
    }
    portfolio_return
}

fn percentile_path(all_paths: &[Vec<PathPoint>], p: f64) -> Vec<PathPoint> {
    let steps = all_paths.first().map(Vec::len).unwrap_or(0);
    let mut result = Vec::with_capacity(steps);
    for step in 0..steps {
        let age = all_paths[0][step].age;
        let mut balances: Vec<f64> = all_paths.iter().map(|path| path[step].balance).collect();
        result.push(PathPoint {
            age,
            balance: percentile(&mut balances, p),
        });
    }
    result
}

fn percentile(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n == 1 {
        return values[0];
    }
    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = rank - lower as f64;
    values[lower] * (1.0 - weight) + values[upper] * weight
}

fn derive_seed(base_seed: u64, path_id: u32) -> u64 {
    splitmix64(base_seed ^ (path_id as u64))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Seeded xorshift64* generator with Box-Muller normals. Deterministic for
/// a given seed, which keeps projections reproducible under test.
struct Rng {
    state: u64,
    cached_normal: Option<f64>,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0xA5A5_A5A5_A5A5_A5A5 } else { seed };
        Rng {
            state,
            cached_normal: None,
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    fn next_f64(&mut self) -> f64 {
        const DENOM: f64 = (1_u64 << 53) as f64;
        let v = self.next_u64() >> 11;
        ((v as f64) + 0.5) / DENOM
    }

    fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.cached_normal.take() {
            return z;
        }
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;
        self.cached_normal = Some(r * theta.sin());
        r * theta.cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn all_other_rules() -> Vec<RuleAllocations> {
        // "Other" carries low volatility, handy for near-deterministic paths.
        vec![RuleAllocations {
            gt_retire_age: -100,
            lt_retire_age: 100,
            class_allocations: vec![("Other".to_string(), dec!(100))],
            category_allocations: vec![],
        }]
    }

    fn base_inputs() -> SimulationInputs {
        SimulationInputs {
            starting_balance: 100_000.0,
            current_age: 40,
            retirement_age: 65,
            end_age: 95,
            annual_contribution: 10_000.0,
            withdrawal: WithdrawalMode::Percent(4.0),
            inflation_rate: 0.03,
            num_paths: 200,
            seed: 42,
        }
    }

    #[test]
    fn same_seed_reproduces_the_projection() {
        let lookup = GlidepathLookup::from_rules(&all_other_rules());
        let inputs = base_inputs();
        let a = run_simulation(&inputs, &lookup).unwrap();
        let b = run_simulation(&inputs, &lookup).unwrap();
        assert_eq!(a.percentile_50, b.percentile_50);
        assert_eq!(a.probability_of_success, b.probability_of_success);
    }

    #[test]
    fn success_probability_is_a_percentage() {
        let lookup = GlidepathLookup::from_rules(&all_other_rules());
        let result = run_simulation(&base_inputs(), &lookup).unwrap();
        assert!(result.probability_of_success >= 0.0);
        assert!(result.probability_of_success <= 100.0);
    }

    #[test]
    fn percentile_paths_are_ordered() {
        let lookup = GlidepathLookup::from_rules(&all_other_rules());
        let result = run_simulation(&base_inputs(), &lookup).unwrap();
        for ((p10, p50), p90) in result
            .percentile_10
            .iter()
            .zip(&result.percentile_50)
            .zip(&result.percentile_90)
        {
            assert!(p10.balance <= p50.balance + 1e-9);
            assert!(p50.balance <= p90.balance + 1e-9);
        }
    }

    #[test]
    fn contributions_grow_balance_before_retirement_without_allocation() {
        // No allocation found for any offset: sampled return is 0 every
        // year, so pre-retirement growth is just the contributions.
        let lookup = GlidepathLookup::default();
        let mut inputs = base_inputs();
        inputs.num_paths = 1;
        let result = run_simulation(&inputs, &lookup).unwrap();
        // Contributions land for every year strictly before retirement age:
        // by age 64 (path index 24) there have been 24 annual deposits.
        let last_accumulation_step = (inputs.retirement_age - inputs.current_age - 1) as usize;
        let expected = inputs.starting_balance
            + inputs.annual_contribution * last_accumulation_step as f64;
        let at_64 = result.percentile_50[last_accumulation_step].balance;
        assert!((at_64 - expected).abs() < 1e-6);
    }

    #[test]
    fn dollar_withdrawals_are_inflated_to_retirement() {
        let lookup = GlidepathLookup::default();
        let inputs = SimulationInputs {
            starting_balance: 1_000_000.0,
            current_age: 64,
            retirement_age: 65,
            end_age: 66,
            annual_contribution: 0.0,
            withdrawal: WithdrawalMode::Dollar(40_000.0),
            inflation_rate: 0.03,
            num_paths: 1,
            seed: 7,
        };
        let result = run_simulation(&inputs, &lookup).unwrap();
        let first_withdrawal = 40_000.0 * 1.03;
        let at_65 = result.percentile_50[1].balance;
        assert!((at_65 - (1_000_000.0 - first_withdrawal)).abs() < 1e-6);
        let second_withdrawal = first_withdrawal * 1.03;
        let at_66 = result.percentile_50[2].balance;
        assert!((at_66 - (at_65 - second_withdrawal)).abs() < 1e-6);
    }

    #[test]
    fn invalid_ages_are_rejected() {
        let lookup = GlidepathLookup::default();
        let mut inputs = base_inputs();
        inputs.retirement_age = 30;
        assert!(run_simulation(&inputs, &lookup).is_err());
    }

    #[test]
    fn lookup_expands_bands_inclusively() {
        let lookup = GlidepathLookup::from_rules(&all_other_rules());
        assert_eq!(lookup.allocation(-100).len(), 1);
        assert_eq!(lookup.allocation(0).len(), 1);
        assert_eq!(lookup.allocation(100).len(), 1);
        assert!(lookup.allocation(101).is_empty());
    }
}
