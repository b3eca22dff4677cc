/// Long-term annual return assumptions per asset class. Reviewed
/// periodically, not user-configurable.
#[derive(Debug, Clone, Copy)]
pub struct ReturnAssumption {
    pub mean_return: f64,
    pub std_dev: f64,
    pub description: &'static str,
}

const STOCKS: ReturnAssumption = ReturnAssumption {
    mean_return: 0.10,
    std_dev: 0.18,
    description: "Based on historical S&P 500 returns (1926-2024, including dividends)",
};

const BONDS: ReturnAssumption = ReturnAssumption {
    mean_return: 0.04,
    std_dev: 0.06,
    description: "Based on intermediate-term government bonds (10-year Treasury)",
};

const CRYPTO: ReturnAssumption = ReturnAssumption {
    mean_return: 0.15,
    std_dev: 0.60,
    description: "Highly speculative - based on limited Bitcoin history (2013-2024)",
};

const OTHER: ReturnAssumption = ReturnAssumption {
    mean_return: 0.03,
    std_dev: 0.05,
    description: "Cash equivalents, money market funds, and other low-risk assets",
};

/// Assumptions for a named asset class; classes without assumptions do not
/// contribute to sampled returns.
pub fn assumption_for(class: &str) -> Option<&'static ReturnAssumption> {
    match class {
        "Stocks" => Some(&STOCKS),
        "Bonds" => Some(&BONDS),
        "Crypto" => Some(&CRYPTO),
        "Other" => Some(&OTHER),
        _ => None,
    }
}
