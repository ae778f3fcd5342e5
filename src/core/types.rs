use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    pub initial_balance: f64,
    /// Negative values model a net monthly withdrawal.
    pub monthly_contribution: f64,
    pub annual_return_rate: f64,
    pub annual_inflation_rate: f64,
    pub target_balance: f64,
    pub adjust_for_inflation: bool,
}

/// Spending-based framing of the target: `annual_spending / (withdrawal_rate / 100)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSpec {
    pub annual_spending: f64,
    /// Percentage points, e.g. `4.0`.
    pub withdrawal_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthSample {
    pub time_years: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub samples: Vec<GrowthSample>,
    pub years_to_target: f64,
    pub crossover_years: Option<f64>,
}

impl SimulationResult {
    pub fn months_simulated(&self) -> usize {
        self.samples.len()
    }

    /// Whether the last simulated month closed at or above `target_balance`.
    ///
    /// A run that stopped on the month cap reports `false` even though
    /// `years_to_target` is populated.
    pub fn reached_target(&self, target_balance: f64) -> bool {
        self.samples
            .last()
            .is_some_and(|sample| sample.balance >= target_balance)
    }
}
