use super::types::{GrowthSample, SimulationParameters, SimulationResult};

pub const MONTHS_PER_YEAR: f64 = 12.0;
/// Hard stop for runs that never reach the target (100 years).
pub const MAX_MONTHS: u32 = 1200;

/// Runs the monthly compounding loop until the balance reaches the target or
/// the month cap expires.
///
/// Within a month the order is fixed: compound, contribute, then (optionally)
/// deflate the whole balance back into present-value terms. The deflation hits
/// principal and growth alike, so inflation-adjusted runs compound the deflation
/// month over month.
pub fn simulate(params: &SimulationParameters) -> SimulationResult {
    let monthly_growth = 1.0 + params.annual_return_rate / MONTHS_PER_YEAR;
    let monthly_deflator = 1.0 + params.annual_inflation_rate / MONTHS_PER_YEAR;

    let mut balance = params.initial_balance;
    let mut cumulative_contributions = 0.0;
    let mut crossover_years = None;
    let mut samples = Vec::new();
    let mut month = 0u32;

    while balance < params.target_balance && month < MAX_MONTHS {
        balance *= monthly_growth;
        balance += params.monthly_contribution;
        cumulative_contributions += params.monthly_contribution;

        if params.adjust_for_inflation {
            balance /= monthly_deflator;
        }

        let time_years = month_to_years(month);
        samples.push(GrowthSample {
            time_years,
            balance,
        });

        if crossover_years.is_none() && balance - params.initial_balance > cumulative_contributions
        {
            crossover_years = Some(time_years);
        }

        month += 1;
    }

    SimulationResult {
        samples,
        years_to_target: month_to_years(month),
        crossover_years,
    }
}

fn month_to_years(month: u32) -> f64 {
    month as f64 / MONTHS_PER_YEAR
}
