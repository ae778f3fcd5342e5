use super::error::FireError;
use super::types::TargetSpec;

/// FIRE number for a spending level: `annual_spending / (withdrawal_rate_percent / 100)`.
pub fn derive_target_from_spending(
    annual_spending: f64,
    withdrawal_rate_percent: f64,
) -> Result<f64, FireError> {
    if withdrawal_rate_percent == 0.0 {
        return Err(FireError::InvalidWithdrawalRate);
    }
    Ok(annual_spending / (withdrawal_rate_percent / 100.0))
}

impl TargetSpec {
    pub fn target_balance(&self) -> Result<f64, FireError> {
        derive_target_from_spending(self.annual_spending, self.withdrawal_rate)
    }
}

/// Level monthly contribution that grows `initial_balance` into `target_balance`
/// after `total_months` of compounding at `monthly_rate`, from the future value
/// of an ordinary annuity.
///
/// A negative result means the starting balance overshoots the target on its own.
pub fn required_monthly_contribution(
    target_balance: f64,
    initial_balance: f64,
    monthly_rate: f64,
    total_months: u32,
) -> Result<f64, FireError> {
    if monthly_rate == 0.0 {
        return Err(FireError::InvalidMonthlyRateForAnnuity);
    }
    if total_months == 0 {
        return Err(FireError::InvalidAnnuityHorizon);
    }

    let growth = (1.0 + monthly_rate).powf(total_months as f64);
    let shortfall = target_balance - initial_balance * growth;
    let contribution = shortfall * monthly_rate / (growth - 1.0);
    if !contribution.is_finite() {
        return Err(FireError::AnnuityOverflow);
    }
    Ok(contribution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    /// Replays the annuity month by month: compound first, then contribute.
    fn future_value(initial: f64, contribution: f64, monthly_rate: f64, months: u32) -> f64 {
        let mut balance = initial;
        for _ in 0..months {
            balance = balance * (1.0 + monthly_rate) + contribution;
        }
        balance
    }

    #[test]
    fn four_percent_rule_target() {
        let target = derive_target_from_spending(100_000.0, 4.0).expect("valid rate");
        assert_close(target, 2_500_000.0, 1e-6);
    }

    #[test]
    fn target_spec_delegates_to_derivation() {
        let spec = TargetSpec {
            annual_spending: 40_000.0,
            withdrawal_rate: 3.5,
        };
        let target = spec.target_balance().expect("valid rate");
        assert_close(target, 40_000.0 / 0.035, 1e-6);
    }

    #[test]
    fn zero_withdrawal_rate_is_rejected() {
        for spending in [0.0, 1.0, 100_000.0, -5.0] {
            assert_eq!(
                derive_target_from_spending(spending, 0.0),
                Err(FireError::InvalidWithdrawalRate)
            );
        }
        let spec = TargetSpec {
            annual_spending: 50_000.0,
            withdrawal_rate: 0.0,
        };
        assert_eq!(spec.target_balance(), Err(FireError::InvalidWithdrawalRate));
    }

    #[test]
    fn required_contribution_rejects_zero_rate() {
        assert_eq!(
            required_monthly_contribution(1_000_000.0, 0.0, 0.0, 120),
            Err(FireError::InvalidMonthlyRateForAnnuity)
        );
    }

    #[test]
    fn required_contribution_rejects_empty_horizon() {
        assert_eq!(
            required_monthly_contribution(1_000_000.0, 0.0, 0.005, 0),
            Err(FireError::InvalidAnnuityHorizon)
        );
    }

    #[test]
    fn required_contribution_rejects_overflowing_growth() {
        assert_eq!(
            required_monthly_contribution(2_500_000.0, 55_000.0, 0.07 / 12.0, u32::MAX),
            Err(FireError::AnnuityOverflow)
        );
    }

    #[test]
    fn required_contribution_from_zero_start() {
        let rate = 0.07 / 12.0;
        let pmt = required_monthly_contribution(1_000_000.0, 0.0, rate, 360).expect("valid");
        // Standard sinking-fund payment for $1M over 30 years at 7%.
        assert_close(pmt, 819.69, 0.01);
        assert_close(future_value(0.0, pmt, rate, 360), 1_000_000.0, 1e-4);
    }

    #[test]
    fn required_contribution_is_negative_when_start_overshoots() {
        let pmt = required_monthly_contribution(100_000.0, 200_000.0, 0.005, 12).expect("valid");
        assert!(pmt < 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_required_contribution_hits_target(
            target in 10_000u32..5_000_000,
            initial in 0u32..500_000,
            rate_bp in 1i32..150,
            months in 1u32..600
        ) {
            let rate = rate_bp as f64 / 10_000.0;
            let pmt = required_monthly_contribution(target as f64, initial as f64, rate, months)
                .expect("non-zero rate and horizon");
            let reached = future_value(initial as f64, pmt, rate, months);
            let scale = target as f64 + initial as f64 * (1.0 + rate).powf(months as f64);
            prop_assert!((reached - target as f64).abs() <= 1e-8 * scale);
        }
    }
}
