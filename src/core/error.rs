use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FireError {
    #[error("withdrawal rate must be non-zero")]
    InvalidWithdrawalRate,
    #[error("monthly rate must be non-zero for the annuity formula")]
    InvalidMonthlyRateForAnnuity,
    #[error("annuity horizon must be at least one month")]
    InvalidAnnuityHorizon,
    #[error("annuity result overflows; shorten the horizon")]
    AnnuityOverflow,
}
