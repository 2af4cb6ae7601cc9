use crate::error::LearnerError;
use core_types::MaPeriods;
use itertools::Itertools;

/// Enumerates every `(short, long)` window pair of the search grid.
///
/// Window lengths are `1, 1 + step, 1 + 2*step, ...` strictly below `limit`; every
/// ascending pair of them is a candidate. Pairs come out ordered by `short`, then by
/// `long`.
pub fn generate_period_grid(step: usize, limit: usize) -> Result<Vec<MaPeriods>, LearnerError> {
    if step == 0 {
        return Err(LearnerError::InvalidGrid(
            "Step must be positive.".to_string(),
        ));
    }

    Ok((1..limit)
        .step_by(step)
        .tuple_combinations()
        .map(|(short, long)| MaPeriods::new(short, long))
        .collect())
}
