//! Configuration rules, checked with `Validation` so every violation is
//! reported at once.

use crate::config::violations::ConfigViolation;
use crate::config::SequencerConfig;
use crate::core::TimerKind;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Check every rule, accumulating ALL violations.
pub fn validate(config: &SequencerConfig) -> Validation<(), NonEmptyVec<ConfigViolation>> {
    let mut checks: Vec<Validation<(), NonEmptyVec<ConfigViolation>>> = Vec::new();

    for kind in TimerKind::ALL {
        let check = if config.timeouts.delay(kind).is_zero() {
            Validation::fail(ConfigViolation::ZeroDelay { kind })
        } else {
            Validation::success(())
        };
        checks.push(check);
    }

    let check = if config.history_limit == 0 {
        Validation::fail(ConfigViolation::ZeroHistoryLimit)
    } else {
        Validation::success(())
    };
    checks.push(check);

    Validation::all_vec(checks).map(|_| ())
}
