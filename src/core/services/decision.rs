//! Review decision table
//!
//! | mode            | Accept   | Decline  | NoOpinion |
//! |-----------------|----------|----------|-----------|
//! | normal          | accept   | decline  | defer     |
//! | no              | defer    | defer    | defer     |
//! | accept          | accept   | accept   | accept    |
//! | accept-onpass   | accept   | defer    | defer     |
//! | fallback-onfail | accept   | delegate | defer     |
//! | fallback-always | delegate | delegate | delegate  |

use crate::core::models::{CheckOutcome, Decision, ReviewMode};

/// Map a check outcome to a decision under `mode`
#[must_use]
pub const fn decide(mode: ReviewMode, outcome: CheckOutcome) -> Decision {
    match (mode, outcome) {
        (ReviewMode::NoOp, _) => Decision::Defer,
        (ReviewMode::AcceptAlways, _) => Decision::Accept,
        (ReviewMode::FallbackAlways, _) => Decision::Delegate,
        (_, CheckOutcome::NoOpinion) => Decision::Defer,
        (_, CheckOutcome::Accept) => Decision::Accept,
        (ReviewMode::Normal, CheckOutcome::Decline) => Decision::Decline,
        (ReviewMode::AcceptOnPass, CheckOutcome::Decline) => Decision::Defer,
        (ReviewMode::FallbackOnFail, CheckOutcome::Decline) => Decision::Delegate,
    }
}
