//! Day policy evaluation

use chrono::Weekday;
use daylock_api::Rule;

/// Whether the rule permits running on the given weekday.
///
/// Absence of a rule is handled by the caller: an unmatched process is
/// unmanaged and never terminated. Only an explicit rule with the current
/// day excluded triggers termination.
pub fn is_allowed_today(rule: &Rule, day: Weekday) -> bool {
    rule.allowed_days.contains_day(day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use daylock_api::DaySet;
    use daylock_util::{RuleId, RuleIdentity};

    fn weekend_rule() -> Rule {
        Rule {
            id: RuleId::new(1),
            identity: RuleIdentity::from_path("/usr/bin/game"),
            identity_path: "/usr/bin/game".into(),
            display_name: "game".into(),
            allowed_days: DaySet::WEEKEND,
        }
    }

    #[test]
    fn allowed_on_listed_day() {
        assert!(is_allowed_today(&weekend_rule(), Weekday::Sat));
        assert!(is_allowed_today(&weekend_rule(), Weekday::Sun));
    }

    #[test]
    fn denied_on_unlisted_day() {
        assert!(!is_allowed_today(&weekend_rule(), Weekday::Wed));
    }

    #[test]
    fn empty_day_set_denies_every_day() {
        let mut rule = weekend_rule();
        rule.allowed_days = DaySet::empty();
        assert!(!is_allowed_today(&rule, Weekday::Sat));
    }
}
