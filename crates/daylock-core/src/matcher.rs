//! Process-to-rule identity matching
//!
//! Process table entries are frequently missing an accessible executable
//! path (permissions, or the process exited mid-enumeration), so the name
//! is the primary matching signal and path equality is a stronger
//! secondary confirmation. Known limitation, accepted as a
//! precision/availability trade-off: two different binaries sharing a
//! filename match the same rule.

use daylock_api::{ProcessSnapshot, Rule};
use daylock_util::{normalize_name, normalize_path};

/// Decide whether a live process matches a rule.
///
/// 1. Names normalized (lowercase, whitespace stripped) and equal ->
///    match, regardless of path.
/// 2. Otherwise, if the snapshot carries a path: both paths normalized
///    (lowercase, separators unified) and exactly equal -> match.
/// 3. Otherwise no match.
pub fn matches(snapshot: &ProcessSnapshot, rule: &Rule) -> bool {
    if normalize_name(&snapshot.name) == normalize_name(&rule.display_name) {
        return true;
    }

    if let Some(path) = &snapshot.path {
        let reported = normalize_path(&path.to_string_lossy());
        if !reported.is_empty() && reported == normalize_path(&rule.identity_path) {
            return true;
        }
    }

    false
}

/// First rule matching the process, by store iteration order. Identities
/// are unique per store, so ties do not arise in practice.
pub fn find_rule<'a>(snapshot: &ProcessSnapshot, rules: &'a [Rule]) -> Option<&'a Rule> {
    rules.iter().find(|rule| matches(snapshot, rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use daylock_api::DaySet;
    use daylock_util::{RuleId, RuleIdentity};
    use std::path::PathBuf;

    fn rule_for(path: &str) -> Rule {
        Rule {
            id: RuleId::new(1),
            identity: RuleIdentity::from_path(path),
            identity_path: path.into(),
            display_name: daylock_util::display_name_of(path).unwrap(),
            allowed_days: DaySet::empty(),
        }
    }

    #[test]
    fn matches_by_name_case_and_whitespace_insensitive() {
        let rule = rule_for("C:\\Program Files\\Chrome.exe");
        let snapshot = ProcessSnapshot::new(1, "chrome .exe", None);

        assert!(matches(&snapshot, &rule));
    }

    #[test]
    fn matches_by_name_ignores_path() {
        let rule = rule_for("C:\\Apps\\game.exe");
        // Same filename from a different location still matches: accepted
        // false-positive trade-off.
        let snapshot = ProcessSnapshot::new(
            2,
            "game.exe",
            Some(PathBuf::from("D:\\Other\\game.exe")),
        );

        assert!(matches(&snapshot, &rule));
    }

    #[test]
    fn matches_by_path_when_names_differ() {
        let rule = rule_for("C:\\Apps\\game.exe");
        let snapshot = ProcessSnapshot::new(
            3,
            "wine-preloader",
            Some(PathBuf::from("c:/apps/GAME.EXE")),
        );

        assert!(matches(&snapshot, &rule));
    }

    #[test]
    fn no_match_without_name_or_path_equality() {
        let rule = rule_for("/usr/bin/game");
        let no_path = ProcessSnapshot::new(4, "editor", None);
        let other_path = ProcessSnapshot::new(5, "editor", Some(PathBuf::from("/usr/bin/editor")));

        assert!(!matches(&no_path, &rule));
        assert!(!matches(&other_path, &rule));
    }

    #[test]
    fn find_rule_returns_first_match() {
        let rules = vec![rule_for("/usr/bin/alpha"), rule_for("/usr/bin/beta")];
        let snapshot = ProcessSnapshot::new(6, "beta", None);

        let found = find_rule(&snapshot, &rules).unwrap();
        assert_eq!(found.display_name, "beta");
    }

    #[test]
    fn find_rule_none_for_unmanaged() {
        let rules = vec![rule_for("/usr/bin/alpha")];
        let snapshot = ProcessSnapshot::new(7, "unrelated", None);

        assert!(find_rule(&snapshot, &rules).is_none());
    }
}
