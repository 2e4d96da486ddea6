//! Core data types: day sets, rules, process snapshots

use bitflags::bitflags;
use chrono::Weekday;
use daylock_util::{RuleId, RuleIdentity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

bitflags! {
    /// Set of weekdays an application is permitted to run.
    ///
    /// A day present in the set means the application MAY run that day;
    /// absent means running instances are terminated that day.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DaySet: u8 {
        const MONDAY = 1 << 0;
        const TUESDAY = 1 << 1;
        const WEDNESDAY = 1 << 2;
        const THURSDAY = 1 << 3;
        const FRIDAY = 1 << 4;
        const SATURDAY = 1 << 5;
        const SUNDAY = 1 << 6;

        const WEEKDAYS = Self::MONDAY.bits()
            | Self::TUESDAY.bits()
            | Self::WEDNESDAY.bits()
            | Self::THURSDAY.bits()
            | Self::FRIDAY.bits();
        const WEEKEND = Self::SATURDAY.bits() | Self::SUNDAY.bits();
    }
}

impl DaySet {
    /// The single-day set for a chrono weekday.
    pub fn from_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Mon => Self::MONDAY,
            Weekday::Tue => Self::TUESDAY,
            Weekday::Wed => Self::WEDNESDAY,
            Weekday::Thu => Self::THURSDAY,
            Weekday::Fri => Self::FRIDAY,
            Weekday::Sat => Self::SATURDAY,
            Weekday::Sun => Self::SUNDAY,
        }
    }

    pub fn from_days(days: &[Weekday]) -> Self {
        days.iter()
            .copied()
            .map(Self::from_weekday)
            .fold(Self::empty(), |acc, d| acc | d)
    }

    pub fn contains_day(&self, day: Weekday) -> bool {
        self.contains(Self::from_weekday(day))
    }

    /// Weekdays in the set, Monday first.
    pub fn days(&self) -> Vec<Weekday> {
        use Weekday::*;
        [Mon, Tue, Wed, Thu, Fri, Sat, Sun]
            .into_iter()
            .filter(|d| self.contains_day(*d))
            .collect()
    }
}

/// Error parsing a day-set string
#[derive(Debug, Error)]
#[error("unrecognized day name: {0:?}")]
pub struct DayParseError(String);

impl FromStr for DaySet {
    type Err = DayParseError;

    /// Parse a comma-separated list of day names. Short ("mon") and full
    /// ("monday") names are accepted, case-insensitive. `""` and `"none"`
    /// yield the empty set; `"all"`, `"weekdays"` and `"weekend"` are
    /// shorthands.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = DaySet::empty();
        for part in s.split(',') {
            let part = part.trim().to_lowercase();
            let day = match part.as_str() {
                "" | "none" => DaySet::empty(),
                "all" => DaySet::all(),
                "weekdays" => DaySet::WEEKDAYS,
                "weekend" => DaySet::WEEKEND,
                "mon" | "monday" => DaySet::MONDAY,
                "tue" | "tuesday" => DaySet::TUESDAY,
                "wed" | "wednesday" => DaySet::WEDNESDAY,
                "thu" | "thursday" => DaySet::THURSDAY,
                "fri" | "friday" => DaySet::FRIDAY,
                "sat" | "saturday" => DaySet::SATURDAY,
                "sun" | "sunday" => DaySet::SUNDAY,
                _ => return Err(DayParseError(part)),
            };
            set |= day;
        }
        Ok(set)
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "None");
        }
        let names: Vec<&str> = self.days().iter().map(|d| daylock_util::weekday_name(*d)).collect();
        write!(f, "{}", names.join(", "))
    }
}

impl Serialize for DaySet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DaySet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One protected-application policy.
///
/// Owned by the rule store; the enforcement loop only ever holds
/// read-only snapshots for the duration of a poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,

    /// Normalized uniqueness key derived from `identity_path`.
    pub identity: RuleIdentity,

    /// Path as originally supplied, used for exact path matching.
    pub identity_path: String,

    /// Last path segment of `identity_path`; never empty. Fallback
    /// matching key and display label.
    pub display_name: String,

    pub allowed_days: DaySet,
}

/// Ephemeral view of one running process, refreshed each poll.
///
/// `path` is absent when the executable link is unreadable (permissions,
/// or the process exited mid-enumeration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub name: String,
    pub path: Option<PathBuf>,
}

impl ProcessSnapshot {
    pub fn new(pid: u32, name: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            pid,
            name: name.into(),
            path,
        }
    }
}

/// Result of a termination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminateOutcome {
    /// Signal delivered; the process is going away.
    Terminated,
    /// Insufficient privileges; the process keeps running.
    AccessDenied,
    /// The process exited before the signal arrived. Benign race.
    NoSuchProcess,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dayset_from_weekday_roundtrip() {
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            let set = DaySet::from_weekday(day);
            assert!(set.contains_day(day));
            assert_eq!(set.days(), vec![day]);
        }
    }

    #[test]
    fn dayset_parse_names() {
        let set: DaySet = "mon,tue,saturday".parse().unwrap();
        assert!(set.contains_day(Weekday::Mon));
        assert!(set.contains_day(Weekday::Tue));
        assert!(set.contains_day(Weekday::Sat));
        assert!(!set.contains_day(Weekday::Wed));
    }

    #[test]
    fn dayset_parse_shorthands() {
        assert_eq!("all".parse::<DaySet>().unwrap(), DaySet::all());
        assert_eq!("weekdays".parse::<DaySet>().unwrap(), DaySet::WEEKDAYS);
        assert_eq!("weekend".parse::<DaySet>().unwrap(), DaySet::WEEKEND);
        assert_eq!("none".parse::<DaySet>().unwrap(), DaySet::empty());
    }

    #[test]
    fn dayset_parse_rejects_unknown() {
        assert!("mon,funday".parse::<DaySet>().is_err());
    }

    #[test]
    fn dayset_display_roundtrips_through_parse() {
        let set = DaySet::SATURDAY | DaySet::SUNDAY;
        assert_eq!(set.to_string(), "Saturday, Sunday");
        let parsed: DaySet = set.to_string().parse().unwrap();
        assert_eq!(parsed, set);

        let empty = DaySet::empty();
        assert_eq!(empty.to_string(), "None");
        assert_eq!(empty.to_string().parse::<DaySet>().unwrap(), empty);
    }

    #[test]
    fn rule_serializes() {
        let rule = Rule {
            id: RuleId::new(1),
            identity: RuleIdentity::from_path("/usr/bin/game"),
            identity_path: "/usr/bin/game".into(),
            display_name: "game".into(),
            allowed_days: DaySet::WEEKEND,
        };

        let json = serde_json::to_string(&rule).unwrap();
        let parsed: Rule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rule);
    }
}
