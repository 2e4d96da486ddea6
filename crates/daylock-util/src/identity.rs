//! Identity types for daylock rules
//!
//! A rule is keyed by the *normalized* form of the path it protects:
//! lowercase, with path separators unified to `/`. Process names are
//! normalized separately (lowercase, whitespace stripped) because process
//! tables report names with inconsistent casing and stray spaces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Database row identifier for a stored rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(i64);

impl RuleId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized identity key associating a running process with a rule.
///
/// Two paths that differ only in case or separator style produce the same
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleIdentity(String);

impl RuleIdentity {
    /// Build an identity from a raw path. Normalization is idempotent, so
    /// this also accepts an already-normalized identity string.
    pub fn from_path(path: &str) -> Self {
        Self(normalize_path(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize a filesystem path for comparison: trim, unify `\` to `/`,
/// lowercase.
pub fn normalize_path(path: &str) -> String {
    path.trim().replace('\\', "/").to_lowercase()
}

/// Normalize a process or file name for comparison: lowercase with all
/// whitespace stripped.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Derive the display name (last path segment) from an identity path.
/// Returns None when the path has no non-empty segment.
pub fn display_name_of(path: &str) -> Option<String> {
    let unified = path.trim().replace('\\', "/");
    unified
        .rsplit('/')
        .map(str::trim)
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_case_and_separator_insensitive() {
        let a = RuleIdentity::from_path("C:\\Apps\\Game.exe");
        let b = RuleIdentity::from_path("c:/apps/game.exe");
        assert_eq!(a, b);
    }

    #[test]
    fn identity_normalization_is_idempotent() {
        let raw = "C:\\Apps\\Game.exe";
        let once = RuleIdentity::from_path(raw);
        let twice = RuleIdentity::from_path(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn name_normalization_strips_whitespace() {
        assert_eq!(normalize_name("Chrome.exe"), normalize_name("chrome .exe"));
        assert_eq!(normalize_name(" My App "), "myapp");
    }

    #[test]
    fn display_name_is_last_segment() {
        assert_eq!(display_name_of("C:\\Apps\\game.exe").as_deref(), Some("game.exe"));
        assert_eq!(display_name_of("/usr/bin/steam").as_deref(), Some("steam"));
        assert_eq!(display_name_of("bare.exe").as_deref(), Some("bare.exe"));
        // Trailing separator falls back to the previous segment
        assert_eq!(display_name_of("/usr/bin/").as_deref(), Some("bin"));
    }

    #[test]
    fn display_name_rejects_empty_paths() {
        assert!(display_name_of("").is_none());
        assert!(display_name_of("   ").is_none());
        assert!(display_name_of("///").is_none());
    }

    #[test]
    fn ids_serialize_deserialize() {
        let identity = RuleIdentity::from_path("/usr/bin/game");
        let json = serde_json::to_string(&identity).unwrap();
        let parsed: RuleIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(identity, parsed);

        let id = RuleId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        let parsed: RuleId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
