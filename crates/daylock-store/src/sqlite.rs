//! SQLite-based rule store implementation

use chrono::Weekday;
use daylock_api::{DaySet, Rule};
use daylock_util::{display_name_of, RuleId, RuleIdentity};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::{RuleStore, StoreError, StoreResult};

/// SQLite-based rule store.
///
/// Access is serialized through an internal mutex; each worker opens its
/// own store instance, so no connection is shared unsynchronized across
/// the loop and the foreground. rusqlite autocommits every statement, so
/// mutations are durable before the call returns.
pub struct SqliteRuleStore {
    conn: Mutex<Connection>,
}

const DAY_COLUMNS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

fn day_column(day: Weekday) -> &'static str {
    DAY_COLUMNS[day.num_days_from_monday() as usize]
}

fn day_flags(days: DaySet) -> [i64; 7] {
    use Weekday::*;
    [Mon, Tue, Wed, Thu, Fri, Sat, Sun].map(|d| days.contains_day(d) as i64)
}

impl SqliteRuleStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            -- One logical row per managed identity. The UNIQUE constraint
            -- backs the replace-on-upsert contract.
            CREATE TABLE IF NOT EXISTS rules (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                identity TEXT NOT NULL UNIQUE,
                identity_path TEXT NOT NULL,
                display_name TEXT NOT NULL,
                monday INTEGER NOT NULL DEFAULT 0,
                tuesday INTEGER NOT NULL DEFAULT 0,
                wednesday INTEGER NOT NULL DEFAULT 0,
                thursday INTEGER NOT NULL DEFAULT 0,
                friday INTEGER NOT NULL DEFAULT 0,
                saturday INTEGER NOT NULL DEFAULT 0,
                sunday INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )?;

        debug!("Rule store schema initialized");
        Ok(())
    }

    fn rule_from_row(row: &Row<'_>) -> rusqlite::Result<Rule> {
        use Weekday::*;

        let identity: String = row.get(1)?;
        let mut allowed_days = DaySet::empty();
        for (i, day) in [Mon, Tue, Wed, Thu, Fri, Sat, Sun].into_iter().enumerate() {
            let flag: i64 = row.get(4 + i)?;
            if flag != 0 {
                allowed_days |= DaySet::from_weekday(day);
            }
        }

        Ok(Rule {
            id: RuleId::new(row.get(0)?),
            identity: RuleIdentity::from_path(&identity),
            identity_path: row.get(2)?,
            display_name: row.get(3)?,
            allowed_days,
        })
    }
}

impl RuleStore for SqliteRuleStore {
    fn upsert_rule(&self, identity_path: &str, allowed_days: DaySet) -> StoreResult<RuleId> {
        let identity_path = identity_path.trim();
        if identity_path.is_empty() {
            return Err(StoreError::InvalidRule("identity path is empty".into()));
        }

        let display_name = display_name_of(identity_path).ok_or_else(|| {
            StoreError::InvalidRule(format!(
                "identity path has no file name segment: {identity_path:?}"
            ))
        })?;

        let identity = RuleIdentity::from_path(identity_path);
        let [mon, tue, wed, thu, fri, sat, sun] = day_flags(allowed_days);

        let conn = self.conn.lock().unwrap();
        let id: i64 = conn.query_row(
            r#"
            INSERT INTO rules
                (identity, identity_path, display_name,
                 monday, tuesday, wednesday, thursday, friday, saturday, sunday)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(identity) DO UPDATE SET
                identity_path = excluded.identity_path,
                display_name = excluded.display_name,
                monday = excluded.monday,
                tuesday = excluded.tuesday,
                wednesday = excluded.wednesday,
                thursday = excluded.thursday,
                friday = excluded.friday,
                saturday = excluded.saturday,
                sunday = excluded.sunday
            RETURNING id
            "#,
            params![
                identity.as_str(),
                identity_path,
                display_name,
                mon,
                tue,
                wed,
                thu,
                fri,
                sat,
                sun
            ],
            |row| row.get(0),
        )?;

        debug!(identity = %identity, days = %allowed_days, "Rule upserted");
        Ok(RuleId::new(id))
    }

    fn list_rules(&self) -> StoreResult<Vec<Rule>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, identity, identity_path, display_name,
                   monday, tuesday, wednesday, thursday, friday, saturday, sunday
            FROM rules
            ORDER BY identity
            "#,
        )?;

        let rows = stmt.query_map([], Self::rule_from_row)?;

        let mut rules = Vec::new();
        for row in rows {
            rules.push(row?);
        }

        Ok(rules)
    }

    fn delete_rule(&self, identity: &RuleIdentity) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute("DELETE FROM rules WHERE identity = ?", [identity.as_str()])?;
        debug!(identity = %identity, removed, "Rule delete");
        Ok(())
    }

    fn is_allowed(&self, identity: &RuleIdentity, day: Weekday) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        // Column name comes from a fixed table, never from input.
        let sql = format!("SELECT {} FROM rules WHERE identity = ?", day_column(day));
        let flag: Option<i64> = conn
            .query_row(&sql, [identity.as_str()], |row| row.get(0))
            .optional()?;

        // No rule means unmanaged: never terminated.
        Ok(flag.map(|f| f != 0).unwrap_or(true))
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Rule store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_store() {
        let store = SqliteRuleStore::in_memory().unwrap();
        assert!(store.is_healthy());
        assert!(store.list_rules().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_and_list() {
        let store = SqliteRuleStore::in_memory().unwrap();

        store
            .upsert_rule("C:\\Apps\\game.exe", DaySet::WEEKEND)
            .unwrap();

        let rules = store.list_rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].display_name, "game.exe");
        assert_eq!(rules[0].identity_path, "C:\\Apps\\game.exe");
        assert_eq!(rules[0].allowed_days, DaySet::WEEKEND);
    }

    #[test]
    fn test_upsert_replaces_same_identity() {
        let store = SqliteRuleStore::in_memory().unwrap();

        let first = store
            .upsert_rule("C:\\Apps\\game.exe", DaySet::WEEKEND)
            .unwrap();
        // Same identity under normalization, different case and separators
        let second = store
            .upsert_rule("c:/apps/GAME.EXE", DaySet::MONDAY)
            .unwrap();

        let rules = store.list_rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].allowed_days, DaySet::MONDAY);
        assert_eq!(first, second);
    }

    #[test]
    fn test_delete_rule() {
        let store = SqliteRuleStore::in_memory().unwrap();

        store.upsert_rule("/usr/bin/game", DaySet::all()).unwrap();
        assert_eq!(store.list_rules().unwrap().len(), 1);

        store
            .delete_rule(&RuleIdentity::from_path("/usr/bin/game"))
            .unwrap();
        assert!(store.list_rules().unwrap().is_empty());
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let store = SqliteRuleStore::in_memory().unwrap();
        store
            .delete_rule(&RuleIdentity::from_path("/never/added"))
            .unwrap();
    }

    #[test]
    fn test_is_allowed() {
        let store = SqliteRuleStore::in_memory().unwrap();
        let identity = RuleIdentity::from_path("/usr/bin/game");

        // Unmanaged identity is always allowed
        assert!(store.is_allowed(&identity, Weekday::Wed).unwrap());

        store.upsert_rule("/usr/bin/game", DaySet::WEEKEND).unwrap();
        assert!(!store.is_allowed(&identity, Weekday::Wed).unwrap());
        assert!(store.is_allowed(&identity, Weekday::Sat).unwrap());
    }

    #[test]
    fn test_rejects_empty_path() {
        let store = SqliteRuleStore::in_memory().unwrap();

        assert!(matches!(
            store.upsert_rule("", DaySet::all()),
            Err(StoreError::InvalidRule(_))
        ));
        assert!(matches!(
            store.upsert_rule("   ", DaySet::all()),
            Err(StoreError::InvalidRule(_))
        ));
        assert!(matches!(
            store.upsert_rule("///", DaySet::all()),
            Err(StoreError::InvalidRule(_))
        ));
    }

    #[test]
    fn test_list_is_ordered_by_identity() {
        let store = SqliteRuleStore::in_memory().unwrap();

        store.upsert_rule("/usr/bin/zoo", DaySet::all()).unwrap();
        store.upsert_rule("/usr/bin/ant", DaySet::all()).unwrap();

        let rules = store.list_rules().unwrap();
        assert_eq!(rules[0].display_name, "ant");
        assert_eq!(rules[1].display_name, "zoo");
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("daylock.db");

        {
            let store = SqliteRuleStore::open(&db_path).unwrap();
            store
                .upsert_rule("/usr/bin/game", DaySet::SATURDAY)
                .unwrap();
        }

        let store = SqliteRuleStore::open(&db_path).unwrap();
        let rules = store.list_rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].allowed_days, DaySet::SATURDAY);
    }
}
