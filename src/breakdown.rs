//! Usage breakdowns by product version and by user

use crate::models::{columns, SessionTable, UserUsage, VersionUsage, NOT_AVAILABLE};
use crate::summary::round_to;
use std::collections::HashMap;
use tracing::warn;

/// Sessions per product version, most used first
pub fn version_usage(table: &SessionTable) -> Vec<VersionUsage> {
    if !table.has_column(columns::VERSION) {
        warn!(source = %table.source, "Session log has no version column");
        return Vec::new();
    }

    let mut counts: HashMap<&str, u64> = HashMap::new();
    for session in table.sessions() {
        *counts
            .entry(session.version.as_deref().unwrap_or(NOT_AVAILABLE))
            .or_default() += 1;
    }

    let mut usage: Vec<VersionUsage> = counts
        .into_iter()
        .map(|(product, sessions)| VersionUsage {
            product: product.to_string(),
            sessions,
        })
        .collect();
    usage.sort_by(|a, b| b.sessions.cmp(&a.sessions).then_with(|| a.product.cmp(&b.product)));
    usage
}

/// The `limit` users with the most sessions, with their total hours
pub fn top_users(table: &SessionTable, limit: usize) -> Vec<UserUsage> {
    if !table.has_column(columns::USERNAME) {
        warn!(source = %table.source, "Session log has no username column");
        return Vec::new();
    }

    let mut totals: HashMap<&str, (u64, f64)> = HashMap::new();
    for session in table.sessions() {
        let entry = totals
            .entry(session.username.as_deref().unwrap_or(NOT_AVAILABLE))
            .or_default();
        entry.0 += 1;
        entry.1 += session.hours();
    }

    let mut users: Vec<UserUsage> = totals
        .into_iter()
        .map(|(username, (sessions, hours))| UserUsage {
            username: username.to_string(),
            sessions,
            hours: round_to(hours, 0),
        })
        .collect();
    users.sort_by(|a, b| b.sessions.cmp(&a.sessions).then_with(|| a.username.cmp(&b.username)));
    users.truncate(limit);
    users
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionRecord, SessionRow};

    fn table(headers: &[&str], rows: &[(Option<&str>, Option<&str>, f64)]) -> SessionTable {
        let mut table = SessionTable::new("b.csv", headers.iter().map(|h| h.to_string()).collect());
        table.rows = rows
            .iter()
            .map(|(user, version, duration)| SessionRow {
                raw: Vec::new(),
                session: SessionRecord {
                    username: user.map(str::to_string),
                    version: version.map(str::to_string),
                    duration_sec: Some(*duration),
                    ..Default::default()
                },
            })
            .collect();
        table
    }

    #[test]
    fn test_version_usage_ordering() {
        let t = table(
            &["username", "version"],
            &[
                (Some("a"), Some("1.9.1"), 0.0),
                (Some("a"), Some("1.9.0"), 0.0),
                (Some("b"), Some("1.9.1"), 0.0),
                (Some("c"), Some("2.0.0"), 0.0),
                (Some("c"), None, 0.0),
            ],
        );

        let usage = version_usage(&t);
        let flat: Vec<(&str, u64)> =
            usage.iter().map(|v| (v.product.as_str(), v.sessions)).collect();
        assert_eq!(flat, vec![("1.9.1", 2), ("1.9.0", 1), ("2.0.0", 1), ("N/A", 1)]);
    }

    #[test]
    fn test_top_users_hours_and_limit() {
        let t = table(
            &["username", "version"],
            &[
                (Some("alice"), None, 3600.0),
                (Some("alice"), None, 5400.0),
                (Some("bob"), None, 7200.0),
                (Some("carol"), None, 60.0),
            ],
        );

        let users = top_users(&t, 2);
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[0].sessions, 2);
        // 2.5 hours rounds away from zero
        assert_eq!(users[0].hours, 3.0);
        assert_eq!(users[1].username, "bob");
        assert_eq!(users[1].hours, 2.0);
    }

    #[test]
    fn test_missing_columns_give_empty_breakdowns() {
        let t = table(&["session_state"], &[(None, None, 10.0)]);
        assert!(version_usage(&t).is_empty());
        assert!(top_users(&t, 15).is_empty());
    }
}
