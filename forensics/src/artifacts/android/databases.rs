use super::packages::SETUP_PACKAGES;
use crate::{
    artifacts::{
        collection::{ExtractContext, new_candidate},
        diagnostics::Diagnostics,
        error::ExtractError,
    },
    utils::{
        temp::TempFile,
        time::{RawTime, ZoneConvention, normalize},
    },
};
use common::android::{ArtifactKind, TimestampCandidate};
use log::{error, warn};
use rusqlite::{Connection, OpenFlags, params_from_iter};

pub(crate) const ACCOUNTS_PATH: &str = "data/system_de/0/accounts_de.db";
pub(crate) const WELLBEING_PATH: &str =
    "data/data/com.google.android.apps.wellbeing/databases/app_usage";

pub(crate) const SETTINGS_PATH: &str =
    "data/data/com.android.providers.settings/databases/settings.db";

const ACCOUNTS_QUERY: &str = concat!(
    "SELECT MIN(last_password_entry_time_millis_epoch), 'accounts' FROM accounts ",
    "WHERE last_password_entry_time_millis_epoch > 0"
);

/// Settings tables and the names worth reading from each
const SETTINGS_FILTERS: [(&str, &str); 3] = [
    ("secure", "name LIKE '%setup%' OR name LIKE '%reset%'"),
    ("global", "name LIKE '%boot%' OR name LIKE '%first%'"),
    ("system", "name LIKE '%wizard%'"),
];

/// Rows returned from a database query. Value and what it describes
struct DatabaseRow {
    value: Option<i64>,
    name: String,
}

/// Earliest account credential entry. Accounts are added right after setup
pub(crate) fn accounts_database(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::AccountsDatabase;
    let data = match context.read(kind, ACCOUNTS_PATH, diagnostics) {
        Some(result) => result,
        None => return Vec::new(),
    };

    let rows = match query_database(&data, ACCOUNTS_QUERY, &[]) {
        Ok(result) => result,
        Err(err) => {
            diagnostics.query_failure(kind, ACCOUNTS_PATH, &err.to_string());
            return Vec::new();
        }
    };
    rows_to_candidates(
        kind,
        ACCOUNTS_PATH,
        "database earliest record",
        &rows,
        context.convention(kind),
        &data,
        diagnostics,
    )
}

/// Digital Wellbeing usage events for setup applications
pub(crate) fn wellbeing_usage(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::WellbeingUsage;
    let data = match context.read(kind, WELLBEING_PATH, diagnostics) {
        Some(result) => result,
        None => return Vec::new(),
    };

    let placeholders = vec!["?"; SETUP_PACKAGES.len()].join(",");
    let query = format!(
        "SELECT events.timestamp, packages.package_name FROM events \
         JOIN packages ON events.package_id = packages._id \
         WHERE packages.package_name IN ({placeholders}) ORDER BY events.timestamp LIMIT 100"
    );
    let rows = match query_database(&data, &query, &SETUP_PACKAGES) {
        Ok(result) => result,
        Err(err) => {
            diagnostics.query_failure(kind, WELLBEING_PATH, &err.to_string());
            return Vec::new();
        }
    };
    rows_to_candidates(
        kind,
        WELLBEING_PATH,
        "setup usage event",
        &rows,
        context.convention(kind),
        &data,
        diagnostics,
    )
}

/// Epoch values stored in the legacy settings provider database. Values are TEXT so only
/// all digit values of epoch length are read. Each table is queried on its own
pub(crate) fn settings_database(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::SettingsDatabase;
    let data = match context.read(kind, SETTINGS_PATH, diagnostics) {
        Some(result) => result,
        None => return Vec::new(),
    };

    let mut rows = Vec::new();
    let mut failures = 0;
    for (table, filter) in SETTINGS_FILTERS {
        let query = format!(
            "SELECT CAST(value AS INTEGER), '{table}:' || name FROM {table} \
             WHERE ({filter}) AND length(value) IN (10, 13) AND value NOT GLOB '*[^0-9]*' \
             LIMIT 100"
        );
        match query_database(&data, &query, &[]) {
            Ok(result) => rows.extend(result),
            Err(err) => {
                failures += 1;
                diagnostics.query_failure(kind, SETTINGS_PATH, &format!("{table}: {err}"));
            }
        }
    }
    if failures == SETTINGS_FILTERS.len() {
        return Vec::new();
    }

    rows_to_candidates(
        kind,
        SETTINGS_PATH,
        "settings value",
        &rows,
        context.convention(kind),
        &data,
        diagnostics,
    )
}

/// Materialize the database and run one read only query
fn query_database(
    data: &[u8],
    query: &str,
    params: &[&str],
) -> Result<Vec<DatabaseRow>, ExtractError> {
    let temp = match TempFile::create(data, "db") {
        Ok(result) => result,
        Err(err) => {
            error!("[databases] Could not stage database: {err:?}");
            return Err(ExtractError::SourceUnavailable);
        }
    };

    // Immutable so SQLite never creates journal files next to the copy
    let database = format!("file:{}?immutable=1", temp.path().display());
    let connection = Connection::open_with_flags(
        database,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
    );
    let conn = match connection {
        Ok(connect) => connect,
        Err(err) => {
            error!("[databases] Failed to open database: {err:?}");
            return Err(ExtractError::QueryFailure);
        }
    };

    let statement = conn.prepare(query);
    let mut stmt = match statement {
        Ok(result) => result,
        Err(err) => {
            warn!("[databases] Failed to compose query {query}: {err:?}");
            return Err(ExtractError::QueryFailure);
        }
    };

    let query_rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        Ok(DatabaseRow {
            value: row.get(0)?,
            name: row.get(1)?,
        })
    });
    let rows_iter = match query_rows {
        Ok(result) => result,
        Err(err) => {
            warn!("[databases] Failed to run query {query}: {err:?}");
            return Err(ExtractError::QueryFailure);
        }
    };

    let mut rows = Vec::new();
    for row in rows_iter {
        match row {
            Ok(result) => rows.push(result),
            Err(err) => warn!("[databases] Failed to read row: {err:?}"),
        }
    }
    Ok(rows)
}

fn rows_to_candidates(
    kind: ArtifactKind,
    path: &str,
    label: &str,
    rows: &[DatabaseRow],
    hint: ZoneConvention,
    data: &[u8],
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let mut candidates = Vec::new();
    let mut failed = false;
    for row in rows {
        let value = match row.value {
            Some(result) => result,
            None => continue,
        };
        match normalize(&RawTime::Integer(value), hint) {
            Ok(time) => candidates.push(new_candidate(
                kind,
                path,
                &format!("{label} ({})", row.name),
                &time,
                &value.to_string(),
            )),
            Err(err) => {
                failed = true;
                diagnostics.parse_failure(kind, path, &err.to_string(), data);
            }
        }
    }

    if candidates.is_empty() && !failed {
        diagnostics.no_time(kind, path, data);
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::{
        ACCOUNTS_PATH, SETTINGS_PATH, WELLBEING_PATH, accounts_database, settings_database,
        wellbeing_usage,
    };
    use crate::{
        artifacts::{collection::ExtractContext, diagnostics::Diagnostics},
        decoder::StaticDecoder,
        source::MemorySource,
        structs::toml::Timezone,
    };
    use chrono::DateTime;
    use common::diagnostics::DiagnosticKind;
    use rusqlite::Connection;
    use std::fs::{read, remove_file};

    fn build_database(name: &str, statements: &str) -> Vec<u8> {
        let path = std::env::temp_dir().join(name);
        let _ = remove_file(&path);
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(statements).unwrap();
        drop(conn);
        let data = read(&path).unwrap();
        let _ = remove_file(path);
        data
    }

    #[test]
    fn test_accounts_database() {
        let data = build_database(
            "wipetrace_accounts_test.db",
            "CREATE TABLE accounts (_id INTEGER PRIMARY KEY, name TEXT, type TEXT, last_password_entry_time_millis_epoch INTEGER);
             INSERT INTO accounts VALUES (1, 'user@gmail.com', 'com.google', 1732093000000);
             INSERT INTO accounts VALUES (2, 'user@samsung.com', 'com.osp.app.signin', 1732092500000);
             INSERT INTO accounts VALUES (3, 'broken', 'x', 0);",
        );
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(ACCOUNTS_PATH, &data, modified);
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        let results = accounts_database(&context, &mut diagnostics);
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].instant,
            DateTime::from_timestamp(1732092500, 0).unwrap()
        );
        assert_eq!(results[0].label, "database earliest record (accounts)");
        assert_eq!(results[0].original, "1732092500000");
    }

    #[test]
    fn test_accounts_database_missing_table() {
        let data = build_database(
            "wipetrace_accounts_bad_test.db",
            "CREATE TABLE other (_id INTEGER PRIMARY KEY);",
        );
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(ACCOUNTS_PATH, &data, modified);
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        assert!(accounts_database(&context, &mut diagnostics).is_empty());
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::QueryFailure);
    }

    #[test]
    fn test_wellbeing_usage() {
        let data = build_database(
            "wipetrace_wellbeing_test.db",
            "CREATE TABLE packages (_id INTEGER PRIMARY KEY, package_name TEXT);
             CREATE TABLE events (_id INTEGER PRIMARY KEY, timestamp INTEGER, type INTEGER, package_id INTEGER);
             INSERT INTO packages VALUES (1, 'com.google.android.setupwizard');
             INSERT INTO packages VALUES (2, 'com.android.chrome');
             INSERT INTO events VALUES (1, 1732092200000, 1, 1);
             INSERT INTO events VALUES (2, 1732092150000, 1, 1);
             INSERT INTO events VALUES (3, 1732092100000, 1, 2);",
        );
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(WELLBEING_PATH, &data, modified);
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        let results = wellbeing_usage(&context, &mut diagnostics);
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].instant,
            DateTime::from_timestamp(1732092150, 0).unwrap()
        );
        assert_eq!(
            results[0].label,
            "setup usage event (com.google.android.setupwizard)"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_not_a_database() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(WELLBEING_PATH, b"definitely not sqlite", modified);
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        assert!(wellbeing_usage(&context, &mut diagnostics).is_empty());
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::QueryFailure);
    }

    #[test]
    fn test_settings_database() {
        let data = build_database(
            "wipetrace_settings_test.db",
            "CREATE TABLE secure (_id INTEGER PRIMARY KEY, name TEXT, value TEXT);
             CREATE TABLE global (_id INTEGER PRIMARY KEY, name TEXT, value TEXT);
             INSERT INTO secure VALUES (1, 'user_setup_complete', '1');
             INSERT INTO secure VALUES (2, 'setup_wizard_start_time', '1732092131000');
             INSERT INTO secure VALUES (3, 'reset_token', 'abc1234567');
             INSERT INTO global VALUES (1, 'boot_count', '12');
             INSERT INTO global VALUES (2, 'first_boot_time', '1732092000');
             INSERT INTO global VALUES (3, 'wifi_on', '1732092999');",
        );
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(SETTINGS_PATH, &data, modified);
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        let results = settings_database(&context, &mut diagnostics);
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].label,
            "settings value (secure:setup_wizard_start_time)"
        );
        assert_eq!(
            results[0].instant,
            DateTime::from_timestamp(1732092131, 0).unwrap()
        );
        assert_eq!(results[0].original, "1732092131000");
        assert_eq!(results[1].label, "settings value (global:first_boot_time)");
        assert_eq!(
            results[1].instant,
            DateTime::from_timestamp(1732092000, 0).unwrap()
        );

        // No system table in this copy. The other tables are still read
        assert_eq!(diagnostics.entries().len(), 1);
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::QueryFailure);
        assert!(diagnostics.entries()[0].message.starts_with("system: "));
    }

    #[test]
    fn test_settings_database_not_a_database() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(SETTINGS_PATH, b"not sqlite either", modified);
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        assert!(settings_database(&context, &mut diagnostics).is_empty());
        assert_eq!(diagnostics.entries().len(), 3);
        assert!(
            diagnostics
                .entries()
                .iter()
                .all(|entry| entry.kind == DiagnosticKind::QueryFailure)
        );
    }
}
