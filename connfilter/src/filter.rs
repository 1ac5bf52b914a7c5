use std::path::Path;

use connfilter_common::{Connection, RuleTable, Verdict};
use tracing::trace;

use crate::{logger::log_connection, FilterConfig, OpenMode, Result, Rule, RuleStore};

/// Rule store plus the runtime behavior applied around lookups.
///
/// Connections are matched first-match-wins against the store's table. When nothing matches
/// the configured default verdict, if any, is returned. `AllowWithLogging` verdicts are always
/// logged, other connections only after [`start_logging`](Filter::start_logging).
pub struct Filter {
    store: RuleStore,
    config: FilterConfig,
}

impl Filter {
    /// Opens the rule file at `path` with the default [`FilterConfig`].
    ///
    /// # Example
    /// ```no_run
    /// # use connfilter::{Filter, OpenMode};
    /// let filter = Filter::open("rules.bin", OpenMode::Load).unwrap();
    /// filter.close().unwrap();
    /// ```
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        Self::with_config(path, mode, FilterConfig::default())
    }

    pub fn with_config(
        path: impl AsRef<Path>,
        mode: OpenMode,
        config: FilterConfig,
    ) -> Result<Self> {
        Ok(Self {
            store: RuleStore::open(path, mode)?,
            config,
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Verdict for connections no rule matches. `None` keeps them unmatched.
    pub fn set_default_verdict(&mut self, verdict: Option<Verdict>) {
        self.config.default_verdict = verdict;
    }

    /// Logs every evaluated connection from now on, see [`tracing`] target `connection_log`.
    pub fn start_logging(&mut self) {
        self.config.log_connections = true;
    }

    pub fn table(&self) -> &RuleTable {
        self.store.table()
    }

    /// Writes `rule` at `index`, replacing the slot.
    pub fn set_rule(&mut self, index: usize, rule: &Rule) -> Result<()> {
        rule.insert_into(self.store.table_mut(), index)
    }

    pub fn delete_rule(&mut self, index: usize) -> Result<()> {
        self.store.table_mut().delete_rule(index)?;
        Ok(())
    }

    pub fn evaluate(&self, conn: &Connection<'_>) -> Option<Verdict> {
        let matched = self.store.table().lookup_slot(conn);
        trace!(?conn, ?matched, "evaluated connection");
        let verdict = matched
            .map(|(_, verdict)| verdict)
            .or(self.config.default_verdict);
        let inspected = verdict == Some(Verdict::AllowWithLogging);
        if self.config.log_connections || inspected {
            log_connection(*conn, verdict, matched.map(|(index, _)| index));
        }
        verdict
    }

    /// Persists the rules and closes the backing file.
    pub fn close(self) -> Result<()> {
        self.store.close()
    }
}

#[cfg(test)]
mod test {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use super::Filter;
    use crate::{Connection, FilterConfig, OpenMode, Rule, Verdict, CONNECTION_LOG};
    use serde_json::Value;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` and returns the JSON connection records it logged.
    fn connection_records(f: impl FnOnce()) -> Vec<Value> {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        output
            .lines()
            .filter(|line| line.contains(CONNECTION_LOG))
            .map(|line| serde_json::from_str(&line[line.find('{').unwrap()..]).unwrap())
            .collect()
    }

    const CONN: Connection<'static> = Connection {
        source: "10.13.13.2",
        destination: "8.8.8.8",
        destination_port: 53,
        master_protocol: "DNS",
        application_protocol: "Google",
    };

    #[test]
    fn default_verdict_only_applies_without_match() {
        let dir = TempDir::new().unwrap();
        let mut filter = Filter::open(dir.path().join("rules.bin"), OpenMode::Create).unwrap();
        assert_eq!(filter.evaluate(&CONN), None);

        filter.set_default_verdict(Some(Verdict::Reject));
        assert_eq!(filter.evaluate(&CONN), Some(Verdict::Reject));

        filter
            .set_rule(0, &Rule::new(Verdict::Allow).with_master_protocol("DNS"))
            .unwrap();
        assert_eq!(filter.evaluate(&CONN), Some(Verdict::Allow));

        filter.delete_rule(0).unwrap();
        assert_eq!(filter.evaluate(&CONN), Some(Verdict::Reject));
        filter.close().unwrap();
    }

    #[test]
    fn default_allow_with_logging_is_logged() {
        let dir = TempDir::new().unwrap();
        let mut filter = Filter::open(dir.path().join("rules.bin"), OpenMode::Create).unwrap();
        filter.set_default_verdict(Some(Verdict::AllowWithLogging));

        let records = connection_records(|| {
            assert_eq!(filter.evaluate(&CONN), Some(Verdict::AllowWithLogging));
        });
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["source"], "10.13.13.2");
        assert_eq!(records[0]["verdict"], "AllowWithLogging");
        assert_eq!(records[0]["rule"], Value::Null);
        filter.close().unwrap();
    }

    #[test]
    fn logged_records_carry_applied_verdict() {
        let dir = TempDir::new().unwrap();
        let mut filter = Filter::open(dir.path().join("rules.bin"), OpenMode::Create).unwrap();
        filter
            .set_rule(2, &Rule::new(Verdict::Allow).with_application("Google"))
            .unwrap();
        filter.set_default_verdict(Some(Verdict::Deny));

        let other = Connection {
            application_protocol: "Facebook",
            ..CONN
        };
        let records = connection_records(|| {
            filter.evaluate(&CONN);
        });
        assert!(records.is_empty());

        filter.start_logging();
        let records = connection_records(|| {
            assert_eq!(filter.evaluate(&CONN), Some(Verdict::Allow));
            assert_eq!(filter.evaluate(&other), Some(Verdict::Deny));
        });
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["verdict"], "Allow");
        assert_eq!(records[0]["rule"], 2);
        assert_eq!(records[1]["application_protocol"], "Facebook");
        assert_eq!(records[1]["verdict"], "Deny");
        assert_eq!(records[1]["rule"], Value::Null);
        filter.close().unwrap();
    }

    #[test]
    fn rules_persist_across_filters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.bin");
        let mut filter = Filter::open(&path, OpenMode::Create).unwrap();
        filter
            .set_rule(
                0,
                &Rule::new(Verdict::AllowWithLogging).with_application("Google"),
            )
            .unwrap();
        filter.start_logging();
        assert!(filter.config().log_connections);
        filter.close().unwrap();

        let config = FilterConfig {
            default_verdict: Some(Verdict::Deny),
            log_connections: false,
        };
        let filter = Filter::with_config(&path, OpenMode::Load, config).unwrap();
        assert_eq!(filter.table().active_count(), 1);
        assert_eq!(filter.evaluate(&CONN), Some(Verdict::AllowWithLogging));
        let other = Connection {
            application_protocol: "Facebook",
            ..CONN
        };
        assert_eq!(filter.evaluate(&other), Some(Verdict::Deny));
        filter.close().unwrap();
    }
}
