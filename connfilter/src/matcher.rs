use connfilter_common::{Connection, RuleTable, Verdict};
use tracing::trace;

/// Verdict of the first active rule in `table` matching the connection, `None` when no rule
/// does.
///
/// Table order is the only tie-break. Put specific rules before general ones when the specific
/// ones should win.
pub fn match_connection(
    table: &RuleTable,
    source: &str,
    destination: &str,
    destination_port: u16,
    master_protocol: &str,
    application_protocol: &str,
) -> Option<Verdict> {
    let conn = Connection {
        source,
        destination,
        destination_port,
        master_protocol,
        application_protocol,
    };
    let matched = table.lookup_slot(&conn);
    match matched {
        Some((index, verdict)) => trace!(?conn, index, verdict = verdict.name(), "rule matched"),
        None => trace!(?conn, "no rule matched"),
    }
    matched.map(|(_, verdict)| verdict)
}
