use connfilter_common::{Connection, Verdict};
use serde::Serialize;

use crate::CONNECTION_LOG;

#[derive(Debug, Clone, Serialize)]
struct ConnectionLog<'a> {
    #[serde(flatten)]
    connection: Connection<'a>,
    verdict: Option<Verdict>,
    rule: Option<usize>,
    timestamp: String,
}

impl<'a> ConnectionLog<'a> {
    fn new(connection: Connection<'a>, verdict: Option<Verdict>, rule: Option<usize>) -> Self {
        let timestamp =
            chrono::offset::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        Self {
            connection,
            verdict,
            rule,
            timestamp,
        }
    }
}

/// Emits one JSON record for the connection at `info` level under the `connection_log` target.
///
/// `verdict` is the one applied to the connection, `rule` the index of the slot that matched.
pub(crate) fn log_connection(
    connection: Connection<'_>,
    verdict: Option<Verdict>,
    rule: Option<usize>,
) {
    let Ok(record) = serde_json::to_string(&ConnectionLog::new(connection, verdict, rule)) else {
        return;
    };
    tracing::info!(target: CONNECTION_LOG, "{record}");
}
