use connfilter_common::Verdict;

/// Maps a policy name to its [`Verdict`].
///
/// Only `"ALLOW"`, `"DENY"`, `"REJECT"` and `"ALLOW with IPS"` are recognized, compared
/// byte-for-byte. Anything else is `None`, which means no policy and never `Allow`.
pub fn parse_policy(name: &str) -> Option<Verdict> {
    name.parse().ok()
}
