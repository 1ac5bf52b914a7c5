//! Connection filtering rule engine.
//!
//! Rules live in a fixed-capacity [`RuleTable`] and are matched first-match-wins against
//! incoming connection tuples. A [`RuleStore`] ties a table to its backing file, a [`Filter`]
//! adds a default verdict and connection logging on top of it.
//!
//! # Example
//! ```no_run
//! # use connfilter::{Connection, Filter, OpenMode, Rule, Verdict};
//! let mut filter = Filter::open("rules.bin", OpenMode::Create).unwrap();
//! filter
//!     .set_rule(0, &Rule::new(Verdict::Deny).with_application("Facebook"))
//!     .unwrap();
//! filter.set_rule(1, &Rule::new(Verdict::Allow)).unwrap();
//! let verdict = filter.evaluate(&Connection {
//!     source: "10.0.0.2",
//!     destination: "8.8.8.8",
//!     destination_port: 443,
//!     master_protocol: "HTTPS",
//!     application_protocol: "Facebook",
//! });
//! assert_eq!(verdict, Some(Verdict::Deny));
//! filter.close().unwrap();
//! ```
mod config;
mod error;
mod filter;
mod logger;
mod matcher;
mod pattern;
mod policy;
mod rule;
mod store;

pub use config::FilterConfig;
pub use connfilter_common::{
    Connection, RuleSlot, RuleTable, RuleTableError, Verdict, ANY, ANY_PORT, FIELD_CAP, MAX_RULES,
};
pub use error::Error;
pub use filter::Filter;
pub use matcher::match_connection;
pub use pattern::{extract, Pattern};
pub use policy::parse_policy;
pub use rule::Rule;
pub use store::{ImageError, OpenMode, RuleStore};

pub type Result<T> = std::result::Result<T, Error>;

const CONNECTION_LOG: &str = "connection_log";
