#![cfg_attr(not(feature = "user"), no_std)]
mod rule_table;

pub use rule_table::{
    Connection, Field, RuleSlot, RuleTable, Verdict, ANY, ANY_PORT, FIELD_CAP, MAX_RULES,
};

#[cfg(feature = "user")]
pub use rule_table::RuleTableError;
