#![cfg(feature = "user")]

use crate::rule_table::{Field, RuleSlot, RuleTable, Verdict, FIELD_CAP, MAX_RULES};
use thiserror::Error;

impl RuleTable {
    /// Writes an active rule at `index`, replacing whatever the slot held.
    #[allow(clippy::too_many_arguments)]
    pub fn set_rule(
        &mut self,
        index: usize,
        source: &str,
        destination: &str,
        destination_port: u16,
        master_protocol: &str,
        application_protocol: &str,
        policy: Verdict,
    ) -> Result<(), RuleTableError> {
        let rule = RuleSlot {
            active: true,
            source: field("source", source)?,
            destination: field("destination", destination)?,
            master_protocol: field("master_protocol", master_protocol)?,
            application_protocol: field("application_protocol", application_protocol)?,
            destination_port,
            policy: Some(policy),
        };
        *self.slot_mut(index)? = rule;
        Ok(())
    }

    /// Clears the slot at `index`. Clearing an inactive slot does nothing.
    pub fn delete_rule(&mut self, index: usize) -> Result<(), RuleTableError> {
        *self.slot_mut(index)? = RuleSlot::EMPTY;
        Ok(())
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut RuleSlot, RuleTableError> {
        self.slots
            .get_mut(index)
            .ok_or(RuleTableError::InvalidIndex { index })
    }
}

fn field(name: &'static str, value: &str) -> Result<Field, RuleTableError> {
    Field::new(value).ok_or(RuleTableError::FieldTooLong {
        field: name,
        len: value.len(),
    })
}

#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleTableError {
    #[error("slot {index} is out of range, the table holds {} rules", MAX_RULES)]
    InvalidIndex { index: usize },
    #[error("{field} is {len} bytes long, at most {} are allowed", FIELD_CAP)]
    FieldTooLong { field: &'static str, len: usize },
}
