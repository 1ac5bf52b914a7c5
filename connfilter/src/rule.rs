use connfilter_common::{RuleSlot, RuleTable, Verdict, ANY, ANY_PORT};

use crate::Result;

/// Owned description of a rule, written to a table slot with [`insert_into`](Rule::insert_into).
///
/// Every field starts as its wildcard.
///
/// # Example
/// ```
/// # use connfilter::{Rule, RuleTable, Verdict};
/// let mut table = RuleTable::new();
/// Rule::new(Verdict::Reject)
///     .with_destination("8.8.8.8")
///     .with_port(53)
///     .insert_into(&mut table, 0)
///     .unwrap();
/// assert_eq!(table.active_count(), 1);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Rule {
    source: String,
    destination: String,
    destination_port: u16,
    master_protocol: String,
    application_protocol: String,
    policy: Verdict,
}

impl Rule {
    /// Creates a rule matching every connection with the given verdict.
    pub fn new(policy: Verdict) -> Self {
        Self {
            source: ANY.to_string(),
            destination: ANY.to_string(),
            destination_port: ANY_PORT,
            master_protocol: ANY.to_string(),
            application_protocol: ANY.to_string(),
            policy,
        }
    }

    /// Rule stored in `slot`, `None` for an inactive slot.
    pub fn from_slot(slot: &RuleSlot) -> Option<Self> {
        if !slot.is_active() {
            return None;
        }
        Some(Self {
            source: slot.source().to_string(),
            destination: slot.destination().to_string(),
            destination_port: slot.destination_port(),
            master_protocol: slot.master_protocol().to_string(),
            application_protocol: slot.application_protocol().to_string(),
            policy: slot.policy()?,
        })
    }

    pub fn with_source(self, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..self
        }
    }

    pub fn with_destination(self, destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..self
        }
    }

    /// Port 0 matches every port.
    pub fn with_port(self, destination_port: u16) -> Self {
        Self {
            destination_port,
            ..self
        }
    }

    pub fn with_master_protocol(self, master_protocol: impl Into<String>) -> Self {
        Self {
            master_protocol: master_protocol.into(),
            ..self
        }
    }

    pub fn with_application(self, application_protocol: impl Into<String>) -> Self {
        Self {
            application_protocol: application_protocol.into(),
            ..self
        }
    }

    pub fn policy(&self) -> Verdict {
        self.policy
    }

    /// Writes the rule at `index`, overwriting the slot.
    pub fn insert_into(&self, table: &mut RuleTable, index: usize) -> Result<()> {
        table.set_rule(
            index,
            &self.source,
            &self.destination,
            self.destination_port,
            &self.master_protocol,
            &self.application_protocol,
            self.policy,
        )?;
        Ok(())
    }
}
