use super::{Connection, Field, RuleSlot, RuleTable, Verdict, ANY_PORT};

impl Field {
    #[inline]
    fn accepts(&self, value: &str) -> bool {
        self.is_any() || self.as_str() == value
    }
}

impl RuleSlot {
    /// Whether this slot is active and every field is either its wildcard or equal to the
    /// connection's value.
    pub fn matches(&self, conn: &Connection<'_>) -> bool {
        self.active
            && self.source.accepts(conn.source)
            && self.destination.accepts(conn.destination)
            && (self.destination_port == ANY_PORT || self.destination_port == conn.destination_port)
            && self.master_protocol.accepts(conn.master_protocol)
            && self.application_protocol.accepts(conn.application_protocol)
    }
}

impl RuleTable {
    /// Verdict of the first matching slot.
    ///
    /// Position decides, a later and more specific rule never wins over an earlier one.
    pub fn lookup(&self, conn: &Connection<'_>) -> Option<Verdict> {
        self.lookup_slot(conn).map(|(_, verdict)| verdict)
    }

    /// Same as [`lookup`](Self::lookup) but also returns the index of the matching slot.
    pub fn lookup_slot(&self, conn: &Connection<'_>) -> Option<(usize, Verdict)> {
        let (index, slot) = self
            .slots
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.matches(conn))?;
        slot.policy.map(|verdict| (index, verdict))
    }
}
