mod lookup;
mod user;

use core::fmt;

#[cfg(feature = "user")]
pub use user::RuleTableError;

#[cfg(feature = "rules256")]
pub const MAX_RULES: usize = 256;
#[cfg(feature = "rules128")]
pub const MAX_RULES: usize = 128;
#[cfg(feature = "rules64")]
pub const MAX_RULES: usize = 64;
#[cfg(feature = "rules32")]
pub const MAX_RULES: usize = 32;
#[cfg(feature = "rules16")]
pub const MAX_RULES: usize = 16;

/// Wildcard for the string fields of a rule.
pub const ANY: &str = "any";
/// Wildcard for the destination port of a rule.
pub const ANY_PORT: u16 = 0;

// A field plus its length byte is 64 bytes in the persisted image.
pub const FIELD_CAP: usize = 63;

/// Verdict applied to the connections matched by a rule.
///
/// The `FromStr` implementation only accepts the exact, case-sensitive policy names.
#[repr(u8)]
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
    strum_macros::EnumCount,
)]
#[cfg_attr(
    feature = "user",
    derive(
        Debug,
        Hash,
        num_derive::FromPrimitive,
        serde::Serialize,
        serde::Deserialize
    )
)]
pub enum Verdict {
    /// Let the connection through.
    #[strum(serialize = "ALLOW")]
    Allow = 1,
    /// Drop the connection silently.
    #[strum(serialize = "DENY")]
    Deny = 2,
    /// Refuse the connection and tell the peer.
    #[strum(serialize = "REJECT")]
    Reject = 3,
    /// Let the connection through but have it inspected and logged.
    #[strum(serialize = "ALLOW with IPS")]
    AllowWithLogging = 4,
}

impl Verdict {
    /// Policy name as accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Bounded, inline string used for every textual field of a rule.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Field {
    len: u8,
    bytes: [u8; FIELD_CAP],
}

impl Field {
    pub const EMPTY: Field = Field {
        len: 0,
        bytes: [0; FIELD_CAP],
    };

    /// Returns `None` when `value` doesn't fit in [`FIELD_CAP`] bytes.
    pub fn new(value: &str) -> Option<Self> {
        let raw = value.as_bytes();
        if raw.len() > FIELD_CAP {
            return None;
        }
        let mut bytes = [0; FIELD_CAP];
        bytes[..raw.len()].copy_from_slice(raw);
        Some(Self {
            len: raw.len() as u8,
            bytes,
        })
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }

    pub fn is_any(&self) -> bool {
        self.as_str() == ANY
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

/// Connection tuple looked up against a [`RuleTable`].
#[derive(Clone, Copy)]
#[cfg_attr(feature = "user", derive(Debug, serde::Serialize))]
pub struct Connection<'a> {
    pub source: &'a str,
    pub destination: &'a str,
    pub destination_port: u16,
    pub master_protocol: &'a str,
    pub application_protocol: &'a str,
}

/// One position of a [`RuleTable`].
///
/// Inactive slots are all-empty, an active slot always carries a verdict.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "user", derive(Debug))]
pub struct RuleSlot {
    active: bool,
    source: Field,
    destination: Field,
    master_protocol: Field,
    application_protocol: Field,
    destination_port: u16,
    policy: Option<Verdict>,
}

impl RuleSlot {
    pub const EMPTY: RuleSlot = RuleSlot {
        active: false,
        source: Field::EMPTY,
        destination: Field::EMPTY,
        master_protocol: Field::EMPTY,
        application_protocol: Field::EMPTY,
        destination_port: 0,
        policy: None,
    };

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn source(&self) -> &str {
        self.source.as_str()
    }

    pub fn destination(&self) -> &str {
        self.destination.as_str()
    }

    pub fn master_protocol(&self) -> &str {
        self.master_protocol.as_str()
    }

    pub fn application_protocol(&self) -> &str {
        self.application_protocol.as_str()
    }

    pub fn destination_port(&self) -> u16 {
        self.destination_port
    }

    pub fn policy(&self) -> Option<Verdict> {
        self.policy
    }
}

impl Default for RuleSlot {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Fixed-capacity, ordered table of rules.
///
/// Slots are addressed by index and never shift, the position of a rule is its priority.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "user", derive(Debug))]
pub struct RuleTable {
    slots: [RuleSlot; MAX_RULES],
}

impl RuleTable {
    /// Table with every slot inactive.
    pub const fn new() -> Self {
        Self {
            slots: [RuleSlot::EMPTY; MAX_RULES],
        }
    }

    pub const fn capacity(&self) -> usize {
        MAX_RULES
    }

    /// Slot at `index`, active or not. `None` only when `index` is out of range.
    pub fn get_rule(&self, index: usize) -> Option<&RuleSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[RuleSlot] {
        &self.slots
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}
