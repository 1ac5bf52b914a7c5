// Layout, little endian:
// header: magic[4] | version u16 | capacity u16 | field width u16 | reserved u16 | payload len u32
// slot:   active u8 | 4 x (len u8 | bytes[FIELD_CAP]) | port u16 | policy u8
// Fields are source, destination, master protocol, application protocol. Policy 0 is unset.

use bytes::{Buf, BufMut, BytesMut};
use connfilter_common::{RuleTable, Verdict, FIELD_CAP, MAX_RULES};
use num_traits::FromPrimitive;
use thiserror::Error;

use crate::Result;

const MAGIC: &[u8; 4] = b"CFRT";
const VERSION: u16 = 1;

pub(super) const HEADER_LEN: usize = 16;
pub(super) const SLOT_LEN: usize = 1 + 4 * (1 + FIELD_CAP) + 2 + 1;
pub(super) const IMAGE_LEN: usize = HEADER_LEN + MAX_RULES * SLOT_LEN;

/// Reasons a rule file is refused on load.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("rule image is {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },
    #[error("not a rule table image")]
    BadMagic,
    #[error("rule image version {found} is not supported, expected {expected}")]
    VersionMismatch { found: u16, expected: u16 },
    #[error("rule image holds {found} slots, this build holds {expected}")]
    CapacityMismatch { found: u16, expected: u16 },
    #[error("rule image fields are {found} bytes wide, expected {expected}")]
    FieldWidthMismatch { found: u16, expected: u16 },
    #[error("slot {index} of the rule image is invalid: {reason}")]
    InvalidSlot { index: usize, reason: &'static str },
}

pub(super) fn encode(table: &RuleTable) -> BytesMut {
    let mut buf = BytesMut::with_capacity(IMAGE_LEN);
    buf.put_slice(MAGIC);
    buf.put_u16_le(VERSION);
    buf.put_u16_le(MAX_RULES as u16);
    buf.put_u16_le(FIELD_CAP as u16);
    buf.put_u16_le(0);
    buf.put_u32_le((MAX_RULES * SLOT_LEN) as u32);

    for slot in table.slots() {
        buf.put_u8(u8::from(slot.is_active()));
        for field in [
            slot.source(),
            slot.destination(),
            slot.master_protocol(),
            slot.application_protocol(),
        ] {
            put_field(&mut buf, field);
        }
        buf.put_u16_le(slot.destination_port());
        buf.put_u8(slot.policy().map_or(0, |verdict| verdict as u8));
    }
    buf
}

fn put_field(buf: &mut BytesMut, value: &str) {
    // Table fields never exceed FIELD_CAP
    buf.put_u8(value.len() as u8);
    buf.put_slice(value.as_bytes());
    buf.put_bytes(0, FIELD_CAP - value.len());
}

pub(super) fn decode(mut buf: &[u8]) -> Result<Box<RuleTable>> {
    check_header(&mut buf)?;

    let mut table = Box::new(RuleTable::new());
    for index in 0..MAX_RULES {
        let invalid = |reason| ImageError::InvalidSlot { index, reason };
        let active = match buf.get_u8() {
            0 => false,
            1 => true,
            _ => return Err(invalid("active flag is neither 0 nor 1").into()),
        };
        let mut fields = [""; 4];
        for field in fields.iter_mut() {
            let (len, raw) = take_field(&mut buf);
            if active {
                let raw = raw
                    .get(..len as usize)
                    .ok_or_else(|| invalid("field length exceeds the field width"))?;
                *field = std::str::from_utf8(raw).map_err(|_| invalid("field is not UTF-8"))?;
            }
        }
        let port = buf.get_u16_le();
        let policy = buf.get_u8();

        // Inactive slots carry nothing worth keeping.
        if !active {
            continue;
        }
        let policy = Verdict::from_u8(policy).ok_or_else(|| invalid("unknown policy code"))?;
        let [source, destination, master_protocol, application_protocol] = fields;
        table.set_rule(
            index,
            source,
            destination,
            port,
            master_protocol,
            application_protocol,
            policy,
        )?;
    }
    Ok(table)
}

fn check_header(buf: &mut &[u8]) -> std::result::Result<(), ImageError> {
    let length_error = ImageError::Length {
        expected: IMAGE_LEN,
        actual: buf.len(),
    };
    if buf.len() < HEADER_LEN {
        return Err(length_error);
    }
    if &buf[..MAGIC.len()] != MAGIC {
        return Err(ImageError::BadMagic);
    }
    buf.advance(MAGIC.len());

    let version = buf.get_u16_le();
    if version != VERSION {
        return Err(ImageError::VersionMismatch {
            found: version,
            expected: VERSION,
        });
    }
    let capacity = buf.get_u16_le();
    if capacity as usize != MAX_RULES {
        return Err(ImageError::CapacityMismatch {
            found: capacity,
            expected: MAX_RULES as u16,
        });
    }
    let field_width = buf.get_u16_le();
    if field_width as usize != FIELD_CAP {
        return Err(ImageError::FieldWidthMismatch {
            found: field_width,
            expected: FIELD_CAP as u16,
        });
    }
    let _reserved = buf.get_u16_le();
    let payload_len = buf.get_u32_le() as usize;
    if payload_len != MAX_RULES * SLOT_LEN || buf.len() != payload_len {
        return Err(length_error);
    }
    Ok(())
}

fn take_field<'a>(buf: &mut &'a [u8]) -> (u8, &'a [u8]) {
    let len = buf.get_u8();
    let (raw, rest) = std::mem::take(buf).split_at(FIELD_CAP);
    *buf = rest;
    (len, raw)
}
