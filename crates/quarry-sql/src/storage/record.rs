//! Records and the binary record codec.
//!
//! # Encoding Format
//!
//! - Number of fields (4 bytes, little-endian)
//! - For each field: type tag (1 byte) followed by the payload
//!   - ints: 4 bytes, little-endian
//!   - floats: 4 bytes, little-endian IEEE-754
//!   - chars: length (4 bytes, little-endian) + UTF-8 bytes
//!   - booleans: 1 byte

use bytes::{Buf, BufMut, Bytes, BytesMut};

use quarry_common::error::{QuarryError, QuarryResult};
use quarry_common::types::RecordId;

use super::meta::TableMeta;
use super::value::{AttrType, Value};

/// The storage representation of one row.
///
/// Cloning is cheap: the payload is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    rid: RecordId,
    data: Bytes,
}

impl Record {
    /// Creates a record that has not been placed in a table yet.
    pub fn new(data: Bytes) -> Self {
        Self {
            rid: RecordId::INVALID,
            data,
        }
    }

    /// Creates a record bound to a record id.
    pub fn with_rid(rid: RecordId, data: Bytes) -> Self {
        Self { rid, data }
    }

    /// Returns the record id.
    pub fn rid(&self) -> RecordId {
        self.rid
    }

    /// Binds this record to a record id.
    pub fn set_rid(&mut self, rid: RecordId) {
        self.rid = rid;
    }

    /// Returns the encoded payload.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Encodes a full row in schema order.
pub(crate) fn encode_values(meta: &TableMeta, values: &[Value]) -> QuarryResult<Bytes> {
    if values.len() != meta.field_num() {
        return Err(QuarryError::SchemaFieldMissing {
            table: meta.name().to_string(),
            expected: meta.field_num(),
            actual: values.len(),
        });
    }

    let mut buf = BytesMut::with_capacity(4 + values.len() * 8);
    buf.put_u32_le(values.len() as u32);

    for (field, value) in meta.field_metas().iter().zip(values) {
        if field.attr_type() != value.attr_type() {
            return Err(QuarryError::type_mismatch(
                meta.name(),
                field.name(),
                format!(
                    "field type={}, value type={}",
                    field.attr_type(),
                    value.attr_type()
                ),
            ));
        }

        buf.put_u8(value.attr_type().tag());
        match value {
            Value::Int(i) => buf.put_i32_le(*i),
            Value::Float(f) => buf.put_f32_le(*f),
            Value::Chars(s) => {
                buf.put_u32_le(s.len() as u32);
                buf.put_slice(s.as_bytes());
            }
            Value::Boolean(b) => buf.put_u8(u8::from(*b)),
        }
    }

    Ok(buf.freeze())
}

/// Decodes a full row in schema order.
pub(crate) fn decode_values(meta: &TableMeta, data: &Bytes) -> QuarryResult<Vec<Value>> {
    let mut buf = data.clone();

    let num_fields = read_u32(&mut buf)? as usize;
    if num_fields != meta.field_num() {
        return Err(corrupted(format!(
            "table '{}' has {} fields, record has {}",
            meta.name(),
            meta.field_num(),
            num_fields
        )));
    }

    let mut values = Vec::with_capacity(num_fields);
    for _ in 0..num_fields {
        if !buf.has_remaining() {
            return Err(corrupted("unexpected end of record".to_string()));
        }
        let tag = buf.get_u8();
        let attr_type =
            AttrType::from_tag(tag).ok_or_else(|| corrupted(format!("unknown type tag {}", tag)))?;

        let value = match attr_type {
            AttrType::Ints => {
                ensure_remaining(&buf, 4)?;
                Value::Int(buf.get_i32_le())
            }
            AttrType::Floats => {
                ensure_remaining(&buf, 4)?;
                Value::Float(buf.get_f32_le())
            }
            AttrType::Chars => {
                ensure_remaining(&buf, 4)?;
                let len = buf.get_u32_le() as usize;
                ensure_remaining(&buf, len)?;
                let raw = buf.split_to(len);
                let s = std::str::from_utf8(&raw)
                    .map_err(|e| corrupted(format!("invalid utf-8: {}", e)))?;
                Value::Chars(s.to_string())
            }
            AttrType::Booleans => {
                ensure_remaining(&buf, 1)?;
                Value::Boolean(buf.get_u8() != 0)
            }
        };
        values.push(value);
    }

    Ok(values)
}

fn read_u32(buf: &mut Bytes) -> QuarryResult<u32> {
    ensure_remaining(buf, 4)?;
    Ok(buf.get_u32_le())
}

fn ensure_remaining(buf: &Bytes, needed: usize) -> QuarryResult<()> {
    if buf.remaining() < needed {
        return Err(corrupted(format!(
            "need {} bytes, {} remaining",
            needed,
            buf.remaining()
        )));
    }
    Ok(())
}

fn corrupted(message: String) -> QuarryError {
    QuarryError::RecordCorrupted { message }
}
