//! Canonical binary decoding, the inverse of [`crate::encode`]. Rejects
//! anything the reference encoder would never produce: out-of-order
//! fields, duplicate fields, and non-canonical amounts (§4.3, §7 `tem*`).

use xrpl_hash::{AccountId, Hash};

use crate::{
    amount::{Amount, IssuedAmount},
    currency::Currency,
    encode::{ARRAY_END_MARKER, OBJECT_END_MARKER},
    error::DecodeError,
    field::{self, Field, TypeCode},
    object::FieldObject,
    pathset::PathSet,
    value::Value,
    vl,
};

/// Decode a complete top-level object (a transaction, ledger entry, or
/// metadata blob): every byte of `input` must be consumed.
pub fn decode(input: &[u8]) -> Result<FieldObject, DecodeError> {
    let (obj, consumed) = decode_object_body(input, None)?;
    if consumed != input.len() {
        return Err(DecodeError::TrailingBytes);
    }
    Ok(obj)
}

/// Decode fields until `stop_marker` is seen (for a nested object or array
/// element) or, if `stop_marker` is `None`, until `input` is exhausted (for
/// the top-level object).
fn decode_object_body(
    input: &[u8],
    stop_marker: Option<u8>,
) -> Result<(FieldObject, usize), DecodeError> {
    let mut fields = Vec::new();
    let mut last_key: Option<(u8, u8)> = None;
    let mut pos = 0;

    loop {
        if stop_marker.is_some() && pos >= input.len() {
            return Err(DecodeError::MissingObjectEnd);
        }
        if stop_marker.is_none() && pos >= input.len() {
            break;
        }

        let marker = peek_marker_byte(&input[pos..])?;
        if Some(marker) == stop_marker {
            pos += 1;
            break;
        }

        let (field, header_len) = decode_field_header(&input[pos..])?;
        pos += header_len;

        let key = (field.type_code().code(), field.field_code());
        if let Some(last) = last_key {
            if key == last {
                return Err(DecodeError::DuplicateField(field));
            }
            if key < last {
                return Err(DecodeError::FieldOrderViolation);
            }
        }
        last_key = Some(key);

        let (value, value_len) = decode_value(field, &input[pos..])?;
        pos += value_len;
        fields.push((field, value));
    }

    Ok((fields.into_iter().collect(), pos))
}

/// Look at the next field header without a fully-decoded [`Field`],
/// returning just its single- or two-byte wire form — enough to compare
/// against [`OBJECT_END_MARKER`]/[`ARRAY_END_MARKER`], both of which are
/// single-byte headers.
fn peek_marker_byte(input: &[u8]) -> Result<u8, DecodeError> {
    input
        .first()
        .copied()
        .ok_or(DecodeError::UnexpectedEof("field header"))
}

/// Unpack a field header (§3 "Field") back into a [`Field`], the inverse of
/// `encode_field_header`.
fn decode_field_header(input: &[u8]) -> Result<(Field, usize), DecodeError> {
    let b0 = *input
        .first()
        .ok_or(DecodeError::UnexpectedEof("field header byte 0"))?;
    let high = b0 >> 4;
    let low = b0 & 0x0F;

    let (type_code, field_code, len) = if high != 0 && low != 0 {
        (high, low, 1)
    } else if high != 0 {
        // type fits in the high nibble, field code is the next byte
        let b1 = *input
            .get(1)
            .ok_or(DecodeError::UnexpectedEof("field header byte 1"))?;
        (high, b1, 2)
    } else if low != 0 {
        // field code fits in the low nibble, type code is the next byte
        let b1 = *input
            .get(1)
            .ok_or(DecodeError::UnexpectedEof("field header byte 1"))?;
        (b1, low, 2)
    } else {
        let b1 = *input
            .get(1)
            .ok_or(DecodeError::UnexpectedEof("field header byte 1"))?;
        let b2 = *input
            .get(2)
            .ok_or(DecodeError::UnexpectedEof("field header byte 2"))?;
        (b1, b2, 3)
    };

    let info = field::by_key(type_code, field_code).ok_or(DecodeError::UnknownField {
        type_code,
        field_code,
    })?;
    Ok((info.field, len))
}

fn decode_value(field: Field, input: &[u8]) -> Result<(Value, usize), DecodeError> {
    match field.type_code() {
        TypeCode::UInt8 => {
            let v = *input
                .first()
                .ok_or(DecodeError::UnexpectedEof("UInt8"))?;
            Ok((Value::UInt8(v), 1))
        }
        TypeCode::UInt16 => {
            let bytes: [u8; 2] = input
                .get(..2)
                .ok_or(DecodeError::UnexpectedEof("UInt16"))?
                .try_into()
                .expect("slice of length 2");
            Ok((Value::UInt16(u16::from_be_bytes(bytes)), 2))
        }
        TypeCode::UInt32 => {
            let bytes: [u8; 4] = input
                .get(..4)
                .ok_or(DecodeError::UnexpectedEof("UInt32"))?
                .try_into()
                .expect("slice of length 4");
            Ok((Value::UInt32(u32::from_be_bytes(bytes)), 4))
        }
        TypeCode::UInt64 => {
            let bytes: [u8; 8] = input
                .get(..8)
                .ok_or(DecodeError::UnexpectedEof("UInt64"))?
                .try_into()
                .expect("slice of length 8");
            Ok((Value::UInt64(u64::from_be_bytes(bytes)), 8))
        }
        TypeCode::Hash128 => {
            let bytes = input
                .get(..16)
                .ok_or(DecodeError::UnexpectedEof("Hash128"))?;
            Ok((Value::Hash128(Hash::from_slice(bytes).expect("len 16")), 16))
        }
        TypeCode::Hash160 => {
            let bytes = input
                .get(..20)
                .ok_or(DecodeError::UnexpectedEof("Hash160"))?;
            Ok((Value::Hash160(Hash::from_slice(bytes).expect("len 20")), 20))
        }
        TypeCode::Hash256 => {
            let bytes = input
                .get(..32)
                .ok_or(DecodeError::UnexpectedEof("Hash256"))?;
            Ok((Value::Hash256(Hash::from_slice(bytes).expect("len 32")), 32))
        }
        TypeCode::Amount => decode_amount(input),
        TypeCode::AccountId => {
            let (len, prefix_len) = vl::decode_length(input)?;
            let bytes = input
                .get(prefix_len..prefix_len + len)
                .ok_or(DecodeError::UnexpectedEof("AccountID"))?;
            let account = AccountId::from_bytes(
                bytes
                    .try_into()
                    .map_err(|_| DecodeError::UnexpectedEof("AccountID"))?,
            );
            Ok((Value::AccountId(account), prefix_len + len))
        }
        TypeCode::Blob => {
            let (len, prefix_len) = vl::decode_length(input)?;
            let bytes = input
                .get(prefix_len..prefix_len + len)
                .ok_or(DecodeError::UnexpectedEof("Blob"))?;
            Ok((Value::Blob(bytes.to_vec()), prefix_len + len))
        }
        TypeCode::PathSet => {
            let (set, len) = PathSet::decode(input)?;
            Ok((Value::PathSet(set), len))
        }
        TypeCode::Vector256 => {
            let (byte_len, prefix_len) = vl::decode_length(input)?;
            if byte_len % 32 != 0 {
                return Err(DecodeError::UnexpectedEof("Vector256"));
            }
            let bytes = input
                .get(prefix_len..prefix_len + byte_len)
                .ok_or(DecodeError::UnexpectedEof("Vector256"))?;
            let hashes = bytes
                .chunks_exact(32)
                .map(|chunk| Hash::from_slice(chunk).expect("chunk of 32"))
                .collect();
            Ok((Value::Vector256(hashes), prefix_len + byte_len))
        }
        TypeCode::Object => {
            let (obj, len) = decode_object_body(input, Some(OBJECT_END_MARKER))?;
            Ok((Value::Object(obj), len))
        }
        TypeCode::Array => {
            let mut elements = Vec::new();
            let mut pos = 0;
            loop {
                let marker = peek_marker_byte(&input[pos..])?;
                if marker == ARRAY_END_MARKER {
                    pos += 1;
                    break;
                }
                let (element, len) = decode_object_body(&input[pos..], Some(OBJECT_END_MARKER))?;
                pos += len;
                elements.push(element);
            }
            Ok((Value::Array(elements), pos))
        }
    }
}

/// Unpack a canonical 8-byte [`Amount`], the inverse of `encode_amount`.
fn decode_amount(input: &[u8]) -> Result<(Value, usize), DecodeError> {
    let bytes: [u8; 8] = input
        .get(..8)
        .ok_or(DecodeError::UnexpectedEof("Amount"))?
        .try_into()
        .expect("slice of length 8");
    let packed = u64::from_be_bytes(bytes);
    let is_native = packed & (1 << 63) != 0;
    let is_positive = packed & (1 << 62) != 0;

    if is_native {
        let drops = packed & ((1u64 << 62) - 1);
        if drops > crate::amount::MAX_DROPS {
            return Err(DecodeError::NonCanonicalAmount);
        }
        return Ok((Value::Amount(Amount::Native(drops)), 8));
    }

    let biased_exponent = ((packed >> 54) & 0xFF) as i32;
    let mantissa = packed & ((1u64 << 54) - 1);

    let currency_bytes = input
        .get(8..28)
        .ok_or(DecodeError::UnexpectedEof("Amount currency"))?;
    let issuer_bytes = input
        .get(28..48)
        .ok_or(DecodeError::UnexpectedEof("Amount issuer"))?;
    let currency = Currency::from_bytes(currency_bytes.try_into().expect("len 20"));
    let issuer = AccountId::from_bytes(issuer_bytes.try_into().expect("len 20"));

    let exponent = (biased_exponent - crate::amount::EXPONENT_BIAS) as i8;
    let issued = IssuedAmount::new(mantissa, exponent, is_positive, currency, issuer)
        .map_err(|_| DecodeError::NonCanonicalAmount)?;
    Ok((Value::Amount(Amount::Issued(issued)), 48))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode, object::FieldObject};

    #[test]
    fn round_trips_a_flat_object() {
        let obj = FieldObject::new()
            .with(Field::TransactionType, Value::UInt16(0))
            .with(Field::Flags, Value::UInt32(0x8000_0000))
            .with(Field::Sequence, Value::UInt32(42))
            .with(Field::Amount, Value::Amount(Amount::native(1_000_000)));

        let bytes = encode::encode(&obj).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, obj);
    }

    #[test]
    fn rejects_out_of_order_fields() {
        // Flags (UInt32, code 2) before TransactionType (UInt16, code 2):
        // header bytes 0x22 then 0x12, which decode in the wrong order.
        let bytes = vec![0x22, 0x00, 0x00, 0x00, 0x00, 0x12, 0x00, 0x00];
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::FieldOrderViolation)
        ));
    }

    #[test]
    fn rejects_duplicate_fields() {
        let mut bytes = vec![0x22, 0x00, 0x00, 0x00, 0x00];
        bytes.extend_from_slice(&[0x22, 0x00, 0x00, 0x00, 0x01]);
        assert!(matches!(decode(&bytes), Err(DecodeError::DuplicateField(_))));
    }
}
