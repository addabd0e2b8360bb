//! Canonical binary encoding (§4.3 `encode` / `encode_for_signing` /
//! `encode_for_multisigning`).

use xrpl_hash::{AccountId, HashPrefix};

use crate::{
    amount::Amount,
    error::EncodeError,
    field::{Field, TypeCode},
    object::FieldObject,
    value::Value,
    vl,
};

#[cfg(test)]
use crate::decode;

/// Marks the end of a nested object's fields (§3 "Object"). Equal to the
/// field header that would be produced for `(TypeCode::Object, 1)`.
pub(crate) const OBJECT_END_MARKER: u8 = 0xE1;
/// Marks the end of an array's elements. Equal to the field header that
/// would be produced for `(TypeCode::Array, 1)`.
pub(crate) const ARRAY_END_MARKER: u8 = 0xF1;

/// Encode the field-object's serialized fields, in canonical order, with no
/// surrounding framing. Used both for the top-level object and recursively
/// for nested `Object`/`Array` values.
pub fn encode(obj: &FieldObject) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode_object_body(obj.serialized_fields(), &mut out)?;
    Ok(out)
}

/// Encode the restricted signing view, prefixed with the single-signer
/// domain-separation tag (§3 "HashPrefix", §4.3).
pub fn encode_for_signing(obj: &FieldObject) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::from(HashPrefix::TxSign.as_bytes());
    encode_object_body(obj.signing_fields(), &mut out)?;
    Ok(out)
}

/// Encode the restricted signing view for one signer of a multi-signed
/// transaction: the multi-sign prefix, the signing fields, and the signing
/// account appended raw (no field header) so each signer's digest is bound
/// to their own account (§4.3).
pub fn encode_for_multisigning(
    obj: &FieldObject,
    signer: AccountId,
) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::from(HashPrefix::TxMultiSign.as_bytes());
    encode_object_body(obj.signing_fields(), &mut out)?;
    out.extend_from_slice(signer.as_bytes());
    Ok(out)
}

fn encode_object_body<'a>(
    fields: impl Iterator<Item = (Field, &'a Value)>,
    out: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    for (field, value) in fields {
        encode_field_header(field, out);
        encode_value(field, value, out)?;
    }
    Ok(())
}

/// Pack a field's `(type-code, field-code)` pair into its 1-, 2- or 3-byte
/// header form (§3 "Field"):
///
/// - both nibbles fit in 4 bits: one byte `type << 4 | field`
/// - type fits, field doesn't: two bytes `type << 4`, then `field`
/// - field fits, type doesn't: two bytes `field`, then `type`
/// - neither fits: three bytes `0`, then `type`, then `field`
fn encode_field_header(field: Field, out: &mut Vec<u8>) {
    let type_code = field.type_code().code();
    let field_code = field.field_code();

    match (type_code < 16, field_code < 16) {
        (true, true) => out.push((type_code << 4) | field_code),
        (true, false) => {
            out.push(type_code << 4);
            out.push(field_code);
        }
        (false, true) => {
            out.push(field_code);
            out.push(type_code);
        }
        (false, false) => {
            out.push(0);
            out.push(type_code);
            out.push(field_code);
        }
    }
}

fn encode_value(field: Field, value: &Value, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match (field.type_code(), value) {
        (TypeCode::UInt8, Value::UInt8(v)) => out.push(*v),
        (TypeCode::UInt16, Value::UInt16(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (TypeCode::UInt32, Value::UInt32(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (TypeCode::UInt64, Value::UInt64(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (TypeCode::Hash128, Value::Hash128(v)) => out.extend_from_slice(v.as_ref()),
        (TypeCode::Hash160, Value::Hash160(v)) => out.extend_from_slice(v.as_ref()),
        (TypeCode::Hash256, Value::Hash256(v)) => out.extend_from_slice(v.as_ref()),
        (TypeCode::Amount, Value::Amount(v)) => out.extend_from_slice(&encode_amount(v)?),
        (TypeCode::AccountId, Value::AccountId(v)) => {
            vl::encode_length(20, out)?;
            out.extend_from_slice(v.as_bytes());
        }
        (TypeCode::Blob, Value::Blob(bytes)) => {
            vl::encode_length(bytes.len(), out)?;
            out.extend_from_slice(bytes);
        }
        (TypeCode::PathSet, Value::PathSet(paths)) => paths.encode(out)?,
        (TypeCode::Vector256, Value::Vector256(hashes)) => {
            vl::encode_length(hashes.len() * 32, out)?;
            for hash in hashes {
                out.extend_from_slice(hash.as_ref());
            }
        }
        (TypeCode::Object, Value::Object(inner)) => {
            encode_object_body(inner.serialized_fields(), out)?;
            out.push(OBJECT_END_MARKER);
        }
        (TypeCode::Array, Value::Array(elements)) => {
            for element in elements {
                encode_object_body(element.serialized_fields(), out)?;
                out.push(OBJECT_END_MARKER);
            }
            out.push(ARRAY_END_MARKER);
        }
        _ => return Err(EncodeError::WireTypeMismatch(field)),
    }
    Ok(())
}

/// Pack an [`Amount`] into its canonical 8-byte form (§3 "Amount"):
///
/// - native: bit 63 set (native flag), bit 62 the sign (1 = positive),
///   bits 61..0 the drops count
/// - issued: bit 63 clear, bit 62 the sign, bits 61..54 the exponent
///   (biased by [`crate::amount::EXPONENT_BIAS`]), bits 53..0 the mantissa
///
/// The issued form is followed by the 20-byte currency code and 20-byte
/// issuer `AccountID`, neither of which is bit-packed.
fn encode_amount(amount: &Amount) -> Result<Vec<u8>, EncodeError> {
    match amount {
        Amount::Native(drops) => {
            if *drops > crate::amount::MAX_DROPS {
                return Err(EncodeError::NonCanonicalAmount);
            }
            let packed = (1u64 << 63) | (1u64 << 62) | drops;
            Ok(packed.to_be_bytes().to_vec())
        }
        Amount::Issued(issued) => {
            let mut packed = 0u64;
            if issued.is_positive() {
                packed |= 1u64 << 62;
            }
            if issued.mantissa() != 0 {
                let biased_exponent = issued.exponent() as i32 + crate::amount::EXPONENT_BIAS;
                if !(0..=255).contains(&biased_exponent) {
                    return Err(EncodeError::NonCanonicalAmount);
                }
                packed |= (biased_exponent as u64) << 54;
                packed |= issued.mantissa() & ((1u64 << 54) - 1);
            }
            let mut out = packed.to_be_bytes().to_vec();
            out.extend_from_slice(issued.currency().as_hash().as_ref());
            out.extend_from_slice(issued.issuer().as_bytes());
            Ok(out)
        }
    }
}
