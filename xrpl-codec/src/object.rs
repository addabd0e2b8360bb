use std::collections::BTreeMap;

use crate::{field::Field, value::Value};

/// A map from [`Field`] to [`Value`] with the binary-encoding order built
/// in: because `Field`'s `Ord` impl sorts by `(type-code, field-code)`
/// (§3), iterating a `BTreeMap<Field, Value>` already visits fields in
/// canonical order — no separate sort step is needed at encode time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldObject(BTreeMap<Field, Value>);

impl FieldObject {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.0.get(&field)
    }

    pub fn set(&mut self, field: Field, value: Value) -> &mut Self {
        self.0.insert(field, value);
        self
    }

    pub fn remove(&mut self, field: Field) -> Option<Value> {
        self.0.remove(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn with(mut self, field: Field, value: Value) -> Self {
        self.set(field, value);
        self
    }

    /// Fields in canonical `(type-code, field-code)` ascending order,
    /// restricted to those marked `serialized` in the registry (§4.3
    /// `encode`).
    pub fn serialized_fields(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.0
            .iter()
            .filter(|(field, _)| field.info().serialized)
            .map(|(field, value)| (*field, value))
    }

    /// Fields in canonical order, restricted to those marked `signing`
    /// (§4.3 `encode_for_signing`).
    pub fn signing_fields(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.0
            .iter()
            .filter(|(field, _)| field.info().signing)
            .map(|(field, value)| (*field, value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.0.iter().map(|(field, value)| (*field, value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Field, Value)> for FieldObject {
    fn from_iter<T: IntoIterator<Item = (Field, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_order_is_canonical_regardless_of_insertion_order() {
        let mut obj = FieldObject::new();
        obj.set(Field::Sequence, Value::UInt32(1));
        obj.set(Field::TransactionType, Value::UInt16(0));
        obj.set(Field::Flags, Value::UInt32(0));

        let order: Vec<Field> = obj.iter().map(|(f, _)| f).collect();
        assert_eq!(
            order,
            vec![Field::TransactionType, Field::Flags, Field::Sequence]
        );
    }
}
