//! `Ticket` (SPEC_FULL "Ticket support"): a pre-reserved sequence slot an
//! account can consume out of order instead of advancing `Sequence`
//! one-at-a-time. This core only supports consuming an existing ticket —
//! there is no `TicketCreate` handler (§1 Non-goals scope multi-sign and
//! batched ticket creation out), but the framework still needs to read and
//! erase one when a transaction names it via `TicketSequence`.

use xrpl_hash::AccountId;
use xrpl_codec::{keylet, Field, FieldObject, LedgerEntryType, Value};

pub fn keylet_for(owner: AccountId, ticket_sequence: u32) -> xrpl_hash::Hash<32> {
    keylet::ticket(owner, ticket_sequence)
}

pub fn new(owner: AccountId, ticket_sequence: u32) -> FieldObject {
    FieldObject::new()
        .with(
            Field::LedgerEntryType,
            Value::UInt16(LedgerEntryType::Ticket.code()),
        )
        .with(Field::Flags, Value::UInt32(0))
        .with(Field::Account, Value::AccountId(owner))
        .with(Field::TicketSequence, Value::UInt32(ticket_sequence))
        .with(Field::OwnerNode, Value::UInt64(0))
}

pub fn account(object: &FieldObject) -> Option<AccountId> {
    object.get(Field::Account).and_then(Value::as_account_id)
}

pub fn ticket_sequence(object: &FieldObject) -> Option<u32> {
    object.get(Field::TicketSequence).and_then(Value::as_u32)
}

pub fn owner_node(object: &FieldObject) -> u64 {
    object.get(Field::OwnerNode).and_then(Value::as_u64).unwrap_or(0)
}

pub fn set_owner_node(object: &mut FieldObject, node: u64) {
    object.set(Field::OwnerNode, Value::UInt64(node));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_account_and_sequence() {
        let owner = AccountId::from_bytes([6; 20]);
        let object = new(owner, 42);
        assert_eq!(account(&object), Some(owner));
        assert_eq!(ticket_sequence(&object), Some(42));
    }
}
