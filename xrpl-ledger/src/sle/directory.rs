//! Owner directory pages (§3 I4, §4.7 "thread the owner directory", and
//! the SPEC_FULL "Directory node operations" supplement): a singly-chained
//! sequence of `DirectoryNode` pages, each holding up to
//! [`MAX_PAGE_ENTRIES`] owned-object keys.
//!
//! Page 0 lives at the owner-directory root keylet itself; every later page
//! is addressed by `keylet::directory_page(root, page_index)` and carries a
//! `RootIndex` pointing back to page 0, plus `IndexPrevious`/`IndexNext`
//! linking it to its neighbors. Indices, not pointers, are the only way one
//! page refers to another (§9 "Directory node cycles").

use xrpl_codec::{keylet, Field, FieldObject, LedgerEntryType, Value};
use xrpl_hash::{AccountId, Hash};
use xrpl_tree::NodeStore;

use crate::{error::LedgerError, view::LedgerView};

/// Per-page capacity (SPEC_FULL "Directory node operations").
pub const MAX_PAGE_ENTRIES: usize = 32;

pub fn root_keylet(owner: AccountId) -> Hash<32> {
    keylet::owner_directory(owner)
}

fn new_page(root: Hash<32>, page_index: u64, owner: Option<AccountId>) -> FieldObject {
    let mut object = FieldObject::new()
        .with(
            Field::LedgerEntryType,
            Value::UInt16(LedgerEntryType::DirectoryNode.code()),
        )
        .with(Field::Flags, Value::UInt32(0))
        .with(Field::Indexes, Value::Vector256(Vec::new()))
        .with(Field::IndexNext, Value::UInt64(0))
        .with(Field::IndexPrevious, Value::UInt64(0));
    if page_index != 0 {
        object.set(Field::RootIndex, Value::Hash256(root));
    }
    if let Some(owner) = owner {
        object.set(Field::Owner, Value::AccountId(owner));
    }
    object
}

fn indexes(page: &FieldObject) -> Vec<Hash<32>> {
    page.get(Field::Indexes)
        .and_then(Value::as_vector256)
        .map(<[Hash<32>]>::to_vec)
        .unwrap_or_default()
}

fn set_indexes(page: &mut FieldObject, entries: Vec<Hash<32>>) {
    page.set(Field::Indexes, Value::Vector256(entries));
}

fn index_next(page: &FieldObject) -> u64 {
    page.get(Field::IndexNext).and_then(Value::as_u64).unwrap_or(0)
}

fn set_index_next(page: &mut FieldObject, next: u64) {
    page.set(Field::IndexNext, Value::UInt64(next));
}

fn index_previous(page: &FieldObject) -> u64 {
    page.get(Field::IndexPrevious)
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

fn set_index_previous(page: &mut FieldObject, previous: u64) {
    page.set(Field::IndexPrevious, Value::UInt64(previous));
}

fn page_key(root: Hash<32>, page_index: u64) -> Hash<32> {
    keylet::directory_page(root, page_index)
}

/// Insert `object_key` into `owner`'s directory, appending to the
/// highest-index page if it has room, else chaining a new page. Returns the
/// directory root keylet and the index of the page the entry landed in —
/// callers stamp the latter onto the owned object's `OwnerNode` (§3 I4).
pub fn insert<S: NodeStore>(
    view: &mut LedgerView<'_, S>,
    owner: AccountId,
    object_key: Hash<32>,
) -> Result<(Hash<32>, u64), LedgerError> {
    let root = root_keylet(owner);

    let mut last_index = 0u64;
    let mut last_page = match view.read_sle(&root)? {
        Some(page) => page,
        None => {
            let page = new_page(root, 0, Some(owner));
            view.write_sle(root, &page)?;
            page
        }
    };

    loop {
        let next = index_next(&last_page);
        if next == 0 {
            break;
        }
        last_index = next;
        last_page = view
            .read_sle(&page_key(root, next))?
            .ok_or_else(|| LedgerError::Malformed("dangling directory page link".into()))?;
    }

    let mut entries = indexes(&last_page);
    if entries.len() < MAX_PAGE_ENTRIES {
        entries.push(object_key);
        set_indexes(&mut last_page, entries);
        view.write_sle(page_key(root, last_index), &last_page)?;
        return Ok((root, last_index));
    }

    let new_index = last_index + 1;
    set_index_next(&mut last_page, new_index);
    view.write_sle(page_key(root, last_index), &last_page)?;

    let mut new_page_obj = new_page(root, new_index, None);
    set_index_previous(&mut new_page_obj, last_index);
    set_indexes(&mut new_page_obj, vec![object_key]);
    view.write_sle(page_key(root, new_index), &new_page_obj)?;

    Ok((root, new_index))
}

/// Remove `object_key` from `owner`'s directory page `page_index`
/// (swap-remove within the page). Deletes the page if it becomes empty,
/// unless it is page 0, which persists empty as the directory's anchor.
pub fn remove<S: NodeStore>(
    view: &mut LedgerView<'_, S>,
    owner: AccountId,
    page_index: u64,
    object_key: Hash<32>,
) -> Result<(), LedgerError> {
    let root = root_keylet(owner);
    let key = page_key(root, page_index);
    let mut page = view
        .read_sle(&key)?
        .ok_or_else(|| LedgerError::Malformed("directory page missing on remove".into()))?;

    let mut entries = indexes(&page);
    let position = entries
        .iter()
        .position(|entry| *entry == object_key)
        .ok_or_else(|| LedgerError::Malformed("object not present in its directory page".into()))?;
    entries.swap_remove(position);
    set_indexes(&mut page, entries.clone());

    if entries.is_empty() && page_index != 0 {
        let previous = index_previous(&page);
        let next = index_next(&page);

        if let Some(mut previous_page) = view.read_sle(&page_key(root, previous))? {
            set_index_next(&mut previous_page, next);
            view.write_sle(page_key(root, previous), &previous_page)?;
        }
        if next != 0 {
            if let Some(mut next_page) = view.read_sle(&page_key(root, next))? {
                set_index_previous(&mut next_page, previous);
                view.write_sle(page_key(root, next), &next_page)?;
            }
        }
        view.erase_sle(key);
    } else {
        view.write_sle(key, &page)?;
    }

    Ok(())
}

/// Whether `owner`'s directory root page exists and has at least one entry
/// anywhere in the chain (used by account-deletion-style preclaim checks;
/// no handler in this core deletes accounts, but the helper documents the
/// invariant directory pages must satisfy).
pub fn is_empty<S: NodeStore>(
    view: &LedgerView<'_, S>,
    owner: AccountId,
) -> Result<bool, LedgerError> {
    let root = root_keylet(owner);
    match view.read_sle(&root)? {
        Some(page) => Ok(indexes(&page).is_empty() && index_next(&page) == 0),
        None => Ok(true),
    }
}
