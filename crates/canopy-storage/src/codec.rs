//! Small helpers shared by the storage modules: serde_json encoding and
//! table access with store-error mapping.

use std::sync::Arc;

use canopy_traits::{PermissionError, Result};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub(crate) type Table = TableDefinition<'static, &'static str, &'static [u8]>;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(PermissionError::store)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(PermissionError::store)
}

/// Create the table if it does not exist yet.
pub(crate) fn init_table(db: &Arc<Database>, table: Table) -> Result<()> {
    let write_txn = db.begin_write().map_err(PermissionError::store)?;
    write_txn
        .open_table(table)
        .map_err(PermissionError::store)?;
    write_txn.commit().map_err(PermissionError::store)?;
    Ok(())
}

pub(crate) fn put<T: Serialize>(db: &Arc<Database>, table: Table, key: &str, value: &T) -> Result<()> {
    let bytes = encode(value)?;
    let write_txn = db.begin_write().map_err(PermissionError::store)?;
    {
        let mut t = write_txn
            .open_table(table)
            .map_err(PermissionError::store)?;
        t.insert(key, bytes.as_slice())
            .map_err(PermissionError::store)?;
    }
    write_txn.commit().map_err(PermissionError::store)?;
    Ok(())
}

pub(crate) fn get<T: DeserializeOwned>(
    db: &Arc<Database>,
    table: Table,
    key: &str,
) -> Result<Option<T>> {
    let read_txn = db.begin_read().map_err(PermissionError::store)?;
    let t = read_txn
        .open_table(table)
        .map_err(PermissionError::store)?;

    match t.get(key).map_err(PermissionError::store)? {
        Some(value) => Ok(Some(decode(value.value())?)),
        None => Ok(None),
    }
}

/// Decode every row in the table. Tables here hold at most a few thousand
/// rows per deployment; queries filter in memory.
pub(crate) fn scan<T: DeserializeOwned>(db: &Arc<Database>, table: Table) -> Result<Vec<T>> {
    let read_txn = db.begin_read().map_err(PermissionError::store)?;
    let t = read_txn
        .open_table(table)
        .map_err(PermissionError::store)?;

    let mut items = Vec::new();
    for item in t.iter().map_err(PermissionError::store)? {
        let (_, value) = item.map_err(PermissionError::store)?;
        items.push(decode(value.value())?);
    }
    Ok(items)
}

/// Remove by key; returns whether the key existed.
pub(crate) fn remove(db: &Arc<Database>, table: Table, key: &str) -> Result<bool> {
    let write_txn = db.begin_write().map_err(PermissionError::store)?;
    let existed = {
        let mut t = write_txn
            .open_table(table)
            .map_err(PermissionError::store)?;
        t.remove(key).map_err(PermissionError::store)?.is_some()
    };
    write_txn.commit().map_err(PermissionError::store)?;
    Ok(existed)
}
