//! Value codec
//!
//! JSON encoding applied to item values on their way to and from the driver.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Serializes `value` into the payload handed to the driver.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Restores a value from a driver payload.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}
