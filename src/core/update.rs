//! Serde support for update structs.
//!
//! Optional fields that can be cleared use `Option<Option<T>>`: a missing key
//! leaves the field alone, `null` clears it, and a value replaces it.

use serde::{Deserialize, Deserializer};

pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
