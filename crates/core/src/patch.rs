//! Serde support for partial updates.
//!
//! A PATCH-style body must tell three states apart: field absent (leave the
//! column alone), field `null` (clear it) and field set. Model the field as
//! `Option<Option<T>>` and annotate it with
//! `#[serde(default, deserialize_with = "potwatch_core::patch::present")]`.

use serde::{Deserialize, Deserializer};

/// Wrap whatever was present (including `null`) in `Some`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None`.
pub fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
