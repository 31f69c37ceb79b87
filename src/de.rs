//! Lenient field decoders for REST payloads
//!
//! Some identifiers arrive as integers, others as strings. Non-money
//! metrics (hours, scores) arrive as decimal strings or numbers and are
//! read through `Decimal` before narrowing to `f64`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{Deserializer, Error};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Str(String),
    Int(i64),
}

fn narrow<E: Error>(value: Decimal) -> Result<f64, E> {
    value
        .to_f64()
        .ok_or_else(|| E::custom(format!("metric out of range: {}", value)))
}

pub fn metric<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    narrow(<Decimal as Deserialize>::deserialize(deserializer)?)
}

pub fn opt_metric<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Decimal>::deserialize(deserializer)?
        .map(narrow)
        .transpose()
}

pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Str(s) => s,
        IdRepr::Int(i) => i.to_string(),
    })
}

pub fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(|repr| match repr {
        IdRepr::Str(s) => s,
        IdRepr::Int(i) => i.to_string(),
    }))
}
