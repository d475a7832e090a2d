//! Tolerant numeric deserializers for upstream JSON.
//!
//! ESI serializes numeric fields as either integer or floating-point tokens
//! depending on the backend that produced the document. These deserializers
//! accept both forms, coerce to the declared integer width, and reject
//! non-finite values. Unknown fields are tolerated by the DTOs themselves;
//! these helpers only cover the numeric coercion.

use serde::de::{Deserializer, Error as DeError};
use serde::Deserialize;
use serde_json::Value;

fn coerce_i64<E: DeError>(value: &Value) -> Result<i64, E> {
    let number = value
        .as_number()
        .ok_or_else(|| E::custom(format!("expected a JSON number, got {value}")))?;

    if let Some(int) = number.as_i64() {
        return Ok(int);
    }

    let float = number
        .as_f64()
        .ok_or_else(|| E::custom("expected a representable JSON number"))?;
    if !float.is_finite() {
        return Err(E::custom("non-finite number is not a valid integer"));
    }
    if float < i64::MIN as f64 || float > i64::MAX as f64 {
        return Err(E::custom(format!("number {float} overflows i64")));
    }

    Ok(float.trunc() as i64)
}

/// Deserializes an `i64` from either an integer or a float JSON token.
pub fn flexible_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    coerce_i64(&value)
}

/// Deserializes an `i32` from either an integer or a float JSON token.
pub fn flexible_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let wide = coerce_i64(&value)?;

    i32::try_from(wide).map_err(|_| D::Error::custom(format!("number {wide} overflows i32")))
}

/// Deserializes an optional `i32`, treating JSON null as `None`.
///
/// Pair with `#[serde(default)]` so an absent field also becomes `None`.
pub fn flexible_opt_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    let wide = coerce_i64::<D::Error>(&value)?;
    i32::try_from(wide)
        .map(Some)
        .map_err(|_| D::Error::custom(format!("number {wide} overflows i32")))
}

/// Deserializes an optional `i64`, treating JSON null as `None`.
pub fn flexible_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    coerce_i64::<D::Error>(&value).map(Some)
}

/// Deserializes a list of `i32`s where each element may be an integer or a
/// float JSON token.
pub fn flexible_vec_i32<'de, D>(deserializer: D) -> Result<Vec<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;

    values
        .iter()
        .map(|value| {
            let wide = coerce_i64::<D::Error>(value)?;
            i32::try_from(wide)
                .map_err(|_| D::Error::custom(format!("number {wide} overflows i32")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Flexible {
        #[serde(deserialize_with = "super::flexible_i32")]
        id: i32,
        #[serde(default, deserialize_with = "super::flexible_opt_i32")]
        alliance_id: Option<i32>,
    }

    /// Expect integer tokens to parse unchanged
    #[test]
    fn parses_integer_tokens() {
        let parsed: Flexible = serde_json::from_str(r#"{"id": 98000001}"#).unwrap();
        assert_eq!(parsed.id, 98_000_001);
        assert_eq!(parsed.alliance_id, None);
    }

    /// Expect float tokens to coerce to the declared integer width
    #[test]
    fn coerces_float_tokens() {
        let parsed: Flexible =
            serde_json::from_str(r#"{"id": 98000001.0, "alliance_id": 99000001.0}"#).unwrap();
        assert_eq!(parsed.id, 98_000_001);
        assert_eq!(parsed.alliance_id, Some(99_000_001));
    }

    /// Expect null to map to None for optional fields
    #[test]
    fn maps_null_to_none() {
        let parsed: Flexible =
            serde_json::from_str(r#"{"id": 1000, "alliance_id": null}"#).unwrap();
        assert_eq!(parsed.alliance_id, None);
    }

    /// Expect values overflowing i32 to be rejected
    #[test]
    fn rejects_i32_overflow() {
        let result: Result<Flexible, _> = serde_json::from_str(r#"{"id": 3000000000}"#);
        assert!(result.is_err());
    }

    /// Expect non-numeric tokens to be rejected
    #[test]
    fn rejects_non_numeric_tokens() {
        let result: Result<Flexible, _> = serde_json::from_str(r#"{"id": "98000001"}"#);
        assert!(result.is_err());
    }

    /// Expect flexible_vec_i32 to accept mixed int and float elements
    #[test]
    fn parses_mixed_numeric_lists() {
        #[derive(Deserialize)]
        struct Implants {
            #[serde(deserialize_with = "super::flexible_vec_i32")]
            implants: Vec<i32>,
        }

        let parsed: Implants =
            serde_json::from_str(r#"{"implants": [22118, 22119.0, 22120]}"#).unwrap();
        assert_eq!(parsed.implants, vec![22118, 22119, 22120]);
    }
}
