//! Canonical JSON encoding for deterministic hashing.
//!
//! Rules:
//! - No insignificant whitespace
//! - Object keys sorted by UTF-8 byte comparison of the keys as given, then
//!   emitted NFC-normalized
//! - Entries whose value is [`Value::Absent`] are omitted
//! - Arrays keep their order
//! - Strings NFC-normalized, minimal JSON escaping, everything else raw UTF-8
//! - Numbers in shortest round-trip form, exponent outside `[1e-6, 1e21)`
//!
//! **CRITICAL**: this encoding is FROZEN. Every issuer hashes these exact bytes;
//! any change breaks all existing signatures.

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::crypto::Digest;
use crate::error::{CoreError, Result};
use crate::value::Value;

/// Encode a value to canonical JSON bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut buf = String::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf.into_bytes())
}

/// Encode a value to a canonical JSON string.
pub fn encode_to_string(value: &Value) -> Result<String> {
    let mut buf = String::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

/// Serialize any `Serialize` type through the value model and encode it.
///
/// Note: `serde_json` turns non-finite floats into `null` before they reach
/// the encoder; build a [`Value`] directly when that matters.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_value(value).map_err(|e| CoreError::UnsupportedType(e.to_string()))?;
    encode(&Value::from(json))
}

/// Parse strict JSON into the value model.
pub fn parse(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .map(Value::from)
        .map_err(|e| CoreError::MalformedPayload(e.to_string()))
}

/// Content identifier: `b3:` + hex(BLAKE3(canonical bytes)).
pub fn compute_cid(value: &Value) -> Result<String> {
    let bytes = encode(value)?;
    Ok(format!("b3:{}", Digest::hash(&bytes).to_hex()))
}

/// Recursively encode a value.
fn encode_value_to(buf: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Null => buf.push_str("null"),
        Value::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => encode_number(buf, *n)?,
        Value::String(s) => encode_string(buf, s),
        Value::Array(items) => encode_array(buf, items)?,
        Value::Object(map) => encode_object(buf, map.iter())?,
        Value::Absent => {
            return Err(CoreError::UnsupportedType(
                "absent value outside an object entry".into(),
            ))
        }
    }
    Ok(())
}

fn encode_array(buf: &mut String, items: &[Value]) -> Result<()> {
    buf.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        encode_value_to(buf, item)?;
    }
    buf.push(']');
    Ok(())
}

fn encode_object<'a>(
    buf: &mut String,
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
) -> Result<()> {
    // Order by the raw key; only the emitted text is normalized.
    let mut sorted: Vec<(&String, &Value)> = entries.filter(|(_, v)| !v.is_absent()).collect();
    sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    buf.push('{');
    for (i, (key, value)) in sorted.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        encode_string(buf, key);
        buf.push(':');
        encode_value_to(buf, value)?;
    }
    buf.push('}');
    Ok(())
}

fn encode_string(buf: &mut String, s: &str) {
    let normalized: String = s.nfc().collect();
    escape_into(buf, &normalized);
}

/// Minimal JSON escaping.
fn escape_into(buf: &mut String, s: &str) {
    buf.push('"');
    for c in s.chars() {
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\u{08}' => buf.push_str("\\b"),
            '\u{0c}' => buf.push_str("\\f"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            c if (c as u32) < 0x20 => buf.push_str(&format!("\\u{:04x}", c as u32)),
            c => buf.push(c),
        }
    }
    buf.push('"');
}

fn encode_number(buf: &mut String, n: f64) -> Result<()> {
    if !n.is_finite() {
        return Err(CoreError::UnsupportedType(format!("non-finite number {n}")));
    }
    buf.push_str(&format_number(n));
    Ok(())
}

/// Shortest round-trip decimal text for a finite number.
///
/// Follows the ECMAScript `Number::toString` layout so that issuers written in
/// other languages produce identical bytes.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Covers -0 as well.
        return "0".to_string();
    }
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. "1.2345e-7".
    let sci = format!("{n:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // Decimal point position: value = 0.digits * 10^point
    let point = exp + 1;

    if k <= point && point <= 21 {
        let mut out = digits;
        out.extend(std::iter::repeat('0').take((point - k) as usize));
        out
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        let zeros = "0".repeat((-point) as usize);
        format!("0.{zeros}{digits}")
    } else {
        let e = point - 1;
        let sign = if e >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{}", e.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", e.abs())
        }
    }
}
