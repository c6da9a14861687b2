//! Golden vectors for canonical encoding and grant sealing.
//!
//! Every implementation must reproduce `expected` byte for byte from `input`.

use grantseal_core::{encode_to_string, parse, seal_grant, AccessGrant, Keypair, Value};
use grantseal_policy::ip_hash;

/// A canonical encoding vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Input JSON text, in any key order and normalization form.
    pub input: &'static str,
    /// Expected canonical text.
    pub expected: &'static str,
}

/// Get all canonical encoding vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "reference document",
            input: "{\"z\":2,\"a\":1,\"name\":\"cafe\u{0301}\",\"arr\":[{\"b\":2,\"a\":1},3]}",
            expected: "{\"a\":1,\"arr\":[{\"a\":1,\"b\":2},3],\"name\":\"caf\u{e9}\",\"z\":2}",
        },
        GoldenVector {
            name: "keys sort by utf-8 bytes",
            input: "{\"b\":1,\"a\":2,\"B\":3,\"\u{e9}\":4,\"aa\":5}",
            expected: "{\"B\":3,\"a\":2,\"aa\":5,\"b\":1,\"\u{e9}\":4}",
        },
        GoldenVector {
            name: "keys sort before normalization",
            input: "{\"f\":2,\"e\u{0301}x\":1}",
            expected: "{\"\u{e9}x\":1,\"f\":2}",
        },
        GoldenVector {
            name: "seventeen significant digits",
            input: r#"{"n":2.1082247869750922e101}"#,
            expected: r#"{"n":2.1082247869750922e+101}"#,
        },
        GoldenVector {
            name: "number text",
            input: r#"{"n":[1.0,-0.0,1e21,1e-7,0.1,123456789012345680000,-1.5e300,0.000001]}"#,
            expected: r#"{"n":[1,0,1e+21,1e-7,0.1,123456789012345680000,-1.5e+300,0.000001]}"#,
        },
        GoldenVector {
            name: "string escapes",
            input: r#"{"s":"q\"b\\s\n\t\u0001\u001f\/"}"#,
            expected: r#"{"s":"q\"b\\s\n\t\u0001\u001f/"}"#,
        },
        GoldenVector {
            name: "literals",
            input: r#"{"t":true,"n":null,"f":false}"#,
            expected: r#"{"f":false,"n":null,"t":true}"#,
        },
        GoldenVector {
            name: "empty containers",
            input: r#"{"o":{},"a":[]}"#,
            expected: r#"{"a":[],"o":{}}"#,
        },
        GoldenVector {
            name: "whitespace is dropped",
            input: "{ \"k\" :\n [ 1 , 2 ] }",
            expected: r#"{"k":[1,2]}"#,
        },
    ]
}

/// Canonical text for a vector's input.
pub fn encode_vector(vector: &GoldenVector) -> Result<String, String> {
    let value = parse(vector.input.as_bytes()).map_err(|e| format!("{}: {e}", vector.name))?;
    encode_to_string(&value).map_err(|e| format!("{}: {e}", vector.name))
}

/// Check every vector. Returns the first mismatch.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in all_vectors() {
        let actual = encode_vector(&vector)?;
        if actual != vector.expected {
            return Err(format!(
                "{}: expected {}, got {}",
                vector.name, vector.expected, actual
            ));
        }
    }
    Ok(())
}

/// Seed of the reference issuer key.
pub const ISSUER_SEED: [u8; 32] = [0x42; 32];

/// Key id of the reference issuer key.
pub const ISSUER_KID: &str = "issuer-2026-01";

/// The reference issuer keypair.
pub fn issuer_keypair() -> Keypair {
    Keypair::from_seed(&ISSUER_SEED)
}

/// The reference grant, unsealed.
pub fn reference_grant() -> AccessGrant {
    AccessGrant::new(
        "g-0001",
        "user:alice",
        "2026-01-14T12:00:00.000Z",
        "2026-01-14T13:00:00.000Z",
        "n-5f2c",
    )
    .with_resource(
        Value::object()
            .with("uri", "s3://bucket/reports/q4.pdf")
            .with("scope", Value::from(vec!["read"]))
            .with(
                "constraints",
                Value::object()
                    .with("ip_hash", ip_hash("203.0.113.7"))
                    .with("byte_range_max", 1_048_576u64),
            ),
    )
}

/// The reference grant sealed by the reference issuer.
pub fn sealed_reference_grant() -> AccessGrant {
    let mut grant = reference_grant();
    // Only non-finite numbers can fail, and the reference has none.
    if let Err(e) = seal_grant(&issuer_keypair(), ISSUER_KID, &mut grant) {
        panic!("reference grant must seal: {e}");
    }
    grant
}
