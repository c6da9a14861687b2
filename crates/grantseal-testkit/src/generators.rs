//! Proptest generators for property-based testing.

use proptest::prelude::*;

use grantseal_core::{AccessGrant, Keypair, Map, Seal, Value};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Finite numbers, weighted toward the ones that stress number formatting.
pub fn finite_number() -> impl Strategy<Value = f64> {
    prop_oneof![
        any::<i32>().prop_map(f64::from),
        (-1e21f64..1e21f64),
        any::<f64>().prop_filter("finite", |n| n.is_finite()),
        Just(0.1),
        Just(-0.0),
        Just(1e21),
        Just(1e-7),
        Just(f64::MAX),
        Just(f64::MIN_POSITIVE),
    ]
}

/// Strings mixing ASCII, controls, precomposed and decomposed accents.
pub fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => proptest::char::range('a', 'z'),
            1 => proptest::char::range('\u{0}', '\u{1f}'),
            1 => Just('"'),
            1 => Just('\\'),
            1 => Just('\u{e9}'),
            1 => Just('\u{301}'),
            1 => Just('\u{1F600}'),
        ],
        0..12,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Object keys. ASCII only, so the raw and normalized orders agree.
pub fn key() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,8}".prop_map(String::from)
}

/// Arbitrary encodable values, nested up to a few levels.
pub fn value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        finite_number().prop_map(Value::Number),
        text().prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(key(), inner, 0..6).prop_map(Value::Object),
        ]
    })
}

/// An object plus the same entries in a shuffled insertion order.
pub fn object_with_shuffle() -> impl Strategy<Value = (Vec<(String, Value)>, Vec<(String, Value)>)> {
    prop::collection::btree_map(key(), value(), 1..8)
        .prop_map(|m: Map| m.into_iter().collect::<Vec<_>>())
        .prop_flat_map(|entries| {
            let shuffled = Just(entries.clone()).prop_shuffle();
            (Just(entries), shuffled)
        })
}

/// Parameters for generating a grant.
#[derive(Debug, Clone)]
pub struct GrantParams {
    pub grant_id: String,
    pub sub: String,
    pub kid: String,
    pub nonce: String,
    pub resource: Value,
}

impl Arbitrary for GrantParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            "g-[a-z0-9]{1,12}",
            "user:[a-z]{1,8}",
            "k[0-9]{1,3}",
            "[a-f0-9]{16}",
            value(),
        )
            .prop_map(|(grant_id, sub, kid, nonce, resource)| GrantParams {
                grant_id,
                sub,
                kid,
                nonce,
                resource,
            })
            .boxed()
    }
}

/// Build an unsealed grant from parameters.
pub fn grant_from_params(params: &GrantParams, iat: &str, exp: &str) -> AccessGrant {
    AccessGrant::new(
        params.grant_id.as_str(),
        params.sub.as_str(),
        iat,
        exp,
        params.nonce.as_str(),
    )
    .with_resource(params.resource.clone())
    .with_seal(Seal::unsigned(params.kid.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantseal_core::{decode_compact, encode, issue_compact, parse, seal_grant, verify_embedded};

    const IAT: &str = "2026-01-14T12:00:00.000Z";
    const EXP: &str = "2026-01-14T13:00:00.000Z";

    proptest! {
        #[test]
        fn encoding_is_deterministic(v in value()) {
            prop_assert_eq!(encode(&v).unwrap(), encode(&v).unwrap());
        }

        #[test]
        fn key_order_does_not_matter((entries, shuffled) in object_with_shuffle()) {
            let a = Value::Object(entries.into_iter().collect());
            let b = Value::Object(shuffled.into_iter().collect());
            prop_assert_eq!(encode(&a).unwrap(), encode(&b).unwrap());
        }

        #[test]
        fn encoding_is_idempotent(v in value()) {
            let once = encode(&v).unwrap();
            let twice = encode(&parse(&once).unwrap()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn distinct_values_encode_distinctly(a in value(), b in value()) {
            let (ea, eb) = (encode(&a).unwrap(), encode(&b).unwrap());
            if ea == eb {
                // Equal text must mean equal canonical values.
                prop_assert_eq!(
                    encode(&parse(&ea).unwrap()).unwrap(),
                    encode(&parse(&eb).unwrap()).unwrap()
                );
            } else {
                prop_assert_ne!(parse(&ea).unwrap(), parse(&eb).unwrap());
            }
        }

        #[test]
        fn sealed_grants_verify(params: GrantParams, kp in keypair()) {
            let mut grant = grant_from_params(&params, IAT, EXP);
            seal_grant(&kp, &params.kid, &mut grant).unwrap();
            prop_assert!(verify_embedded(&grant, &kp.public_key()).unwrap());

            let mut tampered = grant.clone();
            tampered.sub.push('x');
            prop_assert!(!verify_embedded(&tampered, &kp.public_key()).unwrap());
        }

        #[test]
        fn compact_tokens_round_trip(params: GrantParams, kp in keypair()) {
            let grant = grant_from_params(&params, IAT, EXP);
            let token = issue_compact(&kp, &grant).unwrap();
            let decoded = decode_compact(&token, &kp.public_key()).unwrap();
            prop_assert_eq!(decoded.grant_id, grant.grant_id);
            prop_assert!(decoded.seal.is_none());
        }
    }
}
