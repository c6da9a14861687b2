//! The access grant record and its seal.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::value::{Map, Value};

/// Discriminator every grant must carry.
pub const GRANT_KIND: &str = "access.grant.v1";

/// The only seal algorithm: Ed25519 over a BLAKE3 digest.
pub const SEAL_ALG: &str = "ed25519-blake3";

/// Field names of the grant document.
pub mod fields {
    pub const KIND: &str = "kind";
    pub const GRANT_ID: &str = "grant_id";
    pub const SUB: &str = "sub";
    pub const RESOURCE: &str = "resource";
    pub const EXP: &str = "exp";
    pub const IAT: &str = "iat";
    pub const NONCE: &str = "nonce";
    pub const SEAL: &str = "seal";
    pub const ALG: &str = "alg";
    pub const KID: &str = "kid";
    pub const SIG: &str = "sig";
    pub const CONSTRAINTS: &str = "constraints";
    pub const IP_HASH: &str = "ip_hash";
    pub const BYTE_RANGE_MAX: &str = "byte_range_max";
}

/// Detached signature envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seal {
    /// Always [`SEAL_ALG`].
    pub alg: String,
    /// Names the public key that should verify `sig`.
    pub kid: String,
    /// Standard base64 of the 64-byte signature. Empty while hashing.
    pub sig: String,
    /// Seal fields this version does not know about. They are signed too.
    #[serde(flatten)]
    pub extra: Map,
}

impl Seal {
    /// An unsigned seal for `kid`.
    pub fn unsigned(kid: impl Into<String>) -> Self {
        Self {
            alg: SEAL_ALG.to_string(),
            kid: kid.into(),
            sig: String::new(),
            extra: Map::new(),
        }
    }

    fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert(fields::ALG.into(), self.alg.as_str().into());
        map.insert(fields::KID.into(), self.kid.as_str().into());
        map.insert(fields::SIG.into(), self.sig.as_str().into());
        Value::Object(map)
    }
}

/// A signed, time-bounded authorization record.
///
/// Top-level fields this version does not know about are kept in `extra` and
/// take part in canonicalization, so newer issuers' signatures still verify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub kind: String,
    pub grant_id: String,
    pub sub: String,
    pub resource: Value,
    pub exp: String,
    pub iat: String,
    pub nonce: String,
    /// Absent on grants decoded from a compact token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal: Option<Seal>,
    #[serde(flatten)]
    pub extra: Map,
}

impl AccessGrant {
    /// Start a grant with the required fields; `resource` defaults to `{}`.
    pub fn new(
        grant_id: impl Into<String>,
        sub: impl Into<String>,
        iat: impl Into<String>,
        exp: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            kind: GRANT_KIND.to_string(),
            grant_id: grant_id.into(),
            sub: sub.into(),
            resource: Value::object(),
            exp: exp.into(),
            iat: iat.into(),
            nonce: nonce.into(),
            seal: None,
            extra: Map::new(),
        }
    }

    pub fn with_resource(mut self, resource: Value) -> Self {
        self.resource = resource;
        self
    }

    pub fn with_seal(mut self, seal: Seal) -> Self {
        self.seal = Some(seal);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Key id from the seal, if any.
    pub fn kid(&self) -> Option<&str> {
        self.seal.as_ref().map(|s| s.kid.as_str())
    }

    /// `resource.constraints`, if present.
    pub fn constraints(&self) -> Option<&Value> {
        self.resource.get(fields::CONSTRAINTS)
    }

    /// Convert to the value model, field for field.
    ///
    /// Known fields win over same-named entries in `extra`.
    pub fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert(fields::KIND.into(), self.kind.as_str().into());
        map.insert(fields::GRANT_ID.into(), self.grant_id.as_str().into());
        map.insert(fields::SUB.into(), self.sub.as_str().into());
        map.insert(fields::RESOURCE.into(), self.resource.clone());
        map.insert(fields::EXP.into(), self.exp.as_str().into());
        map.insert(fields::IAT.into(), self.iat.as_str().into());
        map.insert(fields::NONCE.into(), self.nonce.as_str().into());
        map.insert(
            fields::SEAL.into(),
            self.seal.as_ref().map_or(Value::Absent, Seal::to_value),
        );
        Value::Object(map)
    }

    /// Build a grant from a decoded document.
    ///
    /// Checks field shapes only; the `kind` check belongs to the codecs.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| CoreError::MalformedPayload(format!("expected object, got {}", value.type_name())))?;

        let text = |key: &str| -> Result<String> {
            match map.get(key) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(other) => Err(CoreError::MalformedPayload(format!(
                    "field {key} must be a string, got {}",
                    other.type_name()
                ))),
                None => Err(CoreError::MalformedPayload(format!("missing field {key}"))),
            }
        };

        let seal = match map.get(fields::SEAL) {
            None | Some(Value::Null) => None,
            Some(seal @ Value::Object(_)) => {
                let seal_text = |key: &str| -> Result<String> {
                    seal.get(key)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| CoreError::MalformedPayload(format!("seal.{key} must be a string")))
                };
                let extra = seal
                    .as_object()
                    .into_iter()
                    .flatten()
                    .filter(|(k, _)| ![fields::ALG, fields::KID, fields::SIG].contains(&k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Some(Seal {
                    alg: seal_text(fields::ALG)?,
                    kid: seal_text(fields::KID)?,
                    sig: seal_text(fields::SIG)?,
                    extra,
                })
            }
            Some(other) => {
                return Err(CoreError::MalformedPayload(format!(
                    "seal must be an object, got {}",
                    other.type_name()
                )))
            }
        };

        let known = [
            fields::KIND,
            fields::GRANT_ID,
            fields::SUB,
            fields::RESOURCE,
            fields::EXP,
            fields::IAT,
            fields::NONCE,
            fields::SEAL,
        ];
        let extra = map
            .iter()
            .filter(|(k, _)| !known.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            kind: text(fields::KIND)?,
            grant_id: text(fields::GRANT_ID)?,
            sub: text(fields::SUB)?,
            resource: map.get(fields::RESOURCE).cloned().unwrap_or(Value::Absent),
            exp: text(fields::EXP)?,
            iat: text(fields::IAT)?,
            nonce: text(fields::NONCE)?,
            seal,
            extra,
        })
    }

    /// Parse a JSON grant document.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Self::from_value(&crate::canonical::parse(bytes)?)
    }
}
