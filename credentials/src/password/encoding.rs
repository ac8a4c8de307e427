use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;

use super::errors::CredentialError;
use super::params::ParameterSet;

/// Algorithm identifier written into every encoded credential.
pub const ALGORITHM: &str = "argon2id";

/// Argon2 version this implementation derives with (0x13).
pub const VERSION: u32 = 0x13;

const FIELD_COUNT: usize = 6;

/// Parsed form of a `$argon2id$v=19$m=..,t=..,p=..$<salt>$<key>` string.
///
/// Carries everything needed to re-derive the key, so verification never
/// depends on the parameters currently configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCredential {
    params: ParameterSet,
    salt: Vec<u8>,
    key: Vec<u8>,
}

impl EncodedCredential {
    pub(crate) fn new(params: ParameterSet, salt: Vec<u8>, key: Vec<u8>) -> Self {
        Self { params, salt, key }
    }

    /// Parse a canonical encoded credential.
    ///
    /// Salt and key lengths of the returned parameter set come from the
    /// decoded byte lengths, not from any configured default.
    ///
    /// # Errors
    /// * `MalformedEncoding` - Wrong field count, empty field, unknown
    ///   algorithm, bad version field or undecodable base64
    /// * `UnsupportedVersion` - Version differs from [`VERSION`]
    /// * `ParameterParseError` - The `m=,t=,p=` field cannot be parsed or
    ///   describes parameters Argon2 rejects
    pub fn parse(encoded: &str) -> Result<Self, CredentialError> {
        let fields: Vec<&str> = encoded.split('$').collect();
        if fields.len() != FIELD_COUNT
            || !fields[0].is_empty()
            || fields[1..].iter().any(|field| field.is_empty())
        {
            return Err(CredentialError::MalformedEncoding(format!(
                "expected {} '$'-delimited fields",
                FIELD_COUNT
            )));
        }

        if fields[1] != ALGORITHM {
            return Err(CredentialError::MalformedEncoding(format!(
                "unsupported algorithm '{}'",
                fields[1]
            )));
        }

        let version = parse_version(fields[2])?;
        if version != VERSION {
            return Err(CredentialError::UnsupportedVersion {
                expected: VERSION,
                found: version,
            });
        }

        let (memory_cost_kib, iterations, parallelism) = parse_costs(fields[3])?;

        let salt = decode_field("salt", fields[4])?;
        let key = decode_field("key", fields[5])?;

        let params = ParameterSet::new(
            memory_cost_kib,
            iterations,
            parallelism,
            byte_length("salt", &salt)?,
            byte_length("key", &key)?,
        )
        .map_err(|e| CredentialError::ParameterParseError(e.to_string()))?;

        Ok(Self { params, salt, key })
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl fmt::Display for EncodedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}$v={}$m={},t={},p={}${}${}",
            ALGORITHM,
            VERSION,
            self.params.memory_cost_kib(),
            self.params.iterations(),
            self.params.parallelism(),
            STANDARD_NO_PAD.encode(&self.salt),
            STANDARD_NO_PAD.encode(&self.key),
        )
    }
}

impl FromStr for EncodedCredential {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_version(field: &str) -> Result<u32, CredentialError> {
    field
        .strip_prefix("v=")
        .and_then(|v| v.parse::<u32>().ok())
        .ok_or_else(|| {
            CredentialError::MalformedEncoding(format!("invalid version field '{}'", field))
        })
}

fn parse_costs(field: &str) -> Result<(u32, u32, u8), CredentialError> {
    let invalid = || {
        CredentialError::ParameterParseError(format!(
            "expected m=<u32>,t=<u32>,p=<u8>, got '{}'",
            field
        ))
    };

    let parts: Vec<&str> = field.split(',').collect();
    let [m, t, p] = parts.as_slice() else {
        return Err(invalid());
    };

    let memory_cost_kib = m
        .strip_prefix("m=")
        .and_then(|v| v.parse::<u32>().ok())
        .ok_or_else(invalid)?;
    let iterations = t
        .strip_prefix("t=")
        .and_then(|v| v.parse::<u32>().ok())
        .ok_or_else(invalid)?;
    let parallelism = p
        .strip_prefix("p=")
        .and_then(|v| v.parse::<u8>().ok())
        .ok_or_else(invalid)?;

    Ok((memory_cost_kib, iterations, parallelism))
}

fn decode_field(name: &str, field: &str) -> Result<Vec<u8>, CredentialError> {
    let bytes = STANDARD_NO_PAD
        .decode(field)
        .map_err(|e| CredentialError::MalformedEncoding(format!("invalid base64 {}: {}", name, e)))?;
    if bytes.is_empty() {
        return Err(CredentialError::MalformedEncoding(format!("empty {}", name)));
    }
    Ok(bytes)
}

fn byte_length(name: &str, bytes: &[u8]) -> Result<u32, CredentialError> {
    u32::try_from(bytes.len())
        .map_err(|_| CredentialError::MalformedEncoding(format!("{} too long", name)))
}
