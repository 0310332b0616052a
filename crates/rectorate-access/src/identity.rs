//! Opaque caller identities

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::IdentityParseError;

/// Number of bytes in an identity
pub const IDENTITY_LEN: usize = 20;

/// Address-like identity of a caller, director or school
///
/// The all-zero value is reserved as the null sentinel and never names a
/// real party. Rendered as `0x`-prefixed lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    /// The reserved null identity
    pub const NULL: Identity = Identity([0u8; IDENTITY_LEN]);

    /// Wrap raw bytes
    pub const fn from_bytes(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate a random non-null identity
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; IDENTITY_LEN];
            rng.fill_bytes(&mut bytes);
            let identity = Self(bytes);
            if !identity.is_null() {
                return identity;
            }
        }
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// Whether this is the null sentinel
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self)
    }
}

impl FromStr for Identity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != IDENTITY_LEN * 2 {
            return Err(IdentityParseError::Length {
                input: s.to_string(),
                found: digits.len(),
            });
        }

        let mut bytes = [0u8; IDENTITY_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| IdentityParseError::Hex {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.to_string()
    }
}

/// Opaque handle to a School produced by a school factory
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchoolHandle(Identity);

impl SchoolHandle {
    /// The reserved null handle
    pub const NULL: SchoolHandle = SchoolHandle(Identity::NULL);

    pub const fn new(identity: Identity) -> Self {
        Self(identity)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl From<Identity> for SchoolHandle {
    fn from(identity: Identity) -> Self {
        Self(identity)
    }
}

impl FromStr for SchoolHandle {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl fmt::Display for SchoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for SchoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchoolHandle({})", self.0)
    }
}
