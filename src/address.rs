use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

pub const ADDRESS_BYTES: usize = 32;

/// A 32-byte chain address. Text form is base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_BYTES]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    pub fn try_from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; ADDRESS_BYTES]>::try_from(bytes).ok().map(Self)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Longest base58 encoding of 32 bytes is 44 chars.
        if s.is_empty() || s.len() > 44 {
            return Err(Error::Parse {
                reason: format!("invalid address length: {s}"),
            });
        }
        let bytes = bs58::decode(s).into_vec().map_err(|e| Error::Parse {
            reason: format!("invalid base58 address {s}: {e}"),
        })?;
        Self::try_from_slice(&bytes).ok_or_else(|| Error::Parse {
            reason: format!("address {s} decodes to {} bytes", bytes.len()),
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "native")]
impl From<solana_pubkey::Pubkey> for Address {
    fn from(pubkey: solana_pubkey::Pubkey) -> Self {
        Self(pubkey.to_bytes())
    }
}

#[cfg(feature = "native")]
impl From<Address> for solana_pubkey::Pubkey {
    fn from(address: Address) -> Self {
        solana_pubkey::Pubkey::new_from_array(address.0)
    }
}
