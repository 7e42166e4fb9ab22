pub mod address_lookup_table;
pub mod anchor;
pub mod associated_token;
pub mod bpf_loader;
pub mod compute_budget;
pub mod mango;
pub mod memo;
pub mod pyth;
pub mod serum;
pub mod stake;
pub mod system;
pub mod token;
pub mod token_lending;
pub mod upgradeable_loader;
pub mod vote;
pub mod wormhole;

use std::collections::HashMap;

use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::address::Address;
use crate::error::ValidationError;
use crate::types::ParsedInstruction;

pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";
pub const STAKE_PROGRAM_ID: &str = "Stake11111111111111111111111111111111111111";
pub const VOTE_PROGRAM_ID: &str = "Vote111111111111111111111111111111111111111";
pub const CONFIG_PROGRAM_ID: &str = "Config1111111111111111111111111111111111111";
pub const BPF_LOADER_1_PROGRAM_ID: &str = "BPFLoader1111111111111111111111111111111111";
pub const BPF_LOADER_2_PROGRAM_ID: &str = "BPFLoader2111111111111111111111111111111111";
pub const BPF_UPGRADEABLE_LOADER_PROGRAM_ID: &str = "BPFLoaderUpgradeab1e11111111111111111111111";
pub const ADDRESS_LOOKUP_TABLE_PROGRAM_ID: &str = "AddressLookupTab1e1111111111111111111111111";
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";
pub const MEMO_V1_PROGRAM_ID: &str = "Memo1UhkJRfHyvLMcVucJwxXeuD728EqVDDwQDxFMNo";
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";
pub const COMPUTE_BUDGET_PROGRAM_ID: &str = "ComputeBudget111111111111111111111111111111";
pub const ED25519_PROGRAM_ID: &str = "Ed25519SigVerify111111111111111111111111111";
pub const SECP256K1_PROGRAM_ID: &str = "KeccakSecp256k11111111111111111111111111111";
pub const ZK_TOKEN_PROOF_PROGRAM_ID: &str = "ZkTokenProof1111111111111111111111111111111";
pub const SERUM_V1_PROGRAM_ID: &str = "BJ3jrUzddfuSrZHXSCxMUUQsjKEyLmuuyZebkcaFp2fg";
pub const SERUM_V2_PROGRAM_ID: &str = "EUqojwWA2rd19FZrzeBncJsm38Jm1hEhE3zsmX3bRc2o";
pub const SERUM_V3_PROGRAM_ID: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";
pub const SERUM_V3_DEVNET_PROGRAM_ID: &str = "DESVgJVGajEgKGXhb6XmqDHGz3VjdgP7rEVESBgxmroY";
pub const OPENBOOK_PROGRAM_ID: &str = "srmqPvymJeFKQ4zGQed1GFppgkRHL9kaELCbyksJtPX";
pub const OPENBOOK_DEVNET_PROGRAM_ID: &str = "EoTcMgcDRTJVZDMZWBoU6rhYHZfkNTVEAfz3uUJRcYGj";
pub const PYTH_MAINNET_PROGRAM_ID: &str = "FsJ3A3u2vn5cTVofAjvy6y5kwABJAqYWpe4975bi2epH";
pub const PYTH_TESTNET_PROGRAM_ID: &str = "8tfDNiaEyrV6Q1U4DEXrEigs9DoDtkugzFbybENEbCDz";
pub const PYTH_DEVNET_PROGRAM_ID: &str = "gSbePebfvPy7tRqimPoVecS2UsBvYv46ynrzWocc92s";
pub const MANGO_V3_PROGRAM_ID: &str = "mv3ekLzLbnVPNxjSKvqBpU3ZeZXPQdEC3bp5MDEBG68";
pub const MANGO_V3_DEVNET_PROGRAM_ID: &str = "4skJ85cdxQAFVKbcGgfun8iZPL7BadVYXG3kGEGkufqA";
pub const TOKEN_LENDING_PROGRAM_ID: &str = "LendZqTs7gn5CTSJU1jWKhKuVpjJGom45nnwPb2AMTi";
pub const TOKEN_LENDING_DEVNET_PROGRAM_ID: &str = "6TvznH3B2e3p2mbhufNBpgSrLx6UkgvxtVQvopEZ2kuH";
pub const WORMHOLE_CORE_PROGRAM_ID: &str = "worm2ZoG2kUd4vFXhvjh93UUH596ayRfgQ2MgjNMTth";
pub const WORMHOLE_CORE_DEVNET_PROGRAM_ID: &str = "3u8hJUVTA4jH1wYAyUur7FFZVQ8H635K3tSHHF4ssjQ5";
pub const WORMHOLE_TOKEN_BRIDGE_PROGRAM_ID: &str = "wormDTUJ6AWPNvk59vGQbDvGJmqbDTdgWgAqcLBCgUb";
pub const WORMHOLE_TOKEN_BRIDGE_DEVNET_PROGRAM_ID: &str =
    "DZnkkTmCiFWfYTfT41X3Rd1kDgozqzxWaHqsw6W4x2oe";

/// Native programs that never emit a `Program <id> invoke [n]` log line.
pub const NATIVE_PROGRAMS_MISSING_INVOKE_LOG: &[&str] = &[
    ADDRESS_LOOKUP_TABLE_PROGRAM_ID,
    ZK_TOKEN_PROOF_PROGRAM_ID,
    BPF_LOADER_1_PROGRAM_ID,
    BPF_LOADER_2_PROGRAM_ID,
    BPF_UPGRADEABLE_LOADER_PROGRAM_ID,
    ED25519_PROGRAM_ID,
    SECP256K1_PROGRAM_ID,
];

pub fn is_missing_invoke_log(program_id: &Address) -> bool {
    let text = program_id.to_string();
    NATIVE_PROGRAMS_MISSING_INVOKE_LOG.contains(&text.as_str())
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    #[default]
    #[strum(serialize = "mainnet-beta")]
    #[serde(rename = "mainnet-beta")]
    MainnetBeta,
    Testnet,
    Devnet,
    Custom,
}

const ALL_CLUSTERS: &[Cluster] = &[
    Cluster::MainnetBeta,
    Cluster::Testnet,
    Cluster::Devnet,
    Cluster::Custom,
];
const MAINNET: &[Cluster] = &[Cluster::MainnetBeta];
const DEVNET: &[Cluster] = &[Cluster::Devnet];
const TESTNET: &[Cluster] = &[Cluster::Testnet];

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ProgramKind {
    System,
    Stake,
    Vote,
    Config,
    BpfLoader,
    BpfLoader2,
    BpfUpgradeableLoader,
    AddressLookupTable,
    AssociatedToken,
    Token,
    Token2022,
    Memo,
    ComputeBudget,
    Ed25519,
    Secp256k1,
    SerumV1,
    SerumV2,
    SerumV3,
    OpenBook,
    Pyth,
    MangoV3,
    TokenLending,
    WormholeCore,
    WormholeTokenBridge,
    Anchor,
}

impl ProgramKind {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::System => "System Program",
            Self::Stake => "Stake Program",
            Self::Vote => "Vote Program",
            Self::Config => "Config Program",
            Self::BpfLoader => "BPF Loader",
            Self::BpfLoader2 => "BPF Loader 2",
            Self::BpfUpgradeableLoader => "BPF Upgradeable Loader",
            Self::AddressLookupTable => "Address Lookup Table Program",
            Self::AssociatedToken => "Associated Token Program",
            Self::Token => "Token Program",
            Self::Token2022 => "Token-2022 Program",
            Self::Memo => "Memo Program",
            Self::ComputeBudget => "Compute Budget Program",
            Self::Ed25519 => "Ed25519 SigVerify Precompile",
            Self::Secp256k1 => "Secp256k1 SigVerify Precompile",
            Self::SerumV1 => "Serum Dex Program v1",
            Self::SerumV2 => "Serum Dex Program v2",
            Self::SerumV3 => "Serum Dex Program v3",
            Self::OpenBook => "OpenBook Dex Program",
            Self::Pyth => "Pyth Oracle Program",
            Self::MangoV3 => "Mango Program v3",
            Self::TokenLending => "Lending Program",
            Self::WormholeCore => "Wormhole Core Bridge",
            Self::WormholeTokenBridge => "Wormhole Token Bridge",
            Self::Anchor => "Anchor Program",
        }
    }
}

/// Result of classifying a program address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Program {
    Known(ProgramKind),
    Unknown(Address),
}

impl Program {
    pub fn kind(self) -> Option<ProgramKind> {
        match self {
            Self::Known(kind) => Some(kind),
            Self::Unknown(_) => None,
        }
    }
}

struct BuiltinProgram {
    address: &'static str,
    kind: ProgramKind,
    clusters: &'static [Cluster],
}

const BUILTIN_PROGRAMS: &[BuiltinProgram] = &[
    BuiltinProgram {
        address: SYSTEM_PROGRAM_ID,
        kind: ProgramKind::System,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: STAKE_PROGRAM_ID,
        kind: ProgramKind::Stake,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: VOTE_PROGRAM_ID,
        kind: ProgramKind::Vote,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: CONFIG_PROGRAM_ID,
        kind: ProgramKind::Config,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: BPF_LOADER_1_PROGRAM_ID,
        kind: ProgramKind::BpfLoader,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: BPF_LOADER_2_PROGRAM_ID,
        kind: ProgramKind::BpfLoader2,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: BPF_UPGRADEABLE_LOADER_PROGRAM_ID,
        kind: ProgramKind::BpfUpgradeableLoader,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: ADDRESS_LOOKUP_TABLE_PROGRAM_ID,
        kind: ProgramKind::AddressLookupTable,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: ASSOCIATED_TOKEN_PROGRAM_ID,
        kind: ProgramKind::AssociatedToken,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: TOKEN_PROGRAM_ID,
        kind: ProgramKind::Token,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: TOKEN_2022_PROGRAM_ID,
        kind: ProgramKind::Token2022,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: MEMO_V1_PROGRAM_ID,
        kind: ProgramKind::Memo,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: MEMO_PROGRAM_ID,
        kind: ProgramKind::Memo,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: COMPUTE_BUDGET_PROGRAM_ID,
        kind: ProgramKind::ComputeBudget,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: ED25519_PROGRAM_ID,
        kind: ProgramKind::Ed25519,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: SECP256K1_PROGRAM_ID,
        kind: ProgramKind::Secp256k1,
        clusters: ALL_CLUSTERS,
    },
    BuiltinProgram {
        address: SERUM_V1_PROGRAM_ID,
        kind: ProgramKind::SerumV1,
        clusters: MAINNET,
    },
    BuiltinProgram {
        address: SERUM_V2_PROGRAM_ID,
        kind: ProgramKind::SerumV2,
        clusters: MAINNET,
    },
    BuiltinProgram {
        address: SERUM_V3_PROGRAM_ID,
        kind: ProgramKind::SerumV3,
        clusters: MAINNET,
    },
    BuiltinProgram {
        address: SERUM_V3_DEVNET_PROGRAM_ID,
        kind: ProgramKind::SerumV3,
        clusters: DEVNET,
    },
    BuiltinProgram {
        address: OPENBOOK_PROGRAM_ID,
        kind: ProgramKind::OpenBook,
        clusters: MAINNET,
    },
    BuiltinProgram {
        address: OPENBOOK_DEVNET_PROGRAM_ID,
        kind: ProgramKind::OpenBook,
        clusters: DEVNET,
    },
    BuiltinProgram {
        address: PYTH_MAINNET_PROGRAM_ID,
        kind: ProgramKind::Pyth,
        clusters: MAINNET,
    },
    BuiltinProgram {
        address: PYTH_TESTNET_PROGRAM_ID,
        kind: ProgramKind::Pyth,
        clusters: TESTNET,
    },
    BuiltinProgram {
        address: PYTH_DEVNET_PROGRAM_ID,
        kind: ProgramKind::Pyth,
        clusters: DEVNET,
    },
    BuiltinProgram {
        address: MANGO_V3_PROGRAM_ID,
        kind: ProgramKind::MangoV3,
        clusters: MAINNET,
    },
    BuiltinProgram {
        address: MANGO_V3_DEVNET_PROGRAM_ID,
        kind: ProgramKind::MangoV3,
        clusters: DEVNET,
    },
    BuiltinProgram {
        address: TOKEN_LENDING_PROGRAM_ID,
        kind: ProgramKind::TokenLending,
        clusters: MAINNET,
    },
    BuiltinProgram {
        address: TOKEN_LENDING_DEVNET_PROGRAM_ID,
        kind: ProgramKind::TokenLending,
        clusters: DEVNET,
    },
    BuiltinProgram {
        address: WORMHOLE_CORE_PROGRAM_ID,
        kind: ProgramKind::WormholeCore,
        clusters: MAINNET,
    },
    BuiltinProgram {
        address: WORMHOLE_CORE_DEVNET_PROGRAM_ID,
        kind: ProgramKind::WormholeCore,
        clusters: DEVNET,
    },
    BuiltinProgram {
        address: WORMHOLE_TOKEN_BRIDGE_PROGRAM_ID,
        kind: ProgramKind::WormholeTokenBridge,
        clusters: MAINNET,
    },
    BuiltinProgram {
        address: WORMHOLE_TOKEN_BRIDGE_DEVNET_PROGRAM_ID,
        kind: ProgramKind::WormholeTokenBridge,
        clusters: DEVNET,
    },
];

/// Well-known program addresses for one cluster, plus caller registrations.
#[derive(Debug, Clone)]
pub struct ProgramRegistry {
    cluster: Cluster,
    programs: HashMap<Address, ProgramKind>,
}

impl ProgramRegistry {
    pub fn new(cluster: Cluster) -> Self {
        let programs = BUILTIN_PROGRAMS
            .iter()
            .filter(|entry| entry.clusters.contains(&cluster))
            .filter_map(|entry| Some((entry.address.parse().ok()?, entry.kind)))
            .collect();
        Self { cluster, programs }
    }

    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    pub fn register(&mut self, address: Address, kind: ProgramKind) {
        self.programs.insert(address, kind);
    }

    pub fn with_program(mut self, address: Address, kind: ProgramKind) -> Self {
        self.register(address, kind);
        self
    }

    pub fn identify(&self, program_id: &Address) -> Program {
        match self.programs.get(program_id) {
            Some(kind) => Program::Known(*kind),
            None => Program::Unknown(*program_id),
        }
    }
}

impl Default for ProgramRegistry {
    fn default() -> Self {
        Self::new(Cluster::default())
    }
}

/// Classify `program_id` against the builtin table for `cluster`.
pub fn identify(program_id: &Address, cluster: Cluster) -> Program {
    let text = program_id.to_string();
    BUILTIN_PROGRAMS
        .iter()
        .find(|entry| entry.address == text && entry.clusters.contains(&cluster))
        .map_or(Program::Unknown(*program_id), |entry| {
            Program::Known(entry.kind)
        })
}

/// Refine an upstream `{ type, info }` bag into the schema enum `T`.
///
/// Unknown tags and malformed known tags are reported separately so the
/// caller can tell "not modelled" from "upstream sent garbage".
pub fn parse_schema<T>(
    program: &str,
    parsed: Option<&ParsedInstruction>,
    known: &[&str],
) -> Result<T, ValidationError>
where
    T: DeserializeOwned,
{
    let parsed = parsed.ok_or_else(|| ValidationError::MissingParsedInfo {
        program: program.to_string(),
    })?;
    let Some(type_tag) = parsed.type_tag() else {
        return Err(ValidationError::Malformed {
            program: program.to_string(),
            type_tag: String::new(),
            reason: "missing `type` tag".to_string(),
        });
    };
    if !known.contains(&type_tag) {
        return Err(ValidationError::UnknownType {
            program: program.to_string(),
            type_tag: type_tag.to_string(),
        });
    }
    serde_json::from_value(parsed.parsed.clone()).map_err(|e| ValidationError::Malformed {
        program: program.to_string(),
        type_tag: type_tag.to_string(),
        reason: e.to_string(),
    })
}

/// `u64` fields arrive as JSON integers or, for token amounts, decimal strings.
pub(crate) mod wide_u64 {
    use super::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    fn to_u64<E: serde::de::Error>(value: NumberOrString) -> Result<u64, E> {
        match value {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s
                .parse::<u64>()
                .map_err(|e| E::custom(format!("invalid u64 `{s}`: {e}"))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        to_u64(NumberOrString::deserialize(deserializer)?)
    }

    pub mod option {
        use super::{Deserialize, Deserializer, NumberOrString, to_u64};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u64>, D::Error> {
            Option::<NumberOrString>::deserialize(deserializer)?
                .map(to_u64)
                .transpose()
        }
    }

    pub mod vec {
        use super::{Deserialize, Deserializer, NumberOrString, to_u64};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<u64>, D::Error> {
            Vec::<NumberOrString>::deserialize(deserializer)?
                .into_iter()
                .map(to_u64)
                .collect()
        }
    }
}

/// Byte payloads arrive base64-encoded, either bare or as `[data, "base64"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Base64Bytes(pub Vec<u8>);

impl<'de> Deserialize<'de> for Base64Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Encoded {
            Bare(String),
            Tagged(String, String),
        }

        let data = match Encoded::deserialize(deserializer)? {
            Encoded::Bare(data) => data,
            Encoded::Tagged(data, encoding) if encoding == "base64" => data,
            Encoded::Tagged(_, encoding) => {
                return Err(serde::de::Error::custom(format!("unsupported encoding `{encoding}`")));
            }
        };
        base64::engine::general_purpose::STANDARD
            .decode(data.as_bytes())
            .map(Base64Bytes)
            .map_err(|e| serde::de::Error::custom(format!("invalid base64: {e}")))
    }
}

/// Token amounts as reported by the upstream parser's `tokenAmount` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    #[serde(with = "wide_u64")]
    pub amount: u64,
    pub decimals: u8,
}

pub(crate) fn read_u8(data: &[u8], offset: usize) -> Option<u8> {
    data.get(offset).copied()
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes(bytes.try_into().ok()?))
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

pub(crate) fn read_i32(data: &[u8], offset: usize) -> Option<i32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(i32::from_le_bytes(bytes.try_into().ok()?))
}

pub(crate) fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    let bytes = data.get(offset..offset.checked_add(8)?)?;
    Some(u64::from_le_bytes(bytes.try_into().ok()?))
}

pub(crate) fn read_i64(data: &[u8], offset: usize) -> Option<i64> {
    let bytes = data.get(offset..offset.checked_add(8)?)?;
    Some(i64::from_le_bytes(bytes.try_into().ok()?))
}

pub(crate) fn read_u128(data: &[u8], offset: usize) -> Option<u128> {
    let bytes = data.get(offset..offset.checked_add(16)?)?;
    Some(u128::from_le_bytes(bytes.try_into().ok()?))
}

pub(crate) fn read_address(data: &[u8], offset: usize) -> Option<Address> {
    Address::try_from_slice(data.get(offset..offset.checked_add(32)?)?)
}

pub(crate) fn invalid_data(program: ProgramKind, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidData {
        program: program.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn every_builtin_address_parses() {
        for entry in BUILTIN_PROGRAMS {
            assert!(
                entry.address.parse::<Address>().is_ok(),
                "invalid builtin address for {}: {}",
                entry.kind,
                entry.address
            );
        }
        for address in NATIVE_PROGRAMS_MISSING_INVOKE_LOG {
            assert!(
                address.parse::<Address>().is_ok(),
                "invalid address {address}"
            );
        }
    }

    #[test]
    fn identifies_native_programs_on_every_cluster() {
        for cluster in ALL_CLUSTERS {
            let registry = ProgramRegistry::new(*cluster);
            assert_eq!(
                registry.identify(&addr(SYSTEM_PROGRAM_ID)),
                Program::Known(ProgramKind::System)
            );
            assert_eq!(
                registry.identify(&addr(TOKEN_2022_PROGRAM_ID)),
                Program::Known(ProgramKind::Token2022)
            );
            assert_eq!(
                identify(&addr(MEMO_V1_PROGRAM_ID), *cluster),
                Program::Known(ProgramKind::Memo)
            );
        }
    }

    #[test]
    fn cluster_partitioned_deployments() {
        let serum_devnet = addr(SERUM_V3_DEVNET_PROGRAM_ID);
        assert_eq!(
            identify(&serum_devnet, Cluster::Devnet),
            Program::Known(ProgramKind::SerumV3)
        );
        assert_eq!(
            identify(&serum_devnet, Cluster::MainnetBeta),
            Program::Unknown(serum_devnet)
        );
        assert_eq!(
            identify(&addr(PYTH_MAINNET_PROGRAM_ID), Cluster::MainnetBeta),
            Program::Known(ProgramKind::Pyth)
        );
        assert_eq!(
            ProgramRegistry::new(Cluster::Testnet).identify(&addr(PYTH_DEVNET_PROGRAM_ID)),
            Program::Unknown(addr(PYTH_DEVNET_PROGRAM_ID))
        );
    }

    #[test]
    fn unknown_addresses_are_classified_not_rejected() {
        let address = Address::new([9; 32]);
        assert_eq!(
            identify(&address, Cluster::MainnetBeta),
            Program::Unknown(address)
        );
        assert_eq!(Program::Unknown(address).kind(), None);
    }

    #[test]
    fn registrations_extend_the_registry() {
        let address = Address::new([3; 32]);
        let registry =
            ProgramRegistry::new(Cluster::Custom).with_program(address, ProgramKind::Anchor);
        assert_eq!(
            registry.identify(&address),
            Program::Known(ProgramKind::Anchor)
        );
        assert_eq!(registry.cluster(), Cluster::Custom);
    }

    #[test]
    fn missing_invoke_log_allowlist() {
        assert!(is_missing_invoke_log(&addr(ADDRESS_LOOKUP_TABLE_PROGRAM_ID)));
        assert!(is_missing_invoke_log(&addr(BPF_UPGRADEABLE_LOADER_PROGRAM_ID)));
        assert!(!is_missing_invoke_log(&addr(SYSTEM_PROGRAM_ID)));
    }

    #[test]
    fn cluster_and_kind_text_forms() {
        assert_eq!(
            "mainnet-beta".parse::<Cluster>().ok(),
            Some(Cluster::MainnetBeta)
        );
        assert_eq!(Cluster::Devnet.to_string(), "devnet");
        assert_eq!(
            "bpf-upgradeable-loader".parse::<ProgramKind>().ok(),
            Some(ProgramKind::BpfUpgradeableLoader)
        );
        assert_eq!(
            ProgramKind::AddressLookupTable.as_ref(),
            "address-lookup-table"
        );
    }

    #[test]
    fn wide_u64_accepts_numbers_and_strings() {
        #[derive(Deserialize)]
        struct Amount {
            #[serde(with = "wide_u64")]
            value: u64,
        }
        let from_number: Amount =
            serde_json::from_value(serde_json::json!({ "value": 9_007_199_254_740_993_u64 }))
                .unwrap();
        assert_eq!(from_number.value, 9_007_199_254_740_993);
        let from_string: Amount =
            serde_json::from_value(serde_json::json!({ "value": "18446744073709551615" }))
                .unwrap();
        assert_eq!(from_string.value, u64::MAX);
        assert!(serde_json::from_value::<Amount>(serde_json::json!({ "value": -1 })).is_err());
        assert!(serde_json::from_value::<Amount>(serde_json::json!({ "value": 1.5 })).is_err());
        assert!(serde_json::from_value::<Amount>(serde_json::json!({ "value": "abc" })).is_err());
    }

    #[test]
    fn base64_bytes_accepts_bare_and_tagged() {
        let bare: Base64Bytes = serde_json::from_value(serde_json::json!("AQID")).unwrap();
        assert_eq!(bare.0, vec![1, 2, 3]);
        let tagged: Base64Bytes =
            serde_json::from_value(serde_json::json!(["AQID", "base64"])).unwrap();
        assert_eq!(tagged.0, vec![1, 2, 3]);
        assert!(
            serde_json::from_value::<Base64Bytes>(serde_json::json!(["AQID", "base58"])).is_err()
        );
    }

    #[test]
    fn little_endian_readers_are_bounds_checked() {
        let data = [1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(read_u32(&data, 0), Some(1));
        assert_eq!(read_u64(&data, 4), Some(2));
        assert_eq!(read_u64(&data, 5), None);
        assert_eq!(read_u16(&data, usize::MAX), None);
    }
}
