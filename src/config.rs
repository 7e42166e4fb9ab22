use serde::Deserialize;

use crate::address::Address;
use crate::error::Error;
use crate::programs::{Cluster, ProgramKind, ProgramRegistry};

/// Deployment settings for a decoder: which cluster, plus extra program addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeConfig {
    #[serde(default)]
    pub cluster: Cluster,
    #[serde(default)]
    pub extra_programs: Vec<ProgramOverride>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramOverride {
    pub address: Address,
    pub kind: ProgramKind,
}

impl DecodeConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builtin table for the cluster; overrides win over builtin entries.
    pub fn registry(&self) -> ProgramRegistry {
        self.extra_programs
            .iter()
            .fold(ProgramRegistry::new(self.cluster), |registry, extra| {
                registry.with_program(extra.address, extra.kind)
            })
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::programs::{Program, SYSTEM_PROGRAM_ID};

    #[test]
    fn defaults_to_mainnet_without_overrides() {
        let config = DecodeConfig::from_json("{}").unwrap();
        assert_eq!(config.cluster, Cluster::MainnetBeta);
        assert!(config.extra_programs.is_empty());
    }

    #[test]
    fn overrides_register_anchor_programs() {
        let custom = Address::new([7; 32]);
        let config = DecodeConfig::from_json(&format!(
            r#"{{
                "cluster": "devnet",
                "extraPrograms": [{{ "address": "{custom}", "kind": "anchor" }}]
            }}"#
        ))
        .unwrap();
        assert_eq!(config.cluster, Cluster::Devnet);

        let registry = config.registry();
        assert_eq!(
            registry.identify(&custom),
            Program::Known(ProgramKind::Anchor)
        );
        let system: Address = SYSTEM_PROGRAM_ID.parse().unwrap();
        assert_eq!(
            registry.identify(&system),
            Program::Known(ProgramKind::System)
        );
    }

    #[test]
    fn rejects_unknown_cluster_and_bad_address() {
        assert!(DecodeConfig::from_json(r#"{ "cluster": "localnet" }"#).is_err());
        assert!(
            DecodeConfig::from_json(
                r#"{ "extraPrograms": [{ "address": "not-base58!", "kind": "memo" }] }"#
            )
            .is_err()
        );
    }
}
