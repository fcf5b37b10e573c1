//! First-run onboarding of the node's own configuration into the store.

use revstore_store::{Datastore, Object, StoreResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::NodeConfig;

/// Well-known identifier of the stored node configuration.
pub const CONFIG_ID: &str = "config";
pub const CONFIG_ENV: &str = "self";
pub const CONFIG_TYPE: &str = "config";

/// Node configuration as persisted in the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNodeConfig {
    #[serde(rename = "self")]
    pub node: StoredSelf,
    pub network: StoredNetwork,
    pub neighbours: Vec<StoredNeighbour>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSelf {
    pub name: String,
    pub protocol: String,
    pub url: String,
    pub port: String,
    pub api_port: String,
    /// Left empty on onboarding; key generation lives outside this crate.
    #[serde(default)]
    pub identity: StoredPrivateIdentity,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPrivateIdentity {
    #[serde(rename = "type")]
    pub kind: String,
    pub private_key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNetwork {
    pub consensus_threshold: u32,
    pub consensus: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNeighbour {
    pub name: String,
    pub protocol: String,
    pub url: String,
    pub port: String,
    pub identity: StoredIdentity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIdentity {
    #[serde(rename = "type")]
    pub kind: String,
    pub public_key: String,
}

impl From<&NodeConfig> for StoredNodeConfig {
    fn from(config: &NodeConfig) -> Self {
        Self {
            node: StoredSelf {
                name: config.me.name.clone(),
                protocol: config.me.protocol.clone(),
                url: config.me.url.clone(),
                port: config.me.port.clone(),
                api_port: config.me.api_port.clone(),
                identity: StoredPrivateIdentity::default(),
            },
            network: StoredNetwork {
                consensus_threshold: config.network.consensus_threshold,
                consensus: config.network.consensus.clone(),
            },
            neighbours: config
                .nearest_neighbours
                .iter()
                .map(|n| StoredNeighbour {
                    name: n.name.clone(),
                    protocol: n.protocol.clone(),
                    url: n.url.clone(),
                    port: n.port.clone(),
                    identity: StoredIdentity {
                        kind: n.identity.kind.clone(),
                        public_key: n.identity.public_key.clone(),
                    },
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BootstrapOutcome {
    /// No stored config existed; the file config was written as revision 1.
    Onboarded(Object<StoredNodeConfig>),
    /// A stored config was found and left untouched.
    Existing(Object<StoredNodeConfig>),
}

impl BootstrapOutcome {
    pub fn object(&self) -> &Object<StoredNodeConfig> {
        match self {
            Self::Onboarded(object) | Self::Existing(object) => object,
        }
    }
}

/// Make sure the store holds the node's configuration.
///
/// The stored copy wins over the file once it exists.
pub fn bootstrap<D>(store: &D, config: &NodeConfig) -> StoreResult<BootstrapOutcome>
where
    D: Datastore<StoredNodeConfig> + ?Sized,
{
    match store.read(CONFIG_ID) {
        Ok(existing) => {
            info!(revision = %existing.revision, "config already exists");
            Ok(BootstrapOutcome::Existing(existing))
        }
        Err(e) if e.is_not_found() => {
            let object = Object::new(StoredNodeConfig::from(config))
                .with_identifier(CONFIG_ID)
                .in_environment(CONFIG_ENV)
                .of_type(CONFIG_TYPE);
            let written = store.write(CONFIG_ID, object)?;
            info!(revision = %written.revision, node = %config.me.name, "config onboarded");
            Ok(BootstrapOutcome::Onboarded(written))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IdentityConfig, NeighbourConfig};
    use revstore_engine::InMemoryEngine;
    use revstore_store::{ObjectStore, StoreError, ALL_TYPES};
    use std::sync::Arc;

    fn config_with_neighbour() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.nearest_neighbours.push(NeighbourConfig {
            name: "node2".into(),
            protocol: "http".into(),
            url: "10.0.0.2".into(),
            port: "7000".into(),
            identity: IdentityConfig {
                kind: "rsa".into(),
                public_key: "PUBKEY".into(),
            },
        });
        config
    }

    #[test]
    fn first_run_onboards() {
        let store: ObjectStore<StoredNodeConfig, _> =
            ObjectStore::new(Arc::new(InMemoryEngine::new()));
        let config = config_with_neighbour();

        let outcome = bootstrap(&store, &config).unwrap();
        let BootstrapOutcome::Onboarded(object) = outcome else {
            panic!("expected onboarding");
        };
        assert_eq!(object.identifier, CONFIG_ID);
        assert_eq!(object.environment, CONFIG_ENV);
        assert_eq!(object.kind, CONFIG_TYPE);
        assert!(object.revision.starts_with("1-"));
        assert_eq!(object.payload.neighbours.len(), 1);
        assert_eq!(object.payload.node.name, "node1");

        assert_eq!(store.read_all(CONFIG_ENV, CONFIG_TYPE).unwrap(), vec![CONFIG_ID]);
    }

    #[test]
    fn second_run_keeps_stored_config() {
        let store: ObjectStore<StoredNodeConfig, _> =
            ObjectStore::new(Arc::new(InMemoryEngine::new()));
        let first = bootstrap(&store, &NodeConfig::default()).unwrap();

        let mut changed = NodeConfig::default();
        changed.me.name = "renamed".into();
        let second = bootstrap(&store, &changed).unwrap();

        assert!(matches!(second, BootstrapOutcome::Existing(_)));
        assert_eq!(second.object(), first.object());
        assert_eq!(second.object().payload.node.name, "node1");
        assert_eq!(store.read_all(CONFIG_ENV, ALL_TYPES).unwrap().len(), 1);
    }

    #[test]
    fn undecodable_config_propagates() {
        let engine = Arc::new(InMemoryEngine::new());
        engine.insert_raw(CONFIG_ID, "garbage");
        let store: ObjectStore<StoredNodeConfig, _> = ObjectStore::new(engine);

        let err = bootstrap(&store, &NodeConfig::default()).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn existing_config_keeps_private_identity() {
        let engine = Arc::new(InMemoryEngine::new());
        engine.insert_raw(
            CONFIG_ID,
            r#"{
                "uuid": "config",
                "_rev": "1-aa",
                "_history": ["1-aa"],
                "data": {
                    "self": {
                        "name": "n",
                        "protocol": "http",
                        "url": "u",
                        "port": "1",
                        "apiPort": "2",
                        "identity": {"type": "rsa", "privateKey": "PEM"}
                    },
                    "network": {"consensusThreshold": 2, "consensus": "majority"},
                    "neighbours": []
                },
                "_env": "self",
                "_type": "config"
            }"#,
        );
        let store: ObjectStore<StoredNodeConfig, _> = ObjectStore::new(engine);

        let outcome = bootstrap(&store, &NodeConfig::default()).unwrap();
        let BootstrapOutcome::Existing(object) = outcome else {
            panic!("expected the stored config");
        };
        assert_eq!(object.payload.node.identity.kind, "rsa");
        assert_eq!(object.payload.node.identity.private_key, "PEM");

        let value = serde_json::to_value(&object.payload).unwrap();
        assert_eq!(value["self"]["identity"]["privateKey"], "PEM");
    }

    #[test]
    fn missing_identity_decodes_as_empty() {
        let raw = r#"{"name":"n","protocol":"http","url":"u","port":"1","apiPort":"2"}"#;
        let node: StoredSelf = serde_json::from_str(raw).unwrap();
        assert_eq!(node.identity, StoredPrivateIdentity::default());
    }

    #[test]
    fn stored_payload_uses_camel_case() {
        let stored = StoredNodeConfig::from(&config_with_neighbour());
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["self"]["apiPort"], "7001");
        assert_eq!(value["network"]["consensusThreshold"], 1);
        assert_eq!(value["neighbours"][0]["identity"]["publicKey"], "PUBKEY");
        assert_eq!(value["neighbours"][0]["identity"]["type"], "rsa");
    }
}
