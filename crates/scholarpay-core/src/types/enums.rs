/*
[INPUT]:  Ledger network identifiers
[OUTPUT]: Typed network enum with passphrases and network ids
[POS]:    Data layer - type definitions for auth and ledger communication
[UPDATE]: When supporting additional ledger networks
*/

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Network passphrase for the public network
pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";
/// Network passphrase for the test network
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Network {
    #[default]
    Testnet,
    Public,
}

impl Network {
    pub fn passphrase(&self) -> &'static str {
        match self {
            Network::Testnet => TESTNET_PASSPHRASE,
            Network::Public => PUBLIC_NETWORK_PASSPHRASE,
        }
    }

    /// SHA-256 of the passphrase, mixed into every transaction hash
    pub fn network_id(&self) -> [u8; 32] {
        Sha256::digest(self.passphrase().as_bytes()).into()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "TESTNET",
            Network::Public => "PUBLIC",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
