//! PKCS#11 mechanism identifiers known to the harness
//!
//! Values are the `CKM_*` constants from the PKCS#11 v2.40 headers.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use streamcheck_api::{KeyType, MechanismId};

use crate::symmetric::block_size;

pub const CKM_DES_KEY_GEN: MechanismId = MechanismId::new(0x0000_0120);
pub const CKM_DES_ECB: MechanismId = MechanismId::new(0x0000_0121);
pub const CKM_DES_CBC: MechanismId = MechanismId::new(0x0000_0122);
pub const CKM_DES_CBC_PAD: MechanismId = MechanismId::new(0x0000_0125);

pub const CKM_DES3_KEY_GEN: MechanismId = MechanismId::new(0x0000_0131);
pub const CKM_DES3_ECB: MechanismId = MechanismId::new(0x0000_0132);
pub const CKM_DES3_CBC: MechanismId = MechanismId::new(0x0000_0133);
pub const CKM_DES3_CBC_PAD: MechanismId = MechanismId::new(0x0000_0136);

pub const CKM_AES_KEY_GEN: MechanismId = MechanismId::new(0x0000_1080);
pub const CKM_AES_ECB: MechanismId = MechanismId::new(0x0000_1081);
pub const CKM_AES_CBC: MechanismId = MechanismId::new(0x0000_1082);
pub const CKM_AES_CBC_PAD: MechanismId = MechanismId::new(0x0000_1085);

/// How a mechanism uses its block cipher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    /// Key generation, not a cipher
    KeyGen,
    Ecb,
    Cbc,
    /// CBC with PKCS#7 padding applied on final
    CbcPad,
}

impl CipherMode {
    /// Whether the mechanism needs an IV parameter
    pub fn needs_iv(self) -> bool {
        matches!(self, Self::Cbc | Self::CbcPad)
    }

    pub fn is_padded(self) -> bool {
        matches!(self, Self::CbcPad)
    }
}

/// Static description of one mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MechanismInfo {
    pub id: MechanismId,
    pub name: &'static str,
    pub key_type: KeyType,
    pub mode: CipherMode,
}

impl MechanismInfo {
    pub fn block_size(&self) -> usize {
        block_size(self.key_type)
    }

    /// IV length the mechanism expects (zero for ECB and key generation)
    pub fn iv_len(&self) -> usize {
        if self.mode.needs_iv() {
            self.block_size()
        } else {
            0
        }
    }

    pub fn is_cipher(&self) -> bool {
        self.mode != CipherMode::KeyGen
    }
}

const fn info(id: MechanismId, name: &'static str, key_type: KeyType, mode: CipherMode) -> MechanismInfo {
    MechanismInfo {
        id,
        name,
        key_type,
        mode,
    }
}

/// Every mechanism the harness and the soft token understand
pub const MECHANISMS: &[MechanismInfo] = &[
    info(CKM_DES_KEY_GEN, "CKM_DES_KEY_GEN", KeyType::Des, CipherMode::KeyGen),
    info(CKM_DES_ECB, "CKM_DES_ECB", KeyType::Des, CipherMode::Ecb),
    info(CKM_DES_CBC, "CKM_DES_CBC", KeyType::Des, CipherMode::Cbc),
    info(CKM_DES_CBC_PAD, "CKM_DES_CBC_PAD", KeyType::Des, CipherMode::CbcPad),
    info(CKM_DES3_KEY_GEN, "CKM_DES3_KEY_GEN", KeyType::Des3, CipherMode::KeyGen),
    info(CKM_DES3_ECB, "CKM_DES3_ECB", KeyType::Des3, CipherMode::Ecb),
    info(CKM_DES3_CBC, "CKM_DES3_CBC", KeyType::Des3, CipherMode::Cbc),
    info(CKM_DES3_CBC_PAD, "CKM_DES3_CBC_PAD", KeyType::Des3, CipherMode::CbcPad),
    info(CKM_AES_KEY_GEN, "CKM_AES_KEY_GEN", KeyType::Aes, CipherMode::KeyGen),
    info(CKM_AES_ECB, "CKM_AES_ECB", KeyType::Aes, CipherMode::Ecb),
    info(CKM_AES_CBC, "CKM_AES_CBC", KeyType::Aes, CipherMode::Cbc),
    info(CKM_AES_CBC_PAD, "CKM_AES_CBC_PAD", KeyType::Aes, CipherMode::CbcPad),
];

static BY_ID: Lazy<HashMap<MechanismId, &'static MechanismInfo>> =
    Lazy::new(|| MECHANISMS.iter().map(|m| (m.id, m)).collect());

static BY_NAME: Lazy<HashMap<&'static str, &'static MechanismInfo>> =
    Lazy::new(|| MECHANISMS.iter().map(|m| (m.name, m)).collect());

/// Look a mechanism up by id
pub fn lookup(id: MechanismId) -> Option<&'static MechanismInfo> {
    BY_ID.get(&id).copied()
}

/// Look a mechanism up by its `CKM_*` name
pub fn by_name(name: &str) -> Option<&'static MechanismInfo> {
    BY_NAME.get(name.trim()).copied()
}

/// Printable name for reports; unknown ids print as `UNKNOWN`
pub fn name(id: MechanismId) -> &'static str {
    lookup(id).map_or("UNKNOWN", |m| m.name)
}

/// The key generation mechanism for a key type
pub fn keygen_for(key_type: KeyType) -> MechanismId {
    match key_type {
        KeyType::Des => CKM_DES_KEY_GEN,
        KeyType::Des3 => CKM_DES3_KEY_GEN,
        KeyType::Aes => CKM_AES_KEY_GEN,
    }
}
