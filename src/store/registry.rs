//! Windows registry key-value store.
//!
//! Keys are opened below `HKEY_LOCAL_MACHINE`. Writing requires an
//! elevated process.

use std::io;

use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_SET_VALUE};
use winreg::RegKey;

use crate::store::{Access, KeyValueStore, StoreKey};

/// Registry-backed store rooted at `HKEY_LOCAL_MACHINE`.
#[derive(Debug, Default)]
pub struct RegistryStore;

impl RegistryStore {
    /// Create a registry store.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl KeyValueStore for RegistryStore {
    fn open(&self, path: &str, access: Access) -> io::Result<Box<dyn StoreKey + '_>> {
        let flags = match access {
            Access::Read => KEY_QUERY_VALUE,
            Access::Write => KEY_SET_VALUE,
        };
        let key = RegKey::predef(HKEY_LOCAL_MACHINE).open_subkey_with_flags(path, flags)?;
        Ok(Box::new(RegistryKey { key }))
    }

    fn describe(&self) -> String {
        "registry HKEY_LOCAL_MACHINE".to_string()
    }
}

struct RegistryKey {
    key: RegKey,
}

impl StoreKey for RegistryKey {
    fn get_string(&self, name: &str) -> io::Result<String> {
        self.key.get_value::<String, _>(name)
    }

    fn set_string(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.key.set_value(name, &value)
    }
}
