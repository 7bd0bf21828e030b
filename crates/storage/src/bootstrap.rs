//! Reference-data bootstrap

use tracing::info;

use common::{Result, Security};

use crate::security_store::SecurityStore;

/// Add every security from `source` to `store`.
///
/// Stops at the first failure (typically `DuplicateKey`); securities added
/// before it remain in the store. Returns the number added.
pub fn load_securities(
    source: impl IntoIterator<Item = Security>,
    store: &SecurityStore,
) -> Result<usize> {
    let mut loaded = 0;
    for security in source {
        store.add(security)?;
        loaded += 1;
    }
    info!(count = loaded, "Securities loaded");
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Error, SecurityClass};

    fn security(id: &str, symbol: &str) -> Security {
        Security::new(id, symbol, SecurityClass::Common, 0.0, 0.0, 100.0).unwrap()
    }

    #[test]
    fn test_load_securities() {
        let store = SecurityStore::new();
        let loaded =
            load_securities(vec![security("STK1", "TEA"), security("STK2", "POP")], &store).unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_stops_loading() {
        let store = SecurityStore::new();
        let result = load_securities(
            vec![security("STK1", "TEA"), security("STK1", "TEA"), security("STK2", "POP")],
            &store,
        );
        assert!(matches!(result, Err(Error::DuplicateKey { .. })));
        assert_eq!(store.len(), 1);
    }
}
