//! Small utilities shared across the relay

use std::collections::HashMap;
use std::hash::Hash;

use base64::Engine;
use chrono::Utc;

/// Get the time since the UNIX epoch in seconds
pub fn sec_since_epoch() -> u64 {
    Utc::now().timestamp() as u64
}

/// Decode a URL-safe base64 string, tolerating trailing padding
pub fn b64_decode_url(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(input.trim_end_matches('='))
}

/// Convenience trait for adding an optional value to a map
pub trait InsertOpt<K, V> {
    /// Insert the value into the map if it is `Some`
    fn insert_opt(&mut self, key: K, value: Option<V>);
}

impl<K: Eq + Hash, V> InsertOpt<K, V> for HashMap<K, V> {
    fn insert_opt(&mut self, key: K, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::b64_decode_url;

    #[test]
    fn decodes_with_and_without_padding() {
        assert_eq!(b64_decode_url("AAECAw").unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(b64_decode_url("AAECAw==").unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(b64_decode_url("!!!").is_err());
    }
}
