use std::collections::HashMap;

use crate::headers::util::split_key_value;

/// Parses compound header values of the form `key1=value1;key2=value2`
/// (Crypto-Key, Encryption and friends, described by
/// http://tools.ietf.org/html/draft-ietf-httpbis-encryption-encoding-00#section-4)
pub struct CryptoKeyHeader {
    items: HashMap<String, String>,
}

impl CryptoKeyHeader {
    /// Parse a compound header value. Empty fields produced by leading,
    /// trailing or doubled `;` are skipped; a non-empty field without `=` is
    /// a parse error.
    pub fn parse(header: &str) -> Option<Self> {
        let mut items = HashMap::new();

        for item_str in header.split(';') {
            if item_str.trim().is_empty() {
                continue;
            }

            let (key, value) = split_key_value(item_str)?;

            items.insert(
                key.trim().to_owned(),
                value.trim_matches(&[' ', '"'] as &[char]).to_owned(),
            );
        }

        Some(Self { items })
    }

    /// Get the value of the item with the given key
    pub fn get_by_key(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }
}
