use std::collections::HashMap;

use actix_web::http::StatusCode;
use cadence::{CountedExt, StatsdClient};

use crate::base85;
use crate::error::{ApiErrorKind, ApiResult};
use crate::extractors::message::RelayMessage;
use crate::extractors::notification_headers::ContentEncoding;
use crate::headers::crypto_key::CryptoKeyHeader;
use crate::routers::RouterError;
use crate::util::{b64_decode_url, InsertOpt};

/// Build the custom data fields of the outbound notification.
///
/// `p` always carries the base-85 encoded message body, `x` the literal
/// route suffix when one was given. For aesgcm content the sender's DH
/// public key and salt are decoded from their headers and re-encoded into
/// `k` and `s`; the receiving app needs all of them to decrypt. `k` and `s`
/// are only ever set together.
pub fn build_message_data(message: &RelayMessage) -> ApiResult<HashMap<&'static str, String>> {
    let mut message_data = HashMap::new();
    message_data.insert("p", base85::encode(&message.data));
    message_data.insert_opt("x", message.route_suffix.clone());

    match message.headers.encoding {
        ContentEncoding::AesGcm => {
            message_data.insert(
                "k",
                encoded_crypto_value(message.headers.crypto_key.as_deref(), "Crypto-Key", "dh")?,
            );
            message_data.insert(
                "s",
                encoded_crypto_value(message.headers.encryption.as_deref(), "Encryption", "salt")?,
            );
        }
    }

    Ok(message_data)
}

/// Extract a base64url sub-field from a compound header and re-encode its
/// bytes with the base-85 codec
fn encoded_crypto_value(header: Option<&str>, header_name: &str, key: &str) -> ApiResult<String> {
    let header = header.ok_or_else(|| {
        ApiErrorKind::MissingCryptoParameter(format!("Missing {header_name} header"))
    })?;
    let header_data = CryptoKeyHeader::parse(header).ok_or_else(|| {
        ApiErrorKind::MissingCryptoParameter(format!("Invalid {header_name} header"))
    })?;
    let value = header_data.get_by_key(key).ok_or_else(|| {
        ApiErrorKind::MissingCryptoParameter(format!("Missing {key} value in {header_name} header"))
    })?;
    let bytes = b64_decode_url(value).map_err(|_| {
        ApiErrorKind::MissingCryptoParameter(format!("Invalid {key} value in {header_name} header"))
    })?;

    Ok(base85::encode(&bytes))
}

/// Check the serialized notification against the configured size limit
pub fn message_size_check(message: &[u8], max_size: usize) -> Result<(), RouterError> {
    if message.len() > max_size {
        Err(RouterError::TooMuchData(message.len() - max_size))
    } else {
        Ok(())
    }
}

pub fn incr_success_metrics(metrics: &StatsdClient) {
    metrics
        .incr_with_tags("notification.bridge.sent")
        .with_tag("platform", "apns")
        .send();
}

pub fn incr_error_metric(metrics: &StatsdClient, reason: &str, status: StatusCode) {
    metrics
        .incr_with_tags("notification.bridge.error")
        .with_tag("platform", "apns")
        .with_tag("reason", reason)
        .with_tag("error", &status.as_u16().to_string())
        .send();
}

/// Common router test code and translation tests
#[cfg(test)]
pub mod tests {
    use super::{build_message_data, message_size_check};
    use crate::error::ApiErrorKind;
    use crate::extractors::message::RelayMessage;
    use crate::extractors::notification_headers::{ContentEncoding, NotificationHeaders, Urgency};
    use crate::routers::RouterError;

    pub const DEVICE_TOKEN: &str = "test-token";

    /// base64url of the bytes 0x01..=0x21 (a 33-byte key-sized blob)
    pub const DH_B64: &str = "AQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyAh";
    /// Base-85 form of the same bytes
    pub const DH_B85: &str = "0rJua1Qkhq2)}4G4gS)W5Ft->6=4P585:Cl9uDpB0x";

    /// base64url of the bytes 0x00..=0x0F (a 16-byte salt)
    pub const SALT_B64: &str = "AAECAwQFBgcICQoLDA0ODw";
    /// Base-85 form of the same bytes
    pub const SALT_B85: &str = "009c61o!#m2NH?C3>iWS";

    /// Base-85 form of the default test body
    pub const BODY_B85: &str = "wO#0#D2N>pwft-2B8$=5wGUD23LP";

    pub fn aesgcm_headers() -> NotificationHeaders {
        NotificationHeaders {
            encoding: ContentEncoding::AesGcm,
            crypto_key: Some(format!("dh={DH_B64}")),
            encryption: Some(format!("salt={SALT_B64}")),
            ttl: None,
            topic: None,
            urgency: Urgency::Normal,
        }
    }

    /// Create a relay message with the given headers
    pub fn make_message(headers: NotificationHeaders) -> RelayMessage {
        RelayMessage {
            device_token: DEVICE_TOKEN.to_string(),
            route_suffix: None,
            data: b"encrypted message body".to_vec(),
            headers,
            timestamp: 100,
        }
    }

    /// An aesgcm message produces `p`, `k` and `s`, bit-exact against the
    /// reference encoding
    #[test]
    fn aesgcm_message_data() {
        let message = make_message(aesgcm_headers());
        let data = build_message_data(&message).unwrap();

        assert_eq!(data.get("p").map(String::as_str), Some(BODY_B85));
        assert_eq!(data.get("k").map(String::as_str), Some(DH_B85));
        assert_eq!(data.get("s").map(String::as_str), Some(SALT_B85));
        assert_eq!(data.get("x"), None);
    }

    /// An empty body still produces a (empty) `p` field
    #[test]
    fn empty_body() {
        let mut message = make_message(aesgcm_headers());
        message.data.clear();
        let data = build_message_data(&message).unwrap();

        assert_eq!(data.get("p").map(String::as_str), Some(""));
    }

    /// The route suffix is carried as literal text, not re-encoded
    #[test]
    fn route_suffix_is_literal() {
        let mut message = make_message(aesgcm_headers());
        message.route_suffix = Some("foo/bar".to_string());
        let data = build_message_data(&message).unwrap();

        assert_eq!(data.get("x").map(String::as_str), Some("foo/bar"));
    }

    /// A missing Crypto-Key header fails, naming the header
    #[test]
    fn missing_crypto_key_header() {
        let mut headers = aesgcm_headers();
        headers.crypto_key = None;
        let result = build_message_data(&make_message(headers));

        assert_crypto_error(result, "Missing Crypto-Key header");
    }

    /// A Crypto-Key header without a dh sub-field fails, naming the key
    #[test]
    fn missing_dh_value() {
        let mut headers = aesgcm_headers();
        headers.crypto_key = Some("keyid=p256dh".to_string());
        let result = build_message_data(&make_message(headers));

        assert_crypto_error(result, "Missing dh value in Crypto-Key header");
    }

    /// A malformed Encryption header (field without `=`) fails as a parse
    /// error
    #[test]
    fn malformed_encryption_header() {
        let mut headers = aesgcm_headers();
        headers.encryption = Some("salt".to_string());
        let result = build_message_data(&make_message(headers));

        assert_crypto_error(result, "Invalid Encryption header");
    }

    /// A sub-field that is not valid base64url fails, naming the key
    #[test]
    fn invalid_salt_value() {
        let mut headers = aesgcm_headers();
        headers.encryption = Some("salt=!!!".to_string());
        let result = build_message_data(&make_message(headers));

        assert_crypto_error(result, "Invalid salt value in Encryption header");
    }

    #[test]
    fn size_check() {
        assert!(message_size_check(&[0; 8], 8).is_ok());
        assert!(matches!(
            message_size_check(&[0; 10], 8),
            Err(RouterError::TooMuchData(2))
        ));
    }

    fn assert_crypto_error<T: std::fmt::Debug>(
        result: crate::error::ApiResult<T>,
        expected: &str,
    ) {
        match result.unwrap_err().kind {
            ApiErrorKind::MissingCryptoParameter(message) => assert_eq!(message, expected),
            kind => panic!("Expected a crypto parameter error, got {kind:?}"),
        }
    }
}
