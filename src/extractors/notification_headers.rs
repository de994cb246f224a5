use std::str::FromStr;

use actix_web::HttpRequest;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ApiErrorKind, ApiResult};
use crate::headers::util::{get_header, get_owned_header};

lazy_static! {
    static ref STRIP_PADDING: Regex =
        Regex::new(r"(?P<head>[0-9A-Za-z\-_]+)=+(?P<tail>[,;]|$)").unwrap();
}

/// The supported Web Push content encoding schemes
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentEncoding {
    /// draft-ietf-webpush-encryption-04: the sender's DH public key and salt
    /// travel in the Crypto-Key and Encryption headers
    AesGcm,
    // aes128gcm (draft 06+) carries its parameters in the payload header
    // block instead. The receiving client has no decoder for it yet, so it
    // is rejected as unsupported rather than listed here.
}

impl FromStr for ContentEncoding {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aesgcm" => Ok(ContentEncoding::AesGcm),
            _ => Err(()),
        }
    }
}

/// Web Push message urgency (RFC 8030 section 5.3)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Urgency {
    VeryLow,
    Low,
    Normal,
    High,
}

impl From<&str> for Urgency {
    fn from(string: &str) -> Urgency {
        match string {
            "very-low" => Urgency::VeryLow,
            "low" => Urgency::Low,
            "high" => Urgency::High,
            _ => Urgency::Normal,
        }
    }
}

/// Extractor and validator for the Web Push notification headers
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NotificationHeaders {
    pub encoding: ContentEncoding,

    /// Raw compound header values, quotes and base64 padding stripped. The
    /// individual sub-fields are pulled out during translation.
    pub crypto_key: Option<String>,
    pub encryption: Option<String>,

    pub ttl: Option<u64>,
    pub topic: Option<String>,
    pub urgency: Urgency,
}

impl NotificationHeaders {
    /// Extract the notification headers from a request
    pub fn from_request(req: &HttpRequest) -> ApiResult<Self> {
        let encoding = get_header(req, "content-encoding")
            .unwrap_or_default()
            .parse::<ContentEncoding>()
            .map_err(|_| {
                ApiErrorKind::UnsupportedEncoding(
                    get_owned_header(req, "content-encoding").unwrap_or_default(),
                )
            })?;

        // A TTL that does not parse as a non-negative integer sets no
        // expiration; that is not an error
        let ttl = get_header(req, "ttl").and_then(|ttl| ttl.parse::<u64>().ok());
        let topic = get_owned_header(req, "topic").filter(|topic| !topic.is_empty());
        let urgency = get_header(req, "urgency")
            .map(Urgency::from)
            .unwrap_or(Urgency::Normal);

        Ok(NotificationHeaders {
            encoding,
            crypto_key: get_owned_header(req, "crypto-key").map(Self::strip_header),
            encryption: get_owned_header(req, "encryption").map(Self::strip_header),
            ttl,
            topic,
            urgency,
        })
    }

    /// Remove Base64 padding and double-quotes
    fn strip_header(header: String) -> String {
        let header = header.replace('"', "");
        STRIP_PADDING.replace_all(&header, "$head$tail").to_string()
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::{ContentEncoding, NotificationHeaders, Urgency};
    use crate::error::{ApiErrorKind, ApiResult};

    /// Assert that a result is an UnsupportedEncoding error carrying the
    /// given header value
    fn assert_unsupported(result: ApiResult<NotificationHeaders>, expected_value: &str) {
        assert!(result.is_err());
        match result.unwrap_err().kind {
            ApiErrorKind::UnsupportedEncoding(value) => assert_eq!(value, expected_value),
            kind => panic!("Expected an unsupported encoding error, got {kind:?}"),
        };
    }

    /// Valid aesgcm headers are captured as-is
    #[test]
    fn valid_aesgcm() {
        let req = TestRequest::post()
            .insert_header(("Content-Encoding", "aesgcm"))
            .insert_header(("Encryption", "salt=foo"))
            .insert_header(("Crypto-Key", "dh=bar"))
            .to_http_request();
        let result = NotificationHeaders::from_request(&req);

        assert!(result.is_ok());
        assert_eq!(
            result.unwrap(),
            NotificationHeaders {
                encoding: ContentEncoding::AesGcm,
                crypto_key: Some("dh=bar".to_string()),
                encryption: Some("salt=foo".to_string()),
                ttl: None,
                topic: None,
                urgency: Urgency::Normal,
            }
        );
    }

    /// aes128gcm is deliberately unsupported and rejected up front
    #[test]
    fn aes128gcm_is_unsupported() {
        let req = TestRequest::post()
            .insert_header(("Content-Encoding", "aes128gcm"))
            .to_http_request();

        assert_unsupported(NotificationHeaders::from_request(&req), "aes128gcm");
    }

    /// A missing Content-Encoding header is also unsupported
    #[test]
    fn missing_content_encoding() {
        let req = TestRequest::post().to_http_request();

        assert_unsupported(NotificationHeaders::from_request(&req), "");
    }

    /// A numeric TTL is captured
    #[test]
    fn valid_ttl() {
        let req = TestRequest::post()
            .insert_header(("Content-Encoding", "aesgcm"))
            .insert_header(("TTL", "60"))
            .to_http_request();
        let result = NotificationHeaders::from_request(&req).unwrap();

        assert_eq!(result.ttl, Some(60));
    }

    /// Negative or non-numeric TTL values set no expiration
    #[test]
    fn unusable_ttl_values() {
        for ttl in ["-1", "forever", ""] {
            let req = TestRequest::post()
                .insert_header(("Content-Encoding", "aesgcm"))
                .insert_header(("TTL", ttl))
                .to_http_request();
            let result = NotificationHeaders::from_request(&req).unwrap();

            assert_eq!(result.ttl, None, "TTL = {ttl:?}");
        }
    }

    /// A non-empty topic is captured verbatim, an empty one is dropped
    #[test]
    fn topic_header() {
        let req = TestRequest::post()
            .insert_header(("Content-Encoding", "aesgcm"))
            .insert_header(("Topic", "some-topic"))
            .to_http_request();
        assert_eq!(
            NotificationHeaders::from_request(&req).unwrap().topic,
            Some("some-topic".to_string())
        );

        let req = TestRequest::post()
            .insert_header(("Content-Encoding", "aesgcm"))
            .insert_header(("Topic", ""))
            .to_http_request();
        assert_eq!(NotificationHeaders::from_request(&req).unwrap().topic, None);
    }

    /// Urgency parses the RFC values; unknown and absent values are Normal
    #[test]
    fn urgency_header() {
        let cases = [
            (Some("very-low"), Urgency::VeryLow),
            (Some("low"), Urgency::Low),
            (Some("normal"), Urgency::Normal),
            (Some("high"), Urgency::High),
            (Some("emergency"), Urgency::Normal),
            (None, Urgency::Normal),
        ];

        for (value, expected) in cases {
            let mut req = TestRequest::post().insert_header(("Content-Encoding", "aesgcm"));
            if let Some(value) = value {
                req = req.insert_header(("Urgency", value));
            }
            let result = NotificationHeaders::from_request(&req.to_http_request()).unwrap();

            assert_eq!(result.urgency, expected, "Urgency = {value:?}");
        }
    }

    /// The encryption and crypto-key headers are stripped of Base64 padding
    /// and double-quotes
    #[test]
    fn strip_headers() {
        let req = TestRequest::post()
            .insert_header(("Content-Encoding", "aesgcm"))
            .insert_header(("Encryption", "salt=\"foo\""))
            .insert_header(("Crypto-Key", "keyid=\"p256dh\";dh=\"deadbeef==\""))
            .to_http_request();
        let result = NotificationHeaders::from_request(&req).unwrap();

        assert_eq!(result.encryption, Some("salt=foo".to_string()));
        assert_eq!(result.crypto_key, Some("keyid=p256dh;dh=deadbeef".to_string()));
    }
}
