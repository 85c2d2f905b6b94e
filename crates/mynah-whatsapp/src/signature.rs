// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook delivery signature verification.
//!
//! Meta signs every delivery with `X-Hub-Signature-256: sha256=<hex>`,
//! an HMAC-SHA256 of the raw request body keyed by the app secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Checks a delivery signature against the app secret.
///
/// The digest comparison runs in constant time inside the hmac verifier.
/// Malformed headers return false rather than erroring; the caller
/// treats any failure as an unauthenticated delivery.
pub fn verify_signature(app_secret: &str, body: &[u8], header_value: &str) -> bool {
    let Some(hex_digest) = header_value.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Builds the header value Meta would send for this body.
#[cfg(test)]
pub(crate) fn signature_header(app_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Digest produced out of band for secret "shhh-app-secret".
    const BODY: &[u8] = br#"{"object":"whatsapp_business_account","entry":[]}"#;
    const GOOD: &str = "sha256=91a442ee917695dd752a2199b112fc9d1999f61a60eeabf13b6375cd0239a423";

    #[test]
    fn accepts_a_known_good_signature() {
        assert!(verify_signature("shhh-app-secret", BODY, GOOD));
    }

    #[test]
    fn rejects_a_tampered_body() {
        assert!(!verify_signature("shhh-app-secret", b"{}", GOOD));
    }

    #[test]
    fn rejects_the_wrong_secret() {
        assert!(!verify_signature("other-secret", BODY, GOOD));
    }

    #[test]
    fn rejects_a_header_without_the_scheme_prefix() {
        assert!(!verify_signature(
            "shhh-app-secret",
            BODY,
            GOOD.trim_start_matches("sha256=")
        ));
    }

    #[test]
    fn rejects_non_hex_digests() {
        assert!(!verify_signature("shhh-app-secret", BODY, "sha256=zzzz"));
    }

    #[test]
    fn header_builder_matches_a_reference_digest() {
        assert_eq!(
            signature_header("key", b"payload"),
            "sha256=5d98b45c90a207fa998ce639fea6f02ecc8cc3f36fef81d694fb856b4d0a28ca"
        );
        assert!(verify_signature(
            "key",
            b"payload",
            &signature_header("key", b"payload")
        ));
    }
}
