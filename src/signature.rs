use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;
use url::Url;

use crate::params::{parse_query, ParamSet, ParamValue};

type HmacSha1Digest = Hmac<Sha1>;

/// Characters escaped when building signing material.
///
/// OAuth1 mandates the strict RFC3986 unreserved set: letters, digits,
/// `-`, `.`, `_` and `~` pass through, everything else (including `/`
/// and `:`) is escaped. Generic form-urlencoding diverges on exactly
/// those reserved characters and would break signature verification.
const SIGNING_RESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes `input` with the OAuth1 signing character set.
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, SIGNING_RESERVED).to_string()
}

/// A pluggable OAuth1 signature strategy.
///
/// The generic signing flow holds one of these as an injected dependency
/// and hands it the request material; the strategy owns both the
/// canonical base-string construction and the digest over it.
pub trait SignatureAlgorithm {
    /// Protocol name advertised as `oauth_signature_method`.
    fn name(&self) -> &'static str;

    /// Builds the canonical base string for `method` against `url`,
    /// signing the URL's own query parameters merged with `parameters`
    /// (protocol and body parameters supplied by the caller).
    ///
    /// This is a pure function of its inputs; supplying the same
    /// parameters in any order yields the same string.
    fn compute_base_string(&self, method: &str, url: &Url, parameters: &ParamSet) -> String;

    /// Produces the encoded signature over `base_string`.
    fn sign(&self, base_string: &str, consumer_secret: &str, token_secret: Option<&str>)
        -> String;
}

/// HMAC-SHA1, the only method Etsy accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha1;

impl SignatureAlgorithm for HmacSha1 {
    fn name(&self) -> &'static str {
        "HMAC-SHA1"
    }

    fn compute_base_string(&self, method: &str, url: &Url, parameters: &ParamSet) -> String {
        let mut base = percent_encode(method);
        base.push('&');

        // Scheme, host and path only. The raw query never appears here;
        // its parameters re-enter through the canonical parameter list.
        let base_url = format!(
            "{}://{}{}",
            url.scheme(),
            url.host_str().unwrap_or_default(),
            url.path()
        );
        base.push_str(&percent_encode(&base_url));
        base.push('&');

        let mut merged = parse_query(url.query().unwrap_or(""));
        merged.extend(parameters.clone());

        let mut pairs = Vec::new();
        for (key, value) in merged.iter() {
            match value {
                ParamValue::Single(single) => {
                    pairs.push((percent_encode(key), percent_encode(single)));
                }
                ParamValue::Many(values) => {
                    for single in values {
                        pairs.push((percent_encode(key), percent_encode(single)));
                    }
                }
            }
        }
        // Keys compare first; encoded values break ties between repeats.
        pairs.sort();

        let parameter_string = pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");
        base.push_str(&percent_encode(&parameter_string));

        base
    }

    fn sign(
        &self,
        base_string: &str,
        consumer_secret: &str,
        token_secret: Option<&str>,
    ) -> String {
        let key = format!(
            "{}&{}",
            percent_encode(consumer_secret),
            percent_encode(token_secret.unwrap_or(""))
        );
        // Hmac accepts any key length
        let mut mac = HmacSha1Digest::new_from_slice(key.as_bytes()).expect("infallible");
        mac.update(base_string.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}
