use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};

use http::Method;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use url::Url;

use crate::params::parse_query;
use crate::signature::{percent_encode, HmacSha1, SignatureAlgorithm};
use crate::{
    SecretsProvider, OAUTH_CALLBACK_KEY, OAUTH_CONSUMER_KEY, OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY,
    OAUTH_SIGNATURE_METHOD_KEY, OAUTH_TIMESTAMP_KEY, OAUTH_TOKEN_KEY, OAUTH_VERIFIER_KEY,
    OAUTH_VERSION_KEY, REALM_KEY,
};

const NONCE_LEN: usize = 32;

/// Computes `Authorization: OAuth …` header values for outgoing requests.
#[derive(Debug, Clone)]
pub struct Signer<'a, TSecretsProvider, TAlgorithm>
where
    TSecretsProvider: SecretsProvider,
    TAlgorithm: SignatureAlgorithm + Clone,
{
    secrets: &'a TSecretsProvider,
    parameters: OAuthParameters<'a, TAlgorithm>,
}

impl<'a, TSecretsProvider, TAlgorithm> Signer<'a, TSecretsProvider, TAlgorithm>
where
    TSecretsProvider: SecretsProvider,
    TAlgorithm: SignatureAlgorithm + Clone,
{
    pub fn new(
        secrets: &'a TSecretsProvider,
        parameters: OAuthParameters<'a, TAlgorithm>,
    ) -> Self {
        Signer {
            secrets,
            parameters,
        }
    }

    /// Signs `method url` together with the urlencoded `body` payload and
    /// renders the complete authorization header value.
    ///
    /// The URL's own query string and the body parameters all enter the
    /// canonical parameter list alongside the protocol parameters; the
    /// realm, when present, is appended to the header but never signed.
    pub fn authorization_header(&self, method: &Method, url: &Url, body: &str) -> String {
        let (consumer_key, consumer_secret) = self.secrets.get_consumer_key_pair();
        let (token, token_secret) = self.secrets.get_token_option_pair();

        let nonce = match &self.parameters.nonce {
            Some(nonce) => nonce.to_string(),
            None => generate_nonce(),
        };
        let timestamp = self.parameters.timestamp.unwrap_or_else(unix_timestamp);

        let mut protocol: Vec<(&str, String)> = vec![
            (OAUTH_CONSUMER_KEY, consumer_key.to_string()),
            (OAUTH_NONCE_KEY, nonce),
            (
                OAUTH_SIGNATURE_METHOD_KEY,
                self.parameters.algorithm.name().to_string(),
            ),
            (OAUTH_TIMESTAMP_KEY, timestamp.to_string()),
        ];
        if let Some(callback) = &self.parameters.callback {
            protocol.push((OAUTH_CALLBACK_KEY, callback.to_string()));
        }
        if let Some(token) = token {
            protocol.push((OAUTH_TOKEN_KEY, token.to_string()));
        }
        if let Some(verifier) = &self.parameters.verifier {
            protocol.push((OAUTH_VERIFIER_KEY, verifier.to_string()));
        }
        if self.parameters.version {
            protocol.push((OAUTH_VERSION_KEY, "1.0".to_string()));
        }

        // Everything signed: body parameters plus the protocol set. The
        // URL query joins inside the base-string builder.
        let mut signed = parse_query(body);
        for (key, value) in &protocol {
            signed.append(*key, value.clone());
        }

        let base_string =
            self.parameters
                .algorithm
                .compute_base_string(method.as_str(), url, &signed);
        let signature = self
            .parameters
            .algorithm
            .sign(&base_string, consumer_secret, token_secret);
        protocol.push((OAUTH_SIGNATURE_KEY, signature));
        protocol.sort();

        let rendered = protocol
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", key, percent_encode(value)))
            .collect::<Vec<_>>()
            .join(",");

        match &self.parameters.realm {
            // OAuth oauth_...,realm="realm"
            Some(realm) => format!("OAuth {},{}=\"{}\"", rendered, REALM_KEY, realm),
            // OAuth oauth_...
            None => format!("OAuth {}", rendered),
        }
    }
}

fn generate_nonce() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Per-request OAuth protocol parameters.
///
/// Nonce and timestamp are generated on demand when left unset; pin them
/// only for reproducible signatures (tests, debugging).
#[derive(Debug, Clone)]
pub struct OAuthParameters<'a, TAlgorithm>
where
    TAlgorithm: SignatureAlgorithm + Clone,
{
    pub(crate) callback: Option<Cow<'a, str>>,
    pub(crate) nonce: Option<Cow<'a, str>>,
    pub(crate) realm: Option<Cow<'a, str>>,
    pub(crate) algorithm: TAlgorithm,
    pub(crate) timestamp: Option<u64>,
    pub(crate) verifier: Option<Cow<'a, str>>,
    pub(crate) version: bool,
}

impl Default for OAuthParameters<'static, HmacSha1> {
    fn default() -> Self {
        OAuthParameters {
            callback: None,
            nonce: None,
            realm: None,
            algorithm: HmacSha1,
            timestamp: None,
            verifier: None,
            version: false,
        }
    }
}

impl<'a> OAuthParameters<'a, HmacSha1> {
    pub fn new() -> Self {
        Default::default()
    }

    /// set the oauth_callback value
    pub fn callback<T>(self, callback: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            callback: Some(callback.into()),
            ..self
        }
    }

    /// set the oauth_nonce value
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// set the realm value
    pub fn realm<T>(self, realm: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            realm: Some(realm.into()),
            ..self
        }
    }

    /// set the oauth_timestamp value
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// set the oauth_verifier value
    pub fn verifier<T>(self, verifier: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            verifier: Some(verifier.into()),
            ..self
        }
    }

    /// set the oauth_version value (boolean)
    ///
    /// # Note
    /// When the version has value `true`, oauth_version will be set with
    /// "1.0". Otherwise, oauth_version will not be included in your
    /// request. In oauth1, oauth_version value must be "1.0" or not
    /// specified.
    pub fn version<T>(self, version: T) -> Self
    where
        T: Into<bool>,
    {
        OAuthParameters {
            version: version.into(),
            ..self
        }
    }
}
