/*!
etsy-oauth1: Etsy's OAuth 1.0a handshake on top of [reqwest](https://crates.io/crates/reqwest),
with the HMAC-SHA1 request signing implemented in-crate.

# Overview

Etsy's v2 API authenticates with OAuth 1.0a. This library provides the
canonical signature-base-string construction and HMAC-SHA1 signing, a thin
signing layer over `reqwest`, and the Etsy-specific endpoint and response
mapping (Etsy returns a ready-made `login_url` with the temporary
credentials instead of requiring a separately built authorization URL).

# How to use

## Three-legged handshake against Etsy

```no_run
use etsy_oauth1::{Etsy, EtsyConfig};

# async fn run() -> Result<(), etsy_oauth1::Error> {
let etsy = Etsy::new(
    "[CONSUMER_KEY]",
    "[CONSUMER_SECRET]",
    EtsyConfig {
        scope: "email_r listings_r".to_string(),
        callback: Some("oob".to_string()),
        proxy: None,
    },
)?;

// step 1: acquire temporary credentials; Etsy bundles the sign-in URL
// into the response
let temporary = etsy.temporary_credentials().await?;
println!("please access to: {}", etsy.authorization_url(&temporary));

// step 2: the user authorizes and receives a verifier
let verifier = "[VERIFIER]";

// step 3: exchange for token credentials and read the profile
let credentials = etsy.token_credentials(&temporary, verifier).await?;
let user = etsy.user_details(&credentials).await?;
println!("signed in as {} ({})", user.login_name, user.user_id);
# Ok(())
# }
```

## Signing arbitrary requests

Any `reqwest::Client` can be lifted into a signing client:

```no_run
use etsy_oauth1::{OAuthClientProvider, Secrets};

# async fn run() -> Result<(), etsy_oauth1::Error> {
let secrets = Secrets::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")
    .token("[ACCESS_TOKEN]", "[TOKEN_SECRET]");

let resp = reqwest::Client::new()
    .oauth1(&secrets)
    .get("https://openapi.etsy.com/v2/shops/__SELF__/listings")
    .send()
    .await?;
# Ok(())
# }
```
*/
mod client;
mod error;
mod etsy;
mod params;
mod request;
mod secrets;
mod signature;
mod signer;
mod token_reader;

// exposed to external program
pub use client::{Client, OAuthClientProvider};
pub use error::{Error, Result, TokenReaderError, TokenReaderResult};
pub use etsy::{
    Etsy, EtsyConfig, TemporaryCredentials, TokenCredentials, User, API_URL,
};
pub use params::{parse_query, ParamSet, ParamValue};
pub use request::RequestBuilder;
pub use secrets::{Secrets, SecretsProvider};
pub use signature::{percent_encode, HmacSha1, SignatureAlgorithm};
pub use signer::{OAuthParameters, Signer};
pub use token_reader::{TokenReader, TokenReaderFuture, TokenResponse};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
/// Represents `realm`.
pub const REALM_KEY: &str = "realm";

// crate-private constant variables
pub(crate) const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
pub(crate) const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
pub(crate) const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub(crate) const OAUTH_TOKEN_KEY: &str = "oauth_token";
