use std::{collections::HashMap, future::Future};

use async_trait::async_trait;
use reqwest::Response;
use serde::Deserialize;

use crate::params::parse_query;
use crate::{Error, Result, TokenReaderError, TokenReaderResult, OAUTH_TOKEN_KEY};

const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";

/// Represents response of token acquisition.
///
/// Anything beyond the token pair stays available in `remain`; Etsy uses
/// that slot for the `login_url` the user must be redirected to.
#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents
    #[serde(flatten)]
    pub remain: HashMap<String, String>,
}

/// Add parse_oauth_token feature to reqwest::Response.
// this trait is sealed
#[async_trait(?Send)]
pub trait TokenReader: private::Sealed {
    async fn parse_oauth_token(self) -> Result<TokenResponse>;
}

#[async_trait(?Send)]
impl TokenReader for Response {
    async fn parse_oauth_token(self) -> Result<TokenResponse> {
        let text = self.text().await?;
        Ok(read_oauth_token(text)?)
    }
}

/// Add parse_oauth_token feature to Future of reqwest::Response.
// this trait is also sealed
#[async_trait(?Send)]
pub trait TokenReaderFuture: private::SealedWrapper {
    async fn parse_oauth_token(self) -> Result<TokenResponse>;
}

#[async_trait(?Send)]
impl<T, E> TokenReaderFuture for T
where
    T: Future<Output = std::result::Result<Response, E>>,
    E: Into<Error> + 'static,
{
    async fn parse_oauth_token(self) -> Result<TokenResponse> {
        match self.await {
            Ok(resp) => Ok(resp.parse_oauth_token().await?),
            Err(err) => Err(err.into()),
        }
    }
}

pub(crate) fn read_oauth_token(text: String) -> TokenReaderResult<TokenResponse> {
    let mut parsed = parse_query(&text);
    let oauth_token = parsed.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = parsed.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(token), Some(secret)) => Ok(TokenResponse {
            oauth_token: token.into_first(),
            oauth_token_secret: secret.into_first(),
            remain: parsed
                .into_iter()
                .map(|(key, value)| (key, value.into_first()))
                .collect(),
        }),
        (None, _) => Err(TokenReaderError::TokenKeyNotFound(OAUTH_TOKEN_KEY, text)),
        (_, _) => Err(TokenReaderError::TokenKeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            text,
        )),
    }
}

mod private {
    use std::future::Future;

    use reqwest::Response;

    use crate::Error;

    pub trait Sealed {}
    impl Sealed for Response {}
    pub trait SealedWrapper {}
    impl<T, E> SealedWrapper for T
    where
        T: Future<Output = Result<Response, E>>,
        E: Into<Error>,
    {
    }
}
