use reqwest::{Client as ReqwestClient, Proxy, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::token_reader::read_oauth_token;
use crate::{Error, OAuthClientProvider, OAuthParameters, Result, Secrets};

/// Root of the Etsy v2 API.
pub const API_URL: &str = "https://openapi.etsy.com/v2/";

/// Construction-time options for the Etsy client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EtsyConfig {
    /// Space-separated permission scopes requested with the temporary
    /// credentials (e.g. `email_r listings_r`).
    #[serde(default)]
    pub scope: String,
    /// `oauth_callback` sent with the temporary-credential request.
    #[serde(default)]
    pub callback: Option<String>,
    /// Outbound proxy URL for all API traffic.
    #[serde(default)]
    pub proxy: Option<String>,
}

/// Temporary (request) credentials, together with the sign-in URL Etsy
/// bundles into the same response.
#[derive(Debug, Clone)]
pub struct TemporaryCredentials {
    pub token: String,
    pub secret: String,
    /// Pre-built authorization URL; Etsy includes every required query
    /// parameter, so it is used verbatim as the redirect target.
    pub login_url: String,
}

/// Long-lived token credentials obtained at the end of the handshake.
#[derive(Debug, Clone)]
pub struct TokenCredentials {
    pub token: String,
    pub secret: String,
}

/// The authenticated user, mapped from `results[0]` of the user-detail
/// response.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: u64,
    pub login_name: String,
    /// Every field of the record other than `user_id` and `login_name`,
    /// passed through untouched.
    pub extra: Map<String, Value>,
}

/// Etsy OAuth1 server adapter: endpoint construction, the three-legged
/// credential exchange, and user-detail mapping.
#[derive(Debug, Clone)]
pub struct Etsy {
    consumer_key: String,
    consumer_secret: String,
    config: EtsyConfig,
    http: ReqwestClient,
}

impl Etsy {
    /// Builds the adapter and its HTTP client; the configured proxy, when
    /// present, is applied here and nowhere else.
    pub fn new<TKey, TSecret>(
        consumer_key: TKey,
        consumer_secret: TSecret,
        config: EtsyConfig,
    ) -> Result<Self>
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        let mut builder = ReqwestClient::builder();
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(Proxy::all(proxy)?);
        }
        Ok(Etsy {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            config,
            http: builder.build()?,
        })
    }

    pub fn url_temporary_credentials(&self) -> String {
        format!("{}oauth/request_token?scope={}", API_URL, self.config.scope)
    }

    pub fn url_token_credentials(&self) -> String {
        format!("{}oauth/access_token", API_URL)
    }

    pub fn url_user_details(&self) -> String {
        format!("{}users/__SELF__", API_URL)
    }

    /// First leg: obtains temporary credentials and captures the
    /// `login_url` Etsy returns alongside them.
    pub async fn temporary_credentials(&self) -> Result<TemporaryCredentials> {
        let url = self.url_temporary_credentials();
        debug!(%url, "requesting temporary credentials");

        let secrets = Secrets::new(self.consumer_key.as_str(), self.consumer_secret.as_str());
        let mut params = OAuthParameters::new();
        if let Some(callback) = &self.config.callback {
            params = params.callback(callback.as_str());
        }

        let response = self
            .http
            .clone()
            .oauth1_with_params(&secrets, params)
            .post(url.as_str())
            .send()
            .await?;
        temporary_from_body(success_body(response).await?)
    }

    /// Second leg: the user authorizes at the URL Etsy handed back with
    /// the temporary credentials; no parameters need to be appended.
    pub fn authorization_url<'a>(&self, temporary: &'a TemporaryCredentials) -> &'a str {
        &temporary.login_url
    }

    /// Third leg: exchanges the authorized temporary credentials plus the
    /// verifier for token credentials.
    pub async fn token_credentials(
        &self,
        temporary: &TemporaryCredentials,
        verifier: &str,
    ) -> Result<TokenCredentials> {
        let url = self.url_token_credentials();
        debug!(%url, "exchanging temporary credentials for token credentials");

        let secrets = Secrets::new(self.consumer_key.as_str(), self.consumer_secret.as_str())
            .token(temporary.token.as_str(), temporary.secret.as_str());
        let params = OAuthParameters::new().verifier(verifier);

        let response = self
            .http
            .clone()
            .oauth1_with_params(&secrets, params)
            .post(url.as_str())
            .send()
            .await?;
        let token = read_oauth_token(success_body(response).await?)?;
        Ok(TokenCredentials {
            token: token.oauth_token,
            secret: token.oauth_token_secret,
        })
    }

    /// Fetches and maps the authenticated user's profile.
    pub async fn user_details(&self, credentials: &TokenCredentials) -> Result<User> {
        let url = self.url_user_details();
        debug!(%url, "fetching user details");

        let secrets = Secrets::new(self.consumer_key.as_str(), self.consumer_secret.as_str())
            .token(credentials.token.as_str(), credentials.secret.as_str());

        let response = self
            .http
            .clone()
            .oauth1(&secrets)
            .get(url.as_str())
            .send()
            .await?;
        user_from_json(&success_body(response).await?)
    }
}

/// Reads the body, turning non-2xx statuses into [`Error::BadResponse`]
/// with the body attached for diagnostics.
async fn success_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(Error::BadResponse { status, body });
    }
    Ok(body)
}

fn temporary_from_body(body: String) -> Result<TemporaryCredentials> {
    let token = read_oauth_token(body)?;
    let login_url = token
        .remain
        .get("login_url")
        .cloned()
        .ok_or(Error::UnexpectedShape(
            "temporary credential response did not include login_url",
        ))?;
    Ok(TemporaryCredentials {
        token: token.oauth_token,
        secret: token.oauth_token_secret,
        login_url,
    })
}

fn user_from_json(body: &str) -> Result<User> {
    let payload: Value = serde_json::from_str(body)?;
    let record = payload
        .get("results")
        .and_then(|results| results.get(0))
        .ok_or(Error::UnexpectedShape(
            "user detail response did not include results[0]",
        ))?;

    let user_id = record
        .get("user_id")
        .and_then(Value::as_u64)
        .ok_or(Error::UnexpectedShape("user record missing user_id"))?;
    let login_name = record
        .get("login_name")
        .and_then(Value::as_str)
        .ok_or(Error::UnexpectedShape("user record missing login_name"))?
        .to_string();
    let extra = record
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter(|(key, _)| key.as_str() != "user_id" && key.as_str() != "login_name")
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();

    Ok(User {
        user_id,
        login_name,
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(scope: &str) -> Etsy {
        Etsy::new(
            "key",
            "secret",
            EtsyConfig {
                scope: scope.to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn endpoint_urls() {
        let etsy = adapter("email_r");
        assert_eq!(
            etsy.url_temporary_credentials(),
            "https://openapi.etsy.com/v2/oauth/request_token?scope=email_r"
        );
        assert_eq!(
            etsy.url_token_credentials(),
            "https://openapi.etsy.com/v2/oauth/access_token"
        );
        assert_eq!(
            etsy.url_user_details(),
            "https://openapi.etsy.com/v2/users/__SELF__"
        );
    }

    #[test]
    fn temporary_credentials_capture_login_url() {
        let body = "oauth_token=tok&oauth_token_secret=sec&login_url=https%3A%2F%2Fwww.etsy.com%2Foauth%2Fsignin%3Foauth_token%3Dtok";
        let credentials = temporary_from_body(body.to_string()).unwrap();
        assert_eq!(credentials.token, "tok");
        assert_eq!(credentials.secret, "sec");
        assert_eq!(
            credentials.login_url,
            "https://www.etsy.com/oauth/signin?oauth_token=tok"
        );
    }

    #[test]
    fn temporary_credentials_without_login_url() {
        let body = "oauth_token=tok&oauth_token_secret=sec";
        let result = temporary_from_body(body.to_string());
        assert!(matches!(result, Err(Error::UnexpectedShape(_))));
    }

    #[test]
    fn authorization_url_is_verbatim() {
        let etsy = adapter("");
        let credentials = TemporaryCredentials {
            token: "tok".into(),
            secret: "sec".into(),
            login_url: "https://www.etsy.com/oauth/signin?everything=prebuilt".into(),
        };
        assert_eq!(
            etsy.authorization_url(&credentials),
            "https://www.etsy.com/oauth/signin?everything=prebuilt"
        );
    }

    #[test]
    fn user_mapping_splits_known_and_extra_fields() {
        let body = r#"{
            "count": 1,
            "results": [{
                "user_id": 8675309,
                "login_name": "shopkeeper",
                "primary_email": "shop@example.com",
                "feedback_info": {"count": 12, "score": 100}
            }]
        }"#;
        let user = user_from_json(body).unwrap();
        assert_eq!(user.user_id, 8675309);
        assert_eq!(user.login_name, "shopkeeper");
        assert_eq!(user.extra.len(), 2);
        assert_eq!(
            user.extra.get("primary_email").unwrap(),
            "shop@example.com"
        );
        assert!(user.extra.get("user_id").is_none());
    }

    #[test]
    fn user_mapping_requires_results_envelope() {
        let result = user_from_json(r#"{"count": 0, "results": []}"#);
        assert!(matches!(result, Err(Error::UnexpectedShape(_))));

        let result = user_from_json(r#"{"user_id": 1}"#);
        assert!(matches!(result, Err(Error::UnexpectedShape(_))));
    }

    #[test]
    fn user_mapping_rejects_non_json() {
        assert!(matches!(
            user_from_json("not json"),
            Err(Error::Json(_))
        ));
    }
}
