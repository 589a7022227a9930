//! Social posting API client (X API v2, blocking).

use crate::config::{AnnouncerConfig, Credentials};
use crate::error::{AutoblogError, Result};
use crate::oauth::{self, OAuthCredentials};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostedStatus {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub impression_count: u64,
}

pub trait SocialClient {
    fn post(&self, text: &str) -> Result<PostedStatus>;

    /// Public metrics for a post. `None` when they cannot be fetched.
    fn metrics(&self, id: &str) -> Option<PublicMetrics>;
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct MetricsData {
    #[serde(default)]
    public_metrics: PublicMetrics,
}

pub struct XClient {
    http: reqwest::blocking::Client,
    api_base: String,
    oauth: Option<OAuthCredentials>,
    bearer_token: Option<String>,
}

impl XClient {
    pub fn new(config: &AnnouncerConfig, creds: &Credentials) -> Result<Self> {
        let http = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            oauth: OAuthCredentials::from_credentials(creds).ok(),
            bearer_token: creds.bearer_token.clone(),
        })
    }

    pub fn can_post(&self) -> bool {
        self.oauth.is_some()
    }
}

impl SocialClient for XClient {
    fn post(&self, text: &str) -> Result<PostedStatus> {
        let creds = self
            .oauth
            .as_ref()
            .ok_or(AutoblogError::MissingSocialCredentials)?;

        let url = format!("{}/2/tweets", self.api_base);
        let header = oauth::authorization_header(
            "POST",
            &url,
            creds,
            &[],
            &oauth::generate_nonce(),
            chrono::Utc::now().timestamp(),
        )?;

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, header)
            .json(&serde_json::json!({ "text": text }))
            .send()?;

        let status = resp.status();
        let body = resp.text()?;
        if status != reqwest::StatusCode::CREATED {
            return Err(AutoblogError::PostFailed {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Envelope<PostedStatus> =
            serde_json::from_str(&body).map_err(|e| AutoblogError::UnexpectedResponse {
                service: "post API",
                reason: e.to_string(),
            })?;
        Ok(parsed.data)
    }

    fn metrics(&self, id: &str) -> Option<PublicMetrics> {
        let token = self.bearer_token.as_deref()?;
        let url = format!("{}/2/tweets/{}", self.api_base, urlencoding::encode(id));

        let resp = match self
            .http
            .get(&url)
            .query(&[("tweet.fields", "public_metrics")])
            .bearer_auth(token)
            .send()
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(id, error = %e, "metrics request failed");
                return None;
            }
        };
        if resp.status() != reqwest::StatusCode::OK {
            tracing::warn!(id, status = resp.status().as_u16(), "metrics request rejected");
            return None;
        }
        match resp.json::<Envelope<MetricsData>>() {
            Ok(env) => Some(env.data.public_metrics),
            Err(e) => {
                tracing::warn!(id, error = %e, "metrics response unreadable");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn full_creds() -> Credentials {
        Credentials {
            consumer_key: Some("ck".into()),
            consumer_secret: Some("cs".into()),
            access_token: Some("at".into()),
            access_token_secret: Some("ats".into()),
            bearer_token: Some("bearer".into()),
            ..Credentials::default()
        }
    }

    fn client(server: &mockito::Server, creds: &Credentials) -> XClient {
        let config = AnnouncerConfig {
            api_base: server.url(),
            ..AnnouncerConfig::default()
        };
        XClient::new(&config, creds).unwrap()
    }

    #[test]
    fn post_sends_signed_json() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/2/tweets")
            .match_header(
                "authorization",
                Matcher::Regex(r#"^OAuth .*oauth_consumer_key="ck".*oauth_signature=""#.into()),
            )
            .match_body(Matcher::Json(serde_json::json!({"text": "hello"})))
            .with_status(201)
            .with_body(r#"{"data":{"id":"1790","text":"hello"}}"#)
            .create();

        let posted = client(&server, &full_creds()).post("hello").unwrap();
        assert_eq!(posted.id, "1790");
        mock.assert();
    }

    #[test]
    fn non_created_status_is_a_post_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/2/tweets")
            .with_status(200)
            .with_body("{}")
            .create();

        let err = client(&server, &full_creds()).post("hello").unwrap_err();
        match err {
            AutoblogError::PostFailed { status, body } => {
                assert_eq!(status, 200);
                assert_eq!(body, "{}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn post_without_credentials_never_calls_the_api() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/2/tweets").expect(0).create();

        let creds = Credentials {
            access_token_secret: None,
            ..full_creds()
        };
        let c = client(&server, &creds);
        assert!(!c.can_post());
        assert!(matches!(
            c.post("hello"),
            Err(AutoblogError::MissingSocialCredentials)
        ));
        mock.assert();
    }

    #[test]
    fn metrics_reads_public_metrics() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/2/tweets/42")
            .match_query(Matcher::UrlEncoded(
                "tweet.fields".into(),
                "public_metrics".into(),
            ))
            .match_header("authorization", "Bearer bearer")
            .with_status(200)
            .with_body(
                r#"{"data":{"id":"42","public_metrics":{"like_count":3,"retweet_count":1,"reply_count":2,"impression_count":99}}}"#,
            )
            .create();

        let m = client(&server, &full_creds()).metrics("42").unwrap();
        assert_eq!(
            m,
            PublicMetrics {
                like_count: 3,
                retweet_count: 1,
                reply_count: 2,
                impression_count: 99
            }
        );
    }

    #[test]
    fn metrics_failures_are_none() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/2/tweets/7").with_status(429).create();

        assert!(client(&server, &full_creds()).metrics("7").is_none());

        let no_bearer = Credentials {
            bearer_token: None,
            ..full_creds()
        };
        assert!(client(&server, &no_bearer).metrics("7").is_none());
    }
}
