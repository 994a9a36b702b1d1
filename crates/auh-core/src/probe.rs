//! Registry liveness probe.
//!
//! One HTTP request against the registry's base URL decides, once per batch,
//! whether the registry or the mirror serves it. Anything that is not a clear
//! [200, 400) answer counts as down, including transport failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::redirect::Policy;
use thiserror::Error;

/// Result of a liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The registry answered with a status in [200, 400).
    Up,
    /// Error status, timeout or no answer at all.
    Down,
}

impl Liveness {
    /// Classify an HTTP status code.
    pub fn from_status(code: u16) -> Self {
        if (200..400).contains(&code) {
            Self::Up
        } else {
            Self::Down
        }
    }
}

/// The probe could not obtain a status code at all.
#[derive(Error, Debug)]
#[error("Liveness probe of {url} was indeterminate: {source}")]
pub struct ProbeIndeterminate {
    /// Endpoint that was probed.
    pub url: String,
    /// Transport error.
    #[source]
    pub source: reqwest::Error,
}

/// Decides whether the registry is reachable.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Probe once. Never fails; an indeterminate probe is [`Liveness::Down`].
    async fn check(&self) -> Liveness;
}

/// [`LivenessProbe`] issuing a single GET without following redirects.
#[derive(Debug, Clone)]
pub struct HttpLivenessProbe {
    client: Client,
    url: String,
}

impl HttpLivenessProbe {
    /// Probe `url`, giving up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(crate::USER_AGENT)
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Status code of the endpoint, or why none was obtained.
    pub async fn status(&self) -> Result<u16, ProbeIndeterminate> {
        self.client
            .get(&self.url)
            .send()
            .await
            .map(|resp| resp.status().as_u16())
            .map_err(|source| ProbeIndeterminate {
                url: self.url.clone(),
                source,
            })
    }
}

#[async_trait]
impl LivenessProbe for HttpLivenessProbe {
    async fn check(&self) -> Liveness {
        match self.status().await {
            Ok(code) => {
                let liveness = Liveness::from_status(code);
                tracing::debug!(url = %self.url, code, ?liveness, "liveness probe");
                liveness
            }
            Err(e) => {
                tracing::warn!("{e}");
                Liveness::Down
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_status_classification() {
        assert_eq!(Liveness::from_status(199), Liveness::Down);
        assert_eq!(Liveness::from_status(200), Liveness::Up);
        assert_eq!(Liveness::from_status(204), Liveness::Up);
        assert_eq!(Liveness::from_status(301), Liveness::Up);
        assert_eq!(Liveness::from_status(399), Liveness::Up);
        assert_eq!(Liveness::from_status(400), Liveness::Down);
        assert_eq!(Liveness::from_status(404), Liveness::Down);
        assert_eq!(Liveness::from_status(503), Liveness::Down);
    }

    async fn probe_with_status(code: usize) -> Liveness {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .with_status(code)
            .with_header("location", "https://elsewhere.invalid/")
            .create_async()
            .await;
        let probe = HttpLivenessProbe::new(server.url(), Duration::from_secs(5)).unwrap();
        probe.check().await
    }

    #[tokio::test]
    async fn test_http_up() {
        assert_eq!(probe_with_status(200).await, Liveness::Up);
    }

    #[tokio::test]
    async fn test_redirect_counts_as_up_without_following() {
        assert_eq!(probe_with_status(302).await, Liveness::Up);
    }

    #[tokio::test]
    async fn test_http_errors_are_down() {
        assert_eq!(probe_with_status(404).await, Liveness::Down);
        assert_eq!(probe_with_status(502).await, Liveness::Down);
    }

    #[tokio::test]
    async fn test_transport_failure_is_down() {
        // Nothing listens on port 1.
        let probe = HttpLivenessProbe::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        assert!(probe.status().await.is_err());
        assert_eq!(probe.check().await, Liveness::Down);
    }
}
