// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP/XML transport for EZR controllers.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{CONNECTION, CONTENT_TYPE};

use crate::error::{ProtocolError, Result};
use crate::model::DeviceMessage;
use crate::transport::DeviceTransport;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

// ============================================================================
// HttpConfig - Connection parameters for one controller
// ============================================================================

/// Configuration for an HTTP controller.
///
/// # Examples
///
/// ```
/// use ezr2mqtt::transport::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("192.168.1.50")
///     .with_port(8080)
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "http://192.168.1.50:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the specified host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.port == Self::DEFAULT_PORT {
            format!("http://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Creates an [`HttpTransport`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be
    /// created.
    pub fn into_transport(self) -> std::result::Result<HttpTransport, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "controller host is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpTransport {
            base_url: self.base_url(),
            client,
        })
    }
}

// ============================================================================
// HttpTransport
// ============================================================================

/// Transport for a controller's HTTP interface.
///
/// - `GET /data/static.xml` returns the full snapshot.
/// - `POST /data/changes.xml` applies a sparse update.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    /// Returns the base URL of the controller.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/data/{path}", self.base_url)
    }

    fn check_status(response: &reqwest::Response, url: &str) -> std::result::Result<(), ProtocolError> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProtocolError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            })
        }
    }
}

impl DeviceTransport for HttpTransport {
    async fn fetch_snapshot(&self) -> Result<DeviceMessage> {
        let url = self.url("static.xml");
        tracing::debug!(url = %url, "Fetching controller snapshot");

        let response = self
            .client
            .get(&url)
            .header(CONNECTION, "close")
            .send()
            .await
            .map_err(ProtocolError::Http)?;
        Self::check_status(&response, &url)?;

        let body = response.text().await.map_err(ProtocolError::Http)?;
        Ok(DeviceMessage::from_xml(&body)?)
    }

    async fn send_update(&self, update: &DeviceMessage) -> Result<()> {
        let url = self.url("changes.xml");
        let body = format!("{XML_DECLARATION}{}", update.to_xml()?);

        tracing::debug!(url = %url, body = %body, "Sending controller update");

        let response = self
            .client
            .post(&url)
            .header(CONNECTION, "close")
            .header(CONTENT_TYPE, "application/xml")
            .body(body)
            .send()
            .await
            .map_err(ProtocolError::Http)?;
        Self::check_status(&response, &url)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = HttpConfig::new("192.168.1.50");
        assert_eq!(config.host(), "192.168.1.50");
        assert_eq!(config.port(), 80);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn base_url_omits_default_port() {
        assert_eq!(HttpConfig::new("ezr").base_url(), "http://ezr");
        assert_eq!(
            HttpConfig::new("ezr").with_port(8080).base_url(),
            "http://ezr:8080"
        );
    }

    #[test]
    fn transport_urls() {
        let transport = HttpConfig::new("10.0.0.7").into_transport().unwrap();
        assert_eq!(transport.base_url(), "http://10.0.0.7");
        assert_eq!(transport.url("static.xml"), "http://10.0.0.7/data/static.xml");
        assert_eq!(
            transport.url("changes.xml"),
            "http://10.0.0.7/data/changes.xml"
        );
    }

    #[test]
    fn empty_host_is_rejected() {
        let err = HttpConfig::new(" ").into_transport().unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidAddress(_)));
    }
}
