// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device transports.
//!
//! A transport reaches one controller. It can fetch the full snapshot and
//! send a sparse update; the wire encoding is its own concern.
//!
//! # Transports
//!
//! - [`HttpTransport`]: the controller's HTTP/XML interface
//! - [`MockTransport`]: an in-memory controller that merges updates locally

#[cfg(feature = "http")]
mod http;
mod mock;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpTransport};
pub use mock::MockTransport;

use std::future::Future;

use crate::error::Result;
use crate::model::DeviceMessage;

/// Operations a controller transport provides.
///
/// Returned futures are `Send` so transports can be driven from spawned
/// tasks.
pub trait DeviceTransport: Send + Sync {
    /// Fetches the full device snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the controller cannot be reached or its answer cannot
    /// be decoded.
    fn fetch_snapshot(&self) -> impl Future<Output = Result<DeviceMessage>> + Send;

    /// Sends a sparse update to the controller.
    ///
    /// # Errors
    ///
    /// Returns error if the update cannot be encoded or delivered.
    fn send_update(&self, update: &DeviceMessage) -> impl Future<Output = Result<()>> + Send;
}

/// Either kind of transport behind one type.
#[derive(Debug)]
pub enum DeviceClient {
    /// HTTP/XML controller.
    #[cfg(feature = "http")]
    Http(HttpTransport),
    /// In-memory controller.
    Mock(MockTransport),
}

impl DeviceTransport for DeviceClient {
    async fn fetch_snapshot(&self) -> Result<DeviceMessage> {
        match self {
            #[cfg(feature = "http")]
            Self::Http(client) => client.fetch_snapshot().await,
            Self::Mock(client) => client.fetch_snapshot().await,
        }
    }

    async fn send_update(&self, update: &DeviceMessage) -> Result<()> {
        match self {
            #[cfg(feature = "http")]
            Self::Http(client) => client.send_update(update).await,
            Self::Mock(client) => client.send_update(update).await,
        }
    }
}

#[cfg(feature = "http")]
impl From<HttpTransport> for DeviceClient {
    fn from(client: HttpTransport) -> Self {
        Self::Http(client)
    }
}

impl From<MockTransport> for DeviceClient {
    fn from(client: MockTransport) -> Self {
        Self::Mock(client)
    }
}
