// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ezr2mqtt` - A bridge between EZR heating controllers and an MQTT bus.
//!
//! The bridge polls every configured controller over its HTTP/XML interface,
//! publishes the readings of each room, and turns commands received on the
//! bus into partial updates sent back to the controller.
//!
//! # Topics
//!
//! ```text
//! <prefix>/<device>/<room>/state/temperature_target    22.00
//! <prefix>/<device>/<room>/state/temperature_actual    21.50
//! <prefix>/<device>/<room>/state/heatarea_mode         auto|day|night
//! <prefix>/<device>/0/state/meta                       {"name":..,"id":..,"type":..,"rooms":[..]}
//! <prefix>/<device>/<room>/set/temperature_target      23.50
//! <prefix>/<device>/<room>/set/heatarea_mode           night
//! ```
//!
//! # Components
//!
//! - [`model`]: the controller document, every field optional
//! - [`merge`]: applies sparse updates to a snapshot
//! - [`store`]: device name to controller identifier
//! - [`router`]: bus messages to controller updates and back
//! - [`scheduler`]: periodic polling and announcement
//! - [`transport`]: HTTP/XML and in-memory controllers
//! - [`bus`]: MQTT adapter
//! - [`config`]: layered configuration
//!
//! # Quick Start
//!
//! ```no_run
//! use ezr2mqtt::Bridge;
//! use ezr2mqtt::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> ezr2mqtt::Result<()> {
//!     let config = Config::from_yaml(
//!         r#"
//! api:
//!   mqtt:
//!     urls: ["mqtt://192.168.1.10:1883"]
//! ezr:
//!   - name: floor1
//!     type: http
//!     http:
//!       host: 192.168.1.50
//! general:
//!   poll_every: 30s
//! "#,
//!     )?;
//!
//!     let mut bridge = Bridge::from_config(&config)?;
//!     bridge.start().await?;
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     bridge.shutdown().await
//! }
//! ```
//!
//! # Sending Updates Directly
//!
//! ```no_run
//! use ezr2mqtt::model::{DeviceMessage, HeatArea};
//! use ezr2mqtt::transport::{DeviceTransport, HttpConfig};
//! use ezr2mqtt::types::HeatAreaMode;
//!
//! # async fn example() -> ezr2mqtt::Result<()> {
//! let controller = HttpConfig::new("192.168.1.50").into_transport()?;
//!
//! let snapshot = controller.fetch_snapshot().await?;
//! println!("{:?}", snapshot.device.name);
//!
//! let update = DeviceMessage::heat_area_update(HeatArea::new(1).with_mode(HeatAreaMode::Night));
//! controller.send_update(&update).await?;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod bus;
pub mod config;
pub mod error;
pub mod manager;
pub mod merge;
pub mod model;
pub mod router;
pub mod scheduler;
pub mod store;
pub mod transport;
pub mod types;

pub use bridge::Bridge;
pub use error::{ConfigError, Error, MessageError, ParseError, ProtocolError, Result};
pub use merge::Merge;
pub use model::{Device, DeviceMessage, HeatArea};
pub use types::HeatAreaMode;
