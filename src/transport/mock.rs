// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory controller.
//!
//! Serves a seeded snapshot and applies every update to it with the merge
//! engine, the way a real controller would. Useful for demos and tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::{ProtocolError, Result};
use crate::merge::Merge;
use crate::model::{Device, DeviceMessage, HeatArea, HeatCtrl, Network, Vacation};
use crate::transport::DeviceTransport;
use crate::types::{Explicit, HeatAreaMode};

/// In-memory controller transport.
///
/// Clones share the same snapshot, so a test can keep a handle while the
/// bridge owns another.
///
/// # Examples
///
/// ```
/// use ezr2mqtt::transport::{DeviceTransport, MockTransport};
///
/// # async fn example() -> ezr2mqtt::Result<()> {
/// let mock = MockTransport::new();
/// let snapshot = mock.fetch_snapshot().await?;
/// assert_eq!(snapshot.device.id.as_deref(), Some("MOCK-12345"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

#[derive(Debug)]
struct MockInner {
    snapshot: Mutex<DeviceMessage>,
    updates: Mutex<Vec<DeviceMessage>>,
    fetches: AtomicUsize,
    offline: AtomicBool,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Creates a mock controller with the default two-room snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::with_snapshot(default_snapshot())
    }

    /// Creates a mock controller serving the given snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: DeviceMessage) -> Self {
        Self {
            inner: Arc::new(MockInner {
                snapshot: Mutex::new(snapshot),
                updates: Mutex::new(Vec::new()),
                fetches: AtomicUsize::new(0),
                offline: AtomicBool::new(false),
            }),
        }
    }

    /// Returns a copy of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> DeviceMessage {
        self.inner.snapshot.lock().clone()
    }

    /// Returns every update received so far, in arrival order.
    #[must_use]
    pub fn updates(&self) -> Vec<DeviceMessage> {
        self.inner.updates.lock().clone()
    }

    /// Returns how many snapshots have been fetched.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(Ordering::Acquire)
    }

    /// Makes the controller unreachable (or reachable again).
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::Release);
    }

    fn ensure_online(&self) -> std::result::Result<(), ProtocolError> {
        if self.inner.offline.load(Ordering::Acquire) {
            Err(ProtocolError::ConnectionFailed(
                "mock controller is offline".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl DeviceTransport for MockTransport {
    async fn fetch_snapshot(&self) -> Result<DeviceMessage> {
        self.ensure_online()?;
        self.inner.fetches.fetch_add(1, Ordering::AcqRel);
        Ok(self.snapshot())
    }

    async fn send_update(&self, update: &DeviceMessage) -> Result<()> {
        self.ensure_online()?;
        self.inner.snapshot.lock().merge(update);
        self.inner.updates.lock().push(update.clone());
        tracing::debug!(
            areas = update.device.heat_areas.len(),
            "Mock controller applied update"
        );
        Ok(())
    }
}

fn default_snapshot() -> DeviceMessage {
    DeviceMessage::new(Device {
        id: Some("MOCK-12345".to_string()),
        kind: Some("EZR".to_string()),
        name: Some("Mock Device".to_string()),
        origin: Some("mock".to_string()),
        date_time: Some("01.01.2025 12:00:00".to_string()),
        version_sw_eth: Some("1.0.0".to_string()),
        version_hw: Some("1.0".to_string()),
        temperature_unit: Some(0),
        mode: Some(1),
        antifreeze: Some(1),
        antifreeze_temp: Some(5.0),
        t_heat_vacation: Some(15.0),
        vacation: Some(Vacation {
            state: Some(0),
            start_date: Some("01.01.2025".to_string()),
            start_time: Some("00:00".to_string()),
            end_date: Some("01.01.2025".to_string()),
            end_time: Some("00:00".to_string()),
        }),
        network: Some(Network {
            mac: Some("00:11:22:33:44:55".to_string()),
            dhcp: Some(1),
            ipv4_actual: Some("192.168.1.100".to_string()),
            netmask_actual: Some("255.255.255.0".to_string()),
            gateway: Some("192.168.1.1".to_string()),
            dns: Some("192.168.1.1".to_string()),
            ..Network::default()
        }),
        heat_areas: vec![
            HeatArea {
                name: Some("Living Room".to_string()),
                mode: Some(HeatAreaMode::Auto),
                t_actual: Some(21.5),
                t_target: Some(22.0),
                t_target_min: Some(5.0),
                t_target_max: Some(30.0),
                state: Some(Explicit(0)),
                ..HeatArea::new(1)
            },
            HeatArea {
                name: Some("Bedroom".to_string()),
                mode: Some(HeatAreaMode::Night),
                t_actual: Some(19.0),
                t_target: Some(18.0),
                t_target_min: Some(5.0),
                t_target_max: Some(30.0),
                state: Some(Explicit(0)),
                ..HeatArea::new(2)
            },
        ],
        heat_ctrls: vec![
            HeatCtrl {
                nr: Some(1),
                in_use: Some(1),
                heat_area_nr: Some(1),
                actor: Some(50),
                actor_percent: Some(Explicit(50)),
                state: Some(Explicit(0)),
            },
            HeatCtrl {
                nr: Some(2),
                in_use: Some(1),
                heat_area_nr: Some(2),
                actor: Some(30),
                actor_percent: Some(Explicit(30)),
                state: Some(Explicit(0)),
            },
        ],
        ..Device::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_snapshot() {
        let mock = MockTransport::new();
        let msg = mock.fetch_snapshot().await.unwrap();
        let device = &msg.device;

        assert_eq!(device.id.as_deref(), Some("MOCK-12345"));
        assert_eq!(device.kind.as_deref(), Some("EZR"));
        assert_eq!(device.name.as_deref(), Some("Mock Device"));
        assert_eq!(device.heat_areas.len(), 2);
        assert_eq!(device.heat_areas[0].display_name(), "Living Room");
        assert_eq!(device.heat_areas[0].t_target, Some(22.0));
        assert_eq!(device.heat_areas[1].display_name(), "Bedroom");
        assert_eq!(mock.fetch_count(), 1);
    }

    #[tokio::test]
    async fn update_merges_into_snapshot() {
        let mock = MockTransport::new();
        let update = DeviceMessage::heat_area_update(HeatArea::new(1).with_target(24.5));
        mock.send_update(&update).await.unwrap();

        let msg = mock.fetch_snapshot().await.unwrap();
        let living = msg.device.heat_area(1).unwrap();
        assert_eq!(living.t_target, Some(24.5));
        assert_eq!(living.display_name(), "Living Room");
        assert_eq!(msg.device.heat_area(2).unwrap().t_target, Some(18.0));
        assert_eq!(mock.updates(), vec![update]);
    }

    #[tokio::test]
    async fn device_mode_zero_is_ignored() {
        let mock = MockTransport::new();
        let update = DeviceMessage::new(Device {
            mode: Some(0),
            ..Device::default()
        });
        mock.send_update(&update).await.unwrap();
        assert_eq!(mock.snapshot().device.mode, Some(1));

        let update = DeviceMessage::new(Device {
            mode: Some(2),
            ..Device::default()
        });
        mock.send_update(&update).await.unwrap();
        assert_eq!(mock.snapshot().device.mode, Some(2));
        assert_eq!(mock.snapshot().device.id.as_deref(), Some("MOCK-12345"));
    }

    #[tokio::test]
    async fn controller_update_leaves_other_controllers() {
        let mock = MockTransport::new();
        let update = DeviceMessage::new(Device {
            heat_ctrls: vec![HeatCtrl {
                nr: Some(1),
                actor: Some(75),
                ..HeatCtrl::default()
            }],
            ..Device::default()
        });
        mock.send_update(&update).await.unwrap();

        let snapshot = mock.snapshot();
        assert_eq!(snapshot.device.heat_ctrl(1).unwrap().actor, Some(75));
        assert_eq!(snapshot.device.heat_ctrl(1).unwrap().heat_area_nr, Some(1));
        assert_eq!(snapshot.device.heat_ctrl(2).unwrap().actor, Some(30));
    }

    #[tokio::test]
    async fn vacation_update_keeps_start_time() {
        let mock = MockTransport::new();
        let update = DeviceMessage::new(Device {
            vacation: Some(Vacation {
                state: Some(1),
                start_date: Some("24.12.2025".to_string()),
                ..Vacation::default()
            }),
            ..Device::default()
        });
        mock.send_update(&update).await.unwrap();

        let vacation = mock.snapshot().device.vacation.unwrap();
        assert_eq!(vacation.state, Some(1));
        assert_eq!(vacation.start_date.as_deref(), Some("24.12.2025"));
        assert_eq!(vacation.start_time.as_deref(), Some("00:00"));
    }

    #[tokio::test]
    async fn offline_controller_fails() {
        let mock = MockTransport::new();
        mock.set_offline(true);
        assert!(mock.fetch_snapshot().await.is_err());
        assert!(
            mock.send_update(&DeviceMessage::default())
                .await
                .is_err()
        );
        assert!(mock.updates().is_empty());

        mock.set_offline(false);
        assert!(mock.fetch_snapshot().await.is_ok());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mock = MockTransport::new();
        let handle = mock.clone();
        mock.send_update(&DeviceMessage::heat_area_update(
            HeatArea::new(2).with_mode(HeatAreaMode::Day),
        ))
        .await
        .unwrap();
        assert_eq!(
            handle.snapshot().device.heat_area(2).unwrap().mode,
            Some(HeatAreaMode::Day)
        );
    }
}
