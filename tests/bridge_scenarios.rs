// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end scenarios: an in-process bus driving mock controllers through
//! the bridge.

use std::sync::Arc;
use std::time::Duration;

use ezr2mqtt::Bridge;
use ezr2mqtt::bus::{
    BusMessage, EntityDiscovery, Emitter, InboundMessage, Listener, MessageHandler, MessageKind,
    Subscription,
};
use ezr2mqtt::manager::DeviceRegistry;
use ezr2mqtt::model::HeatArea;
use ezr2mqtt::scheduler::ScheduleConfig;
use ezr2mqtt::store::IdentityStore;
use ezr2mqtt::transport::MockTransport;
use ezr2mqtt::types::HeatAreaMode;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Bus that records what is emitted and lets tests inject commands.
#[derive(Default)]
struct LoopbackBus {
    emitted: Mutex<Vec<(String, BusMessage)>>,
    entities: Mutex<Vec<EntityDiscovery>>,
    inbound: Mutex<Option<mpsc::Sender<InboundMessage>>>,
}

impl LoopbackBus {
    async fn inject(&self, topic: &str, payload: &str) {
        let sender = self.inbound.lock().clone().expect("listener not connected");
        sender
            .send(InboundMessage {
                topic: topic.to_string(),
                payload: payload.as_bytes().to_vec(),
            })
            .await
            .unwrap();
    }

    fn count(&self, kind: MessageKind) -> usize {
        self.emitted
            .lock()
            .iter()
            .filter(|(_, message)| message.kind == kind)
            .count()
    }

    fn last(&self, device: &str, room: u32, kind: MessageKind) -> Option<String> {
        self.emitted
            .lock()
            .iter()
            .rev()
            .find(|(name, m)| name == device && m.room == room && m.kind == kind)
            .map(|(_, m)| m.data.clone())
    }
}

impl Emitter for LoopbackBus {
    async fn emit(&self, device: &str, message: &BusMessage) -> ezr2mqtt::Result<()> {
        self.emitted
            .lock()
            .push((device.to_string(), message.clone()));
        Ok(())
    }

    async fn emit_discovery(&self, entity: &EntityDiscovery) -> ezr2mqtt::Result<()> {
        self.entities.lock().push(entity.clone());
        Ok(())
    }
}

impl Listener for LoopbackBus {
    async fn connect<H: MessageHandler>(&self, handler: Arc<H>) -> ezr2mqtt::Result<Subscription> {
        let (tx, rx) = mpsc::channel(16);
        *self.inbound.lock() = Some(tx);
        Ok(Subscription::spawn(rx, handler))
    }

    async fn disconnect(&self) -> ezr2mqtt::Result<()> {
        *self.inbound.lock() = None;
        Ok(())
    }
}

struct Setup {
    bridge: Bridge<MockTransport, LoopbackBus>,
    dev1: MockTransport,
    dev2: MockTransport,
}

fn setup(schedule: ScheduleConfig) -> Setup {
    let dev1 = MockTransport::new();
    let dev2 = MockTransport::new();

    let mut registry = DeviceRegistry::new();
    registry.register("dev1", dev1.clone());
    registry.register("dev2", dev2.clone());

    Setup {
        bridge: Bridge::new(registry, LoopbackBus::default(), schedule),
        dev1,
        dev2,
    }
}

async fn settle() {
    sleep(Duration::from_millis(10)).await;
}

// ============================================================================
// Announce And Poll
// ============================================================================

mod announce_and_poll {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn announce_emits_meta_per_device() {
        let Setup { mut bridge, .. } = setup(ScheduleConfig::new(Duration::from_secs(60)));
        bridge.start().await.unwrap();
        settle().await;

        let bus = Arc::clone(bridge.bus());
        assert_eq!(bus.count(MessageKind::Meta), 2);
        assert_eq!(bus.count(MessageKind::TemperatureTarget), 0);
        assert!(bus.entities.lock().is_empty());

        let meta = bus.last("dev1", 0, MessageKind::Meta).unwrap();
        let meta: serde_json::Value = serde_json::from_str(&meta).unwrap();
        assert_eq!(meta["id"], "MOCK-12345");
        assert_eq!(meta["rooms"][1]["name"], "Bedroom");

        assert_eq!(bridge.store().get_id("dev1").as_deref(), Some("MOCK-12345"));
        bridge.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn poll_cycle_emits_six_readings_per_device() {
        let Setup { mut bridge, .. } = setup(ScheduleConfig::new(Duration::from_secs(60)));
        bridge.start().await.unwrap();
        sleep(Duration::from_secs(61)).await;

        let bus = Arc::clone(bridge.bus());
        let dev1_states = bus
            .emitted
            .lock()
            .iter()
            .filter(|(name, m)| name == "dev1" && m.kind != MessageKind::Meta)
            .count();
        assert_eq!(dev1_states, 6);
        assert_eq!(bus.count(MessageKind::Meta), 2);

        assert_eq!(
            bus.last("dev1", 1, MessageKind::TemperatureActual).as_deref(),
            Some("21.50")
        );
        assert_eq!(
            bus.last("dev1", 2, MessageKind::HeatAreaMode).as_deref(),
            Some("night")
        );
        bridge.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn entity_discovery_when_enabled() {
        let schedule = ScheduleConfig::new(Duration::from_secs(60)).with_entity_discovery();
        let Setup { mut bridge, .. } = setup(schedule);
        bridge.start().await.unwrap();
        settle().await;

        let entities = bridge.bus().entities.lock().clone();
        assert_eq!(entities.len(), 12);
        assert!(
            entities
                .iter()
                .any(|e| e.config_topic("homeassistant") == "homeassistant/select/dev1_bedroom_heatarea_mode/config")
        );
        bridge.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn offline_device_does_not_stop_others() {
        let Setup { mut bridge, dev2, .. } = setup(ScheduleConfig::new(Duration::from_secs(30)));
        dev2.set_offline(true);
        bridge.start().await.unwrap();
        sleep(Duration::from_secs(31)).await;

        let bus = Arc::clone(bridge.bus());
        assert!(bus.last("dev1", 1, MessageKind::TemperatureTarget).is_some());
        assert!(bus.last("dev2", 1, MessageKind::TemperatureTarget).is_none());
        assert!(bridge.store().get_id("dev2").is_none());

        dev2.set_offline(false);
        sleep(Duration::from_secs(30)).await;
        assert!(bus.last("dev2", 1, MessageKind::TemperatureTarget).is_some());
        assert!(bus.last("dev2", 0, MessageKind::Meta).is_some());

        bridge.shutdown().await.unwrap();
    }
}

// ============================================================================
// Commands
// ============================================================================

mod commands {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn target_temperature_command() {
        let Setup { mut bridge, dev1, dev2 } = setup(ScheduleConfig::default());
        bridge.start().await.unwrap();
        settle().await;

        bridge
            .bus()
            .inject("ezr/dev1/1/set/temperature_target", "23.50")
            .await;
        settle().await;

        let updates = dev1.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].device.id.as_deref(), Some("MOCK-12345"));
        assert_eq!(
            updates[0].device.heat_areas,
            vec![HeatArea::new(1).with_target(23.5)]
        );
        assert!(dev2.updates().is_empty());

        let room = dev1.snapshot().device.heat_area(1).cloned().unwrap();
        assert_eq!(room.t_target, Some(23.5));
        assert_eq!(room.display_name(), "Living Room");

        bridge.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn mode_command_is_reflected_on_next_poll() {
        let Setup { mut bridge, dev1, .. } = setup(ScheduleConfig::new(Duration::from_secs(60)));
        bridge.start().await.unwrap();
        settle().await;

        bridge.bus().inject("ezr/dev1/1/set/heatarea_mode", "night").await;
        settle().await;

        assert_eq!(
            dev1.updates()[0].device.heat_areas,
            vec![HeatArea::new(1).with_mode(HeatAreaMode::Night)]
        );

        sleep(Duration::from_secs(60)).await;
        assert_eq!(
            bridge
                .bus()
                .last("dev1", 1, MessageKind::HeatAreaMode)
                .as_deref(),
            Some("night")
        );
        bridge.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn back_to_auto_is_applied() {
        let Setup { mut bridge, dev1, .. } = setup(ScheduleConfig::default());
        bridge.start().await.unwrap();
        settle().await;

        bridge.bus().inject("ezr/dev1/2/set/heatarea_mode", "auto").await;
        settle().await;

        let room = dev1.snapshot().device.heat_area(2).cloned().unwrap();
        assert_eq!(room.mode, Some(HeatAreaMode::Auto));
        assert_eq!(room.t_target, Some(18.0));
        bridge.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_commands_are_dropped() {
        let Setup { mut bridge, dev1, .. } = setup(ScheduleConfig::default());
        bridge.start().await.unwrap();
        settle().await;

        let bus = Arc::clone(bridge.bus());
        bus.inject("ezr/dev1/1/set/unknown_type", "x").await;
        bus.inject("ezr/dev1/abc/set/temperature_target", "20").await;
        bus.inject("ezr/dev1/1/set/temperature_target", "warm").await;
        bus.inject("ezr/dev1/1/set/heatarea_mode", "off").await;
        bus.inject("ezr/dev9/1/set/temperature_target", "20").await;
        settle().await;

        assert!(dev1.updates().is_empty());

        bus.inject("ezr/dev1/1/set/temperature_target", "20").await;
        settle().await;
        assert_eq!(dev1.updates().len(), 1);

        bridge.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn command_before_discovery_is_dropped() {
        let Setup { mut bridge, dev1, .. } = setup(ScheduleConfig::default());
        dev1.set_offline(true);
        bridge.start().await.unwrap();
        settle().await;
        dev1.set_offline(false);

        bridge
            .bus()
            .inject("ezr/dev1/1/set/temperature_target", "20")
            .await;
        settle().await;

        assert!(dev1.updates().is_empty());
        bridge.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn commands_stop_after_shutdown() {
        let Setup { mut bridge, .. } = setup(ScheduleConfig::default());
        bridge.start().await.unwrap();
        settle().await;
        assert!(bridge.is_running());

        bridge.shutdown().await.unwrap();
        assert!(!bridge.is_running());
        assert!(bridge.bus().inbound.lock().is_none());
    }
}
