//! Headless, typed, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the others.
//!
//! # Topics
//!
//! | Topic | Typical traffic |
//! |---|---|
//! | [`Topic::Scan`] | One [`ScanFrame`][reactnav_types::ScanFrame] per laser sweep |
//! | [`Topic::TargetDetection`] | Detector output, present or absent |
//! | [`Topic::CmdVel`] | Velocity commands leaving the controller |
//! | [`Topic::SystemAlerts`] | Hit-mode transitions and controller faults |

use reactnav_types::{Event, NavError};
use tokio::sync::broadcast;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Routing lanes on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Laser sweeps, in arrival order.
    Scan,
    /// Target detector results.
    TargetDetection,
    /// Velocity commands for the drive base.
    CmdVel,
    /// Mode changes and faults.
    SystemAlerts,
}

/// Shared event bus. Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    scan: broadcast::Sender<Event>,
    target_detection: broadcast::Sender<Event>,
    cmd_vel: broadcast::Sender<Event>,
    system_alerts: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// The `capacity` is applied to every topic channel independently.
    pub fn new(capacity: usize) -> Self {
        let (scan, _) = broadcast::channel(capacity);
        let (target_detection, _) = broadcast::channel(capacity);
        let (cmd_vel, _) = broadcast::channel(capacity);
        let (system_alerts, _) = broadcast::channel(capacity);
        Self {
            scan,
            target_detection,
            cmd_vel,
            system_alerts,
        }
    }

    /// Publish `event` to the given [`Topic`] channel.
    ///
    /// Returns the number of active receivers that were handed the event.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Channel`] when nobody is subscribed to `topic`.
    pub fn publish_to(&self, topic: Topic, event: Event) -> Result<usize, NavError> {
        self.topic_sender(topic)
            .send(event)
            .map_err(|_| NavError::Channel(format!("no subscribers for topic {topic:?}")))
    }

    /// Subscribe to a specific [`Topic`] channel.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Scan => &self.scan,
            Topic::TargetDetection => &self.target_detection,
            Topic::CmdVel => &self.cmd_vel,
            Topic::SystemAlerts => &self.system_alerts,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Topic-based receiver
// ---------------------------------------------------------------------------

/// An async receiver bound to a single [`Topic`] channel.
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Wait for the next event on this topic.
    ///
    /// Returns:
    /// * `Ok(event)` – a successfully received event.
    /// * `Err(broadcast::error::RecvError::Lagged(n))` – the subscriber fell
    ///   behind and `n` messages were dropped.  The caller decides whether to
    ///   continue or abort.
    /// * `Err(broadcast::error::RecvError::Closed)` – the bus has shut down.
    pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    /// The [`Topic`] this receiver is bound to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactnav_types::{EventPayload, ScanFrame, VelocityCommand};

    fn scan_event(source: &str) -> Event {
        Event::new(source, EventPayload::Scan(ScanFrame::uniform(8, 2.0)))
    }

    #[test]
    fn publish_without_subscribers_is_a_channel_error() {
        let bus = EventBus::default();
        let result = bus.publish_to(Topic::Scan, scan_event("test"));
        assert!(matches!(result, Err(NavError::Channel(_))));
    }

    #[tokio::test]
    async fn topic_multiple_subscribers_receive_same_event() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let mut subscriber1 = bus.subscribe_to(Topic::Scan);
        let mut subscriber2 = bus.subscribe_to(Topic::Scan);

        let event = scan_event("lidar");
        assert_eq!(bus.publish_to(Topic::Scan, event.clone())?, 2);

        assert_eq!(subscriber1.recv().await?.id, event.id);
        assert_eq!(subscriber2.recv().await?.id, event.id);
        Ok(())
    }

    /// Topics are routed through separate channels.
    #[tokio::test]
    async fn subscriber_does_not_receive_other_topic_events() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let mut alerts = bus.subscribe_to(Topic::SystemAlerts);
        let mut cmd_vel = bus.subscribe_to(Topic::CmdVel);

        bus.publish_to(
            Topic::CmdVel,
            Event::new("controller", EventPayload::Command(VelocityCommand::STOP)),
        )?;

        let received = cmd_vel.recv().await?;
        assert!(matches!(received.payload, EventPayload::Command(c) if c == VelocityCommand::STOP));
        assert_eq!(cmd_vel.topic(), Topic::CmdVel);

        let result = tokio::time::timeout(std::time::Duration::from_millis(50), alerts.recv()).await;
        assert!(result.is_err(), "SystemAlerts must not receive a CmdVel event");
        Ok(())
    }

    /// Flooding a small channel while a subscriber sleeps yields `Lagged`.
    #[tokio::test]
    async fn slow_subscriber_lags() {
        let bus = EventBus::new(16);
        let mut slow = bus.subscribe_to(Topic::Scan);

        for _ in 0..100 {
            let _ = bus.publish_to(Topic::Scan, scan_event("flood"));
        }

        let result = slow.recv().await;
        assert!(
            matches!(result, Err(broadcast::error::RecvError::Lagged(_))),
            "expected Lagged error, got: {result:?}"
        );
        // After the lag report the receiver resumes with retained events.
        assert!(slow.recv().await.is_ok());
    }
}
