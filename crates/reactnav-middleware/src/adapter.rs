//! Bus-backed drive base.
//!
//! The controller never speaks to motor drivers directly.  [`BusDriveBase`]
//! turns every command into an [`EventPayload::Command`] on [`Topic::CmdVel`],
//! where whichever adapter owns the physical base picks it up.

use reactnav_hal::DriveBase;
use reactnav_types::{Event, EventPayload, NavError, VelocityCommand};
use tracing::trace;

use crate::bus::{EventBus, Topic};

pub struct BusDriveBase {
    id: String,
    bus: EventBus,
    last: Option<VelocityCommand>,
}

impl BusDriveBase {
    pub fn new(id: impl Into<String>, bus: EventBus) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            bus,
            last: None,
        })
    }
}

impl DriveBase for BusDriveBase {
    fn id(&self) -> &str {
        &self.id
    }

    /// Commands are fire-and-forget: with nobody listening on `CmdVel` the
    /// command is still recorded as the one in effect.
    fn drive(&mut self, cmd: VelocityCommand) -> Result<(), NavError> {
        let event = Event::new(self.id.clone(), EventPayload::Command(cmd));
        match self.bus.publish_to(Topic::CmdVel, event) {
            Ok(n) => trace!(receivers = n, "cmd_vel published"),
            Err(NavError::Channel(_)) => trace!("cmd_vel has no subscribers"),
            Err(e) => return Err(e),
        }
        self.last = Some(cmd);
        Ok(())
    }

    fn last_command(&self) -> Option<VelocityCommand> {
        self.last
    }
}
