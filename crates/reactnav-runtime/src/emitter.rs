//! [`CommandEmitter`] – the single exit point for velocity commands.
//!
//! Every command the controller produces leaves the process through one
//! emitter wrapping one [`DriveBase`].  A cycle that produces no command does
//! not touch the emitter, so whatever was last emitted stays in effect.

use reactnav_hal::DriveBase;
use reactnav_types::{NavError, VelocityCommand};
use tracing::debug;

pub struct CommandEmitter {
    drive_base: Box<dyn DriveBase>,
    last: Option<VelocityCommand>,
    emitted: u64,
}

impl CommandEmitter {
    pub fn new(drive_base: Box<dyn DriveBase>) -> Self {
        Self {
            drive_base,
            last: None,
            emitted: 0,
        }
    }

    /// Forward `cmd` to the drive base.
    ///
    /// # Errors
    ///
    /// Propagates the drive base error; the previously emitted command is
    /// still reported as the one in effect.
    pub fn emit(&mut self, cmd: VelocityCommand) -> Result<(), NavError> {
        self.drive_base.drive(cmd)?;
        debug!(
            drive_base = self.drive_base.id(),
            linear = cmd.linear_velocity,
            angular = cmd.angular_velocity,
            "cmd_vel"
        );
        self.last = Some(cmd);
        self.emitted += 1;
        Ok(())
    }

    /// Emit a zero-velocity command.
    pub fn stop(&mut self) -> Result<(), NavError> {
        self.emit(VelocityCommand::STOP)
    }

    /// The command currently in effect, if any was emitted.
    pub fn last_command(&self) -> Option<VelocityCommand> {
        self.last
    }

    /// Number of commands successfully emitted.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}
