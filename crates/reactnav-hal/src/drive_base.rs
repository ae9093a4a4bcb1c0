//! Generic `DriveBase` trait for anything that executes `cmd_vel`.

use reactnav_types::{NavError, VelocityCommand};

/// A differential-drive base (or anything standing in for one).
pub trait DriveBase: Send + Sync {
    /// Stable identifier, e.g. `"drive_base"`.
    fn id(&self) -> &str;

    /// Apply `cmd` until the next command arrives.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::HardwareFault`] if the command cannot be applied.
    fn drive(&mut self, cmd: VelocityCommand) -> Result<(), NavError>;

    /// The command currently in effect, if any has been applied.
    fn last_command(&self) -> Option<VelocityCommand>;
}
