//! # Teach and repeat telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::StructOpt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command to the teach and repeat control thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, StructOpt)]
#[structopt(name = "teach_repeat", no_version)]
pub enum TeachRepeatCmd {
    /// Record the current arm position as a waypoint.
    #[structopt(name = "add")]
    AddWaypoint,

    /// Record a waypoint, toggle the gripper, then record a second waypoint so the gripper has
    /// time to actuate during playback.
    #[structopt(name = "add-toggle")]
    AddWaypointToggle,

    /// Forget all recorded waypoints.
    #[structopt(name = "clear")]
    ClearWaypoints,

    /// Start playing back the recorded waypoints in a loop.
    #[structopt(name = "play")]
    StartPlayback,

    /// Stop playback and return to training.
    #[structopt(name = "train")]
    ReturnToTraining,

    /// Stop the control thread.
    #[structopt(name = "quit")]
    Quit,
}

/// Operating mode of the teach and repeat controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    Training,
    Playback,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the controller, sent back to the user interface after each command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeachRepeatStatus {
    pub mode: RunMode,

    pub num_waypoints: usize,

    /// Index of the next waypoint to be commanded during playback.
    pub playback_index: usize,

    /// False if the last command was rejected in the current mode.
    pub last_cmd_accepted: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TeachRepeatCmd {
    /// Parse a command typed at the prompt, e.g. `add-toggle`.
    pub fn parse_line(line: &str) -> Result<Self, structopt::clap::Error> {
        Self::from_iter_safe(std::iter::once("teach_repeat").chain(line.split_whitespace()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(TeachRepeatCmd::parse_line("add").unwrap(), TeachRepeatCmd::AddWaypoint);
        assert_eq!(
            TeachRepeatCmd::parse_line("  add-toggle ").unwrap(),
            TeachRepeatCmd::AddWaypointToggle
        );
        assert_eq!(TeachRepeatCmd::parse_line("play").unwrap(), TeachRepeatCmd::StartPlayback);
        assert_eq!(TeachRepeatCmd::parse_line("quit").unwrap(), TeachRepeatCmd::Quit);
        assert!(TeachRepeatCmd::parse_line("dance").is_err());
    }
}
