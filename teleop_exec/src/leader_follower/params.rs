//! Parameters structure for leader-follower control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::LeaderFollowerError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for leader-follower control. Per-joint lists must all match the follower's joint
/// count.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Offset added to each leader joint to move its zero onto the follower's.
    ///
    /// Units: radians
    pub angle_offsets_rad: Vec<f64>,

    /// Units: radians
    pub home_position_rad: Vec<f64>,

    /// Units: seconds
    #[serde(default)]
    pub home_duration_s: Option<f64>,

    /// Largest leader-follower difference per joint at which following may begin.
    ///
    /// Units: degrees
    pub allowed_diff_deg: Vec<f64>,

    /// Time in alignment after which the misaligned joints are reported.
    ///
    /// Units: seconds
    #[serde(default = "default_alignment_timeout_s")]
    pub alignment_timeout_s: f64,

    /// Minimum time between repeated alignment warnings.
    ///
    /// Units: seconds
    #[serde(default = "default_alignment_warning_period_s")]
    pub alignment_warning_period_s: f64,

    /// Units: seconds
    #[serde(default = "default_disconnect_timeout_s")]
    pub disconnect_timeout_s: f64,

    /// Duration given to each following goal. `None` sends the leader position as-is.
    ///
    /// Units: seconds
    #[serde(default)]
    pub follow_duration_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

fn default_alignment_timeout_s() -> f64 {
    10.0
}

fn default_alignment_warning_period_s() -> f64 {
    2.0
}

fn default_disconnect_timeout_s() -> f64 {
    1.0
}

impl Params {
    pub fn validate(&self, num_joints: usize) -> Result<(), LeaderFollowerError> {
        let lists = [
            ("angle_offsets_rad", self.angle_offsets_rad.len()),
            ("home_position_rad", self.home_position_rad.len()),
            ("allowed_diff_deg", self.allowed_diff_deg.len()),
        ];

        for (name, len) in lists {
            if len != num_joints {
                return Err(LeaderFollowerError::InvalidParams(format!(
                    "{} has {} entries but the follower has {} joints",
                    name, len, num_joints
                )));
            }
        }

        if self.allowed_diff_deg.iter().any(|d| *d < 0.0) {
            return Err(LeaderFollowerError::InvalidParams(
                "allowed_diff_deg entries must not be negative".into(),
            ));
        }

        Ok(())
    }
}
