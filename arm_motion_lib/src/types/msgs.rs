//! Wire representations exchanged with the motion services.
//!
//! Durations travel as `(secs, nsecs)` with microsecond resolution.

use nalgebra::{Quaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Pose;
use crate::error::{MotionError, MotionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationMsg {
    pub secs: i64,
    pub nsecs: i64,
}

impl TryFrom<Duration> for DurationMsg {
    type Error = MotionError;

    fn try_from(duration: Duration) -> Result<Self, Self::Error> {
        let secs = i64::try_from(duration.as_secs()).map_err(|_| {
            MotionError::OutOfRange(format!("duration {duration:?} exceeds the message range"))
        })?;
        Ok(Self {
            secs,
            nsecs: i64::from(duration.subsec_micros()) * 1000,
        })
    }
}

impl TryFrom<DurationMsg> for Duration {
    type Error = MotionError;

    fn try_from(msg: DurationMsg) -> Result<Self, Self::Error> {
        let total_micros = msg.secs as i128 * 1_000_000 + msg.nsecs as i128 / 1000;
        if total_micros < 0 {
            return Err(MotionError::OutOfRange(format!(
                "negative duration {}s {}ns",
                msg.secs, msg.nsecs
            )));
        }
        let micros = u64::try_from(total_micros).map_err(|_| {
            MotionError::OutOfRange(format!(
                "duration {}s {}ns exceeds the supported range",
                msg.secs, msg.nsecs
            ))
        })?;
        Ok(Duration::from_micros(micros))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointTrajectoryPointMsg {
    pub positions: Vec<f64>,
    #[serde(default)]
    pub velocities: Vec<f64>,
    #[serde(default)]
    pub accelerations: Vec<f64>,
    #[serde(default)]
    pub effort: Vec<f64>,
    pub time_from_start: DurationMsg,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointTrajectoryMsg {
    pub joint_names: Vec<String>,
    pub points: Vec<JointTrajectoryPointMsg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointMsg {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuaternionMsg {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for QuaternionMsg {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseMsg {
    pub position: PointMsg,
    pub orientation: QuaternionMsg,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseStampedMsg {
    pub frame_id: String,
    pub pose: PoseMsg,
}

impl Pose {
    pub fn to_pose_msg(&self) -> PoseMsg {
        let t = self.translation();
        let q = self.rotation().quaternion();
        PoseMsg {
            position: PointMsg {
                x: t.x,
                y: t.y,
                z: t.z,
            },
            orientation: QuaternionMsg {
                x: q.i,
                y: q.j,
                z: q.k,
                w: q.w,
            },
        }
    }

    pub fn to_pose_stamped_msg(&self) -> PoseStampedMsg {
        PoseStampedMsg {
            frame_id: self.frame_id().to_string(),
            pose: self.to_pose_msg(),
        }
    }

    /// Pose messages carry no frame, the default frame is assumed.
    pub fn from_pose_msg(msg: &PoseMsg) -> MotionResult<Self> {
        Self::from_pose_msg_in_frame(msg, super::pose::DEFAULT_FRAME_ID)
    }

    pub fn from_pose_stamped_msg(msg: &PoseStampedMsg) -> MotionResult<Self> {
        Self::from_pose_msg_in_frame(&msg.pose, &msg.frame_id)
    }

    fn from_pose_msg_in_frame(msg: &PoseMsg, frame_id: &str) -> MotionResult<Self> {
        let o = &msg.orientation;
        Pose::from_parts(
            Vector3::new(msg.position.x, msg.position.y, msg.position.z),
            Quaternion::new(o.w, o.x, o.y, o.z),
            frame_id,
            true,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::UnitQuaternion;

    #[test]
    fn test_duration_microsecond_resolution() {
        let msg = DurationMsg::try_from(Duration::new(2, 123_456_789)).unwrap();
        assert_eq!(msg, DurationMsg { secs: 2, nsecs: 123_456_000 });

        let decoded = Duration::try_from(DurationMsg { secs: 1, nsecs: 999_999 }).unwrap();
        assert_eq!(decoded, Duration::from_micros(1_000_999));
    }

    #[test]
    fn test_negative_duration_rejected() {
        assert!(Duration::try_from(DurationMsg { secs: -1, nsecs: 0 }).is_err());
    }

    #[test]
    fn test_duration_overflow_rejected() {
        let decoded = Duration::try_from(DurationMsg {
            secs: i64::MAX,
            nsecs: 0,
        });
        assert!(matches!(decoded, Err(MotionError::OutOfRange(_))));

        let encoded = DurationMsg::try_from(Duration::from_secs(u64::MAX));
        assert!(matches!(encoded, Err(MotionError::OutOfRange(_))));

        let largest = u64::MAX / 1_000_000;
        let msg = DurationMsg {
            secs: largest as i64,
            nsecs: 0,
        };
        assert_eq!(Duration::try_from(msg).unwrap(), Duration::from_secs(largest));
    }

    #[test]
    fn test_pose_stamped_json() {
        let pose = Pose::new(
            Vector3::new(0.1, 0.2, 0.3),
            UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5),
        )
        .with_frame_id("base_link");
        let json = serde_json::to_string(&pose.to_pose_stamped_msg()).unwrap();
        assert!(json.contains("\"frame_id\":\"base_link\""));

        let msg: PoseStampedMsg = serde_json::from_str(&json).unwrap();
        let decoded = Pose::from_pose_stamped_msg(&msg).unwrap();
        assert!(decoded.is_close(&pose, 1e-12));
    }

    #[test]
    fn test_point_msg_optional_fields_default() {
        let json = r#"{"positions":[1.0],"time_from_start":{"secs":0,"nsecs":5000}}"#;
        let msg: JointTrajectoryPointMsg = serde_json::from_str(json).unwrap();
        assert!(msg.velocities.is_empty());
        assert_eq!(msg.time_from_start.nsecs, 5000);
    }
}
