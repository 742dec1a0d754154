use std::fmt;
use std::time::Duration;

use super::msgs::{DurationMsg, JointTrajectoryPointMsg};
use super::{JointSet, JointValues};
use crate::error::{MotionError, MotionResult};

/// Spans shorter than this are treated as a single instant when interpolating.
const MIN_INTERPOLATION_SPAN: Duration = Duration::from_micros(1);

/// Time stamped joint state. Positions are required, the other fields are
/// optional but always defined over the joint set of the positions.
#[derive(Debug, Clone, PartialEq)]
pub struct JointTrajectoryPoint {
    time_from_start: Duration,
    positions: JointValues,
    velocities: Option<JointValues>,
    accelerations: Option<JointValues>,
    efforts: Option<JointValues>,
}

impl JointTrajectoryPoint {
    pub fn new(
        time_from_start: Duration,
        positions: JointValues,
        velocities: Option<JointValues>,
        accelerations: Option<JointValues>,
        efforts: Option<JointValues>,
    ) -> MotionResult<Self> {
        for (field, values) in [
            ("velocities", &velocities),
            ("accelerations", &accelerations),
            ("efforts", &efforts),
        ] {
            if let Some(values) = values {
                if values.joint_set() != positions.joint_set() {
                    return Err(MotionError::JointSetMismatch(format!(
                        "{} over {} but positions over {}",
                        field,
                        values.joint_set(),
                        positions.joint_set()
                    )));
                }
            }
        }
        Ok(Self {
            time_from_start,
            positions,
            velocities,
            accelerations,
            efforts,
        })
    }

    pub fn from_positions(time_from_start: Duration, positions: JointValues) -> Self {
        Self {
            time_from_start,
            positions,
            velocities: None,
            accelerations: None,
            efforts: None,
        }
    }

    pub fn time_from_start(&self) -> Duration {
        self.time_from_start
    }

    pub fn joint_set(&self) -> &JointSet {
        self.positions.joint_set()
    }

    pub fn positions(&self) -> &JointValues {
        &self.positions
    }

    pub fn velocities(&self) -> Option<&JointValues> {
        self.velocities.as_ref()
    }

    pub fn accelerations(&self) -> Option<&JointValues> {
        self.accelerations.as_ref()
    }

    pub fn efforts(&self) -> Option<&JointValues> {
        self.efforts.as_ref()
    }

    pub fn add_time_offset(&self, offset: Duration) -> MotionResult<Self> {
        let time_from_start = self.time_from_start.checked_add(offset).ok_or_else(|| {
            MotionError::OutOfRange(format!(
                "time offset {:?} overflows {:?}",
                offset, self.time_from_start
            ))
        })?;
        Ok(self.with_time_from_start(time_from_start))
    }

    pub fn with_time_from_start(&self, time_from_start: Duration) -> Self {
        Self {
            time_from_start,
            ..self.clone()
        }
    }

    /// Combine points over disjoint joint sets into one point.
    pub fn merge(&self, other: &JointTrajectoryPoint) -> MotionResult<Self> {
        self.merge_all(std::iter::once(other))
    }

    pub fn merge_all<'a, I>(&self, others: I) -> MotionResult<Self>
    where
        I: IntoIterator<Item = &'a JointTrajectoryPoint>,
    {
        let mut positions = self.positions.clone();
        let mut velocities = self.velocities.clone();
        let mut accelerations = self.accelerations.clone();
        let mut efforts = self.efforts.clone();

        for other in others {
            if other.time_from_start != self.time_from_start {
                return Err(MotionError::TimeMismatch(format!(
                    "can not merge points at {:?} and {:?}",
                    self.time_from_start, other.time_from_start
                )));
            }
            positions = positions.merge(&other.positions)?;
            velocities = merge_optional("velocities", velocities, other.velocities.as_ref())?;
            accelerations =
                merge_optional("accelerations", accelerations, other.accelerations.as_ref())?;
            efforts = merge_optional("efforts", efforts, other.efforts.as_ref())?;
        }

        Self::new(
            self.time_from_start,
            positions,
            velocities,
            accelerations,
            efforts,
        )
    }

    /// Cubic Hermite interpolation towards `other` at `time`.
    ///
    /// Both points need velocities unless they are less than a microsecond
    /// apart, in which case `other` is returned as is. The query time is
    /// clamped to the span between the points and the result only carries
    /// positions and velocities.
    pub fn interpolate_cubic(
        &self,
        other: &JointTrajectoryPoint,
        time: Duration,
    ) -> MotionResult<Self> {
        if self.joint_set() != other.joint_set() {
            return Err(MotionError::JointSetMismatch(format!(
                "can not interpolate between {} and {}",
                self.joint_set(),
                other.joint_set()
            )));
        }
        if other.time_from_start <= self.time_from_start {
            return Err(MotionError::NonMonotonicTime(format!(
                "interpolation target at {:?} is not after {:?}",
                other.time_from_start, self.time_from_start
            )));
        }
        let span = other.time_from_start - self.time_from_start;
        if span < MIN_INTERPOLATION_SPAN {
            return Ok(other.clone());
        }
        let (Some(vel0), Some(vel1)) = (&self.velocities, &other.velocities) else {
            return Err(MotionError::InvalidArgument(
                "cubic interpolation requires velocities on both points".to_string(),
            ));
        };

        let dt = span.as_secs_f64();
        let tau = time
            .saturating_sub(self.time_from_start)
            .as_secs_f64()
            .clamp(0.0, dt);

        let count = self.positions.len();
        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);
        for i in 0..count {
            let p0 = self.positions.values()[i];
            let p1 = other.positions.values()[i];
            let v0 = vel0.values()[i];
            let v1 = vel1.values()[i];

            let c = (-3.0 * p0 + 3.0 * p1 - 2.0 * dt * v0 - dt * v1) / (dt * dt);
            let d = (2.0 * p0 - 2.0 * p1 + dt * v0 + dt * v1) / (dt * dt * dt);

            positions.push(p0 + v0 * tau + c * tau * tau + d * tau * tau * tau);
            velocities.push(v0 + 2.0 * c * tau + 3.0 * d * tau * tau);
        }

        let joint_set = self.joint_set().clone();
        Self::new(
            time,
            JointValues::new(joint_set.clone(), positions)?,
            Some(JointValues::new(joint_set, velocities)?),
            None,
            None,
        )
    }

    pub fn to_msg(&self) -> MotionResult<JointTrajectoryPointMsg> {
        let to_vec = |values: Option<&JointValues>| {
            values.map(|v| v.values().to_vec()).unwrap_or_default()
        };
        Ok(JointTrajectoryPointMsg {
            positions: self.positions.values().to_vec(),
            velocities: to_vec(self.velocities()),
            accelerations: to_vec(self.accelerations()),
            effort: to_vec(self.efforts()),
            time_from_start: DurationMsg::try_from(self.time_from_start)?,
        })
    }

    /// Empty optional arrays in the message mean "not present".
    pub fn from_msg(joint_set: &JointSet, msg: &JointTrajectoryPointMsg) -> MotionResult<Self> {
        let optional = |values: &[f64]| -> MotionResult<Option<JointValues>> {
            if values.is_empty() {
                Ok(None)
            } else {
                JointValues::new(joint_set.clone(), values.to_vec()).map(Some)
            }
        };
        Self::new(
            Duration::try_from(msg.time_from_start)?,
            JointValues::new(joint_set.clone(), msg.positions.clone())?,
            optional(&msg.velocities)?,
            optional(&msg.accelerations)?,
            optional(&msg.effort)?,
        )
    }
}

fn merge_optional(
    field: &str,
    accumulated: Option<JointValues>,
    other: Option<&JointValues>,
) -> MotionResult<Option<JointValues>> {
    match (accumulated, other) {
        (None, None) => Ok(None),
        (Some(a), Some(b)) => a.merge(b).map(Some),
        _ => Err(MotionError::MergeConflict(format!(
            "{field} are defined on only some of the merged points"
        ))),
    }
}

impl fmt::Display for JointTrajectoryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "JointTrajectoryPoint at {:.6}s:",
            self.time_from_start.as_secs_f64()
        )?;
        write!(f, "positions = {}", self.positions)?;
        if let Some(v) = &self.velocities {
            write!(f, "velocities = {v}")?;
        }
        if let Some(a) = &self.accelerations {
            write!(f, "accelerations = {a}")?;
        }
        if let Some(e) = &self.efforts {
            write!(f, "efforts = {e}")?;
        }
        Ok(())
    }
}
