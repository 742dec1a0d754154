use serde::{Deserialize, Serialize};
use std::fmt;

use super::{JointSet, JointValues};
use crate::error::{MotionError, MotionResult};

/// A limit given either for all joints at once or per joint.
///
/// `None` stands for "no constraint" and is stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub enum LimitValues {
    Broadcast(f64),
    PerJoint(Vec<f64>),
}

impl From<f64> for LimitValues {
    fn from(value: f64) -> Self {
        LimitValues::Broadcast(value)
    }
}

impl From<Option<f64>> for LimitValues {
    fn from(value: Option<f64>) -> Self {
        LimitValues::Broadcast(value.unwrap_or(f64::NAN))
    }
}

impl From<Vec<f64>> for LimitValues {
    fn from(values: Vec<f64>) -> Self {
        LimitValues::PerJoint(values)
    }
}

impl From<&[f64]> for LimitValues {
    fn from(values: &[f64]) -> Self {
        LimitValues::PerJoint(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for LimitValues {
    fn from(values: [f64; N]) -> Self {
        LimitValues::PerJoint(values.to_vec())
    }
}

impl LimitValues {
    fn expand(self, what: &'static str, count: usize) -> MotionResult<Vec<f64>> {
        match self {
            LimitValues::Broadcast(value) => Ok(vec![value; count]),
            LimitValues::PerJoint(values) if values.len() == count => Ok(values),
            LimitValues::PerJoint(values) => Err(MotionError::LengthMismatch {
                what,
                expected: count,
                actual: values.len(),
            }),
        }
    }
}

/// Velocity, acceleration and position bounds per joint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "JointLimitsRepr", into = "JointLimitsRepr")]
pub struct JointLimits {
    joint_set: JointSet,
    max_velocity: Vec<f64>,
    max_acceleration: Vec<f64>,
    min_position: Vec<f64>,
    max_position: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct JointLimitsRepr {
    joint_set: JointSet,
    max_velocity: Vec<f64>,
    max_acceleration: Vec<f64>,
    min_position: Vec<f64>,
    max_position: Vec<f64>,
}

impl TryFrom<JointLimitsRepr> for JointLimits {
    type Error = MotionError;

    fn try_from(repr: JointLimitsRepr) -> Result<Self, Self::Error> {
        JointLimits::new(
            repr.joint_set,
            repr.max_velocity,
            repr.max_acceleration,
            repr.min_position,
            repr.max_position,
        )
    }
}

impl From<JointLimits> for JointLimitsRepr {
    fn from(limits: JointLimits) -> Self {
        JointLimitsRepr {
            joint_set: limits.joint_set,
            max_velocity: limits.max_velocity,
            max_acceleration: limits.max_acceleration,
            min_position: limits.min_position,
            max_position: limits.max_position,
        }
    }
}

impl JointLimits {
    pub fn new(
        joint_set: JointSet,
        max_velocity: impl Into<LimitValues>,
        max_acceleration: impl Into<LimitValues>,
        min_position: impl Into<LimitValues>,
        max_position: impl Into<LimitValues>,
    ) -> MotionResult<Self> {
        let count = joint_set.count();
        Ok(Self {
            max_velocity: max_velocity.into().expand("max_velocity", count)?,
            max_acceleration: max_acceleration.into().expand("max_acceleration", count)?,
            min_position: min_position.into().expand("min_position", count)?,
            max_position: max_position.into().expand("max_position", count)?,
            joint_set,
        })
    }

    /// Limits without any constraint.
    pub fn unconstrained(joint_set: JointSet) -> Self {
        let count = joint_set.count();
        Self {
            joint_set,
            max_velocity: vec![f64::NAN; count],
            max_acceleration: vec![f64::NAN; count],
            min_position: vec![f64::NAN; count],
            max_position: vec![f64::NAN; count],
        }
    }

    pub fn joint_set(&self) -> &JointSet {
        &self.joint_set
    }

    pub fn max_velocity(&self) -> &[f64] {
        &self.max_velocity
    }

    pub fn max_acceleration(&self) -> &[f64] {
        &self.max_acceleration
    }

    pub fn min_position(&self) -> &[f64] {
        &self.min_position
    }

    pub fn max_position(&self) -> &[f64] {
        &self.max_position
    }

    pub fn len(&self) -> usize {
        self.joint_set.count()
    }

    pub fn is_empty(&self) -> bool {
        self.joint_set.is_empty()
    }

    /// Limits of the named joints, in the given order.
    pub fn select<I, S>(&self, names: I) -> MotionResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joint_set = JointSet::new(names.into_iter().map(|n| n.as_ref().to_string()))?;
        let indices = joint_set
            .iter()
            .map(|name| self.joint_set.index_of(name))
            .collect::<MotionResult<Vec<usize>>>()?;
        let pick = |source: &[f64]| indices.iter().map(|&i| source[i]).collect::<Vec<f64>>();

        Ok(Self {
            max_velocity: pick(&self.max_velocity),
            max_acceleration: pick(&self.max_acceleration),
            min_position: pick(&self.min_position),
            max_position: pick(&self.max_position),
            joint_set,
        })
    }

    /// Velocity and acceleration limits multiplied by the given factors.
    pub fn scaled(&self, velocity_scaling: f64, acceleration_scaling: f64) -> Self {
        Self {
            joint_set: self.joint_set.clone(),
            max_velocity: self.max_velocity.iter().map(|v| v * velocity_scaling).collect(),
            max_acceleration: self
                .max_acceleration
                .iter()
                .map(|a| a * acceleration_scaling)
                .collect(),
            min_position: self.min_position.clone(),
            max_position: self.max_position.clone(),
        }
    }

    /// Check joint positions against the position bounds. NaN bounds are skipped.
    pub fn validate_positions(&self, positions: &JointValues) -> MotionResult<()> {
        for (name, position) in positions.joint_set().iter().zip(positions.iter()) {
            let Some(i) = self.joint_set.try_index_of(name) else {
                continue;
            };
            let (min, max) = (self.min_position[i], self.max_position[i]);
            if (!min.is_nan() && position < min) || (!max.is_nan() && position > max) {
                return Err(MotionError::OutOfRange(format!(
                    "joint {} position {:.4} outside limits [{:.4}, {:.4}]",
                    name, position, min, max
                )));
            }
        }
        Ok(())
    }
}

fn nan_eq(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
}

impl PartialEq for JointLimits {
    fn eq(&self, other: &Self) -> bool {
        self.joint_set == other.joint_set
            && nan_eq(&self.max_velocity, &other.max_velocity)
            && nan_eq(&self.max_acceleration, &other.max_acceleration)
            && nan_eq(&self.min_position, &other.min_position)
            && nan_eq(&self.max_position, &other.max_position)
    }
}

impl fmt::Display for JointLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "JointLimits:")?;
        for (i, name) in self.joint_set.iter().enumerate() {
            writeln!(
                f,
                "  {} : max velocity={} max acceleration={} min position={} max position={}",
                name,
                self.max_velocity[i],
                self.max_acceleration[i],
                self.min_position[i],
                self.max_position[i]
            )?;
        }
        Ok(())
    }
}
