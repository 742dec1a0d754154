use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::msgs::JointTrajectoryMsg;
use super::{JointSet, JointTrajectoryPoint, JointValues};
use crate::error::{MotionError, MotionResult};

/// Ordered trajectory points over one joint set with non-decreasing
/// `time_from_start`.
#[derive(Debug, Clone, PartialEq)]
pub struct JointTrajectory {
    joint_set: JointSet,
    points: Arc<[JointTrajectoryPoint]>,
}

impl JointTrajectory {
    pub fn new(joint_set: JointSet, points: Vec<JointTrajectoryPoint>) -> MotionResult<Self> {
        let mut last_time = Duration::ZERO;
        for (i, point) in points.iter().enumerate() {
            if point.time_from_start() < last_time {
                return Err(MotionError::NonMonotonicTime(format!(
                    "time_from_start of point {} ({:?}) is before its predecessor ({:?})",
                    i,
                    point.time_from_start(),
                    last_time
                )));
            }
            last_time = point.time_from_start();

            if point.joint_set() != &joint_set {
                return Err(MotionError::JointSetMismatch(format!(
                    "point {} is defined over {} instead of {}",
                    i,
                    point.joint_set(),
                    joint_set
                )));
            }
        }
        Ok(Self {
            joint_set,
            points: points.into(),
        })
    }

    pub fn empty() -> Self {
        Self {
            joint_set: JointSet::empty(),
            points: Arc::from(Vec::new()),
        }
    }

    pub fn joint_set(&self) -> &JointSet {
        &self.joint_set
    }

    pub fn points(&self) -> &[JointTrajectoryPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JointTrajectoryPoint> {
        self.points.iter()
    }

    pub fn has_velocity(&self) -> bool {
        !self.is_empty() && self.points.iter().all(|p| p.velocities().is_some())
    }

    pub fn has_acceleration(&self) -> bool {
        !self.is_empty() && self.points.iter().all(|p| p.accelerations().is_some())
    }

    pub fn has_effort(&self) -> bool {
        !self.is_empty() && self.points.iter().all(|p| p.efforts().is_some())
    }

    /// Time of the last point.
    pub fn duration(&self) -> Duration {
        self.points
            .last()
            .map(JointTrajectoryPoint::time_from_start)
            .unwrap_or(Duration::ZERO)
    }

    pub fn positions(&self) -> Vec<JointValues> {
        self.points.iter().map(|p| p.positions().clone()).collect()
    }

    pub fn time_from_start(&self) -> Vec<Duration> {
        self.points.iter().map(|p| p.time_from_start()).collect()
    }

    /// State at `time`, interpolated between the enclosing points. Times
    /// outside of the trajectory yield the first or last point.
    pub fn evaluate_at(&self, time: Duration) -> MotionResult<JointTrajectoryPoint> {
        if self.is_empty() {
            return Err(MotionError::InvalidArgument(
                "can not evaluate an empty trajectory".to_string(),
            ));
        }
        if !self.has_velocity() {
            return Err(MotionError::InvalidArgument(
                "evaluating a trajectory requires velocities on every point".to_string(),
            ));
        }

        let index = self.points.partition_point(|p| p.time_from_start() <= time);
        if index == 0 {
            return Ok(self.points[0].clone());
        }
        if index == self.points.len() {
            return Ok(self.points[index - 1].clone());
        }

        let (a, b) = (&self.points[index - 1], &self.points[index]);
        if a.time_from_start() == b.time_from_start() {
            return Ok(b.clone());
        }
        a.interpolate_cubic(b, time)
    }

    /// Sample the trajectory every `step`, always including the final point.
    pub fn resample(&self, step: Duration) -> MotionResult<Self> {
        if step.is_zero() {
            return Err(MotionError::InvalidArgument(
                "resample step must be positive".to_string(),
            ));
        }
        if self.is_empty() {
            return Ok(self.clone());
        }

        let duration = self.duration();
        let mut points = Vec::new();
        let mut time = self.points[0].time_from_start();
        while time < duration {
            points.push(self.evaluate_at(time)?);
            time += step;
        }
        points.push(self.evaluate_at(duration)?);

        Self::new(self.joint_set.clone(), points)
    }

    /// Append `other`, shifted to start where `self` ends.
    pub fn concat(&self, other: &JointTrajectory) -> MotionResult<Self> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        let offset = self.duration();
        let mut points = self.points.to_vec();
        for point in other.iter() {
            points.push(point.add_time_offset(offset)?);
        }
        Self::new(self.joint_set.clone(), points)
    }

    pub fn with_time_offset(&self, offset: Duration) -> MotionResult<Self> {
        let points = self
            .points
            .iter()
            .map(|p| p.add_time_offset(offset))
            .collect::<MotionResult<Vec<_>>>()?;
        Ok(Self {
            joint_set: self.joint_set.clone(),
            points: points.into(),
        })
    }

    /// Stretch time by `factor`. Velocities are divided by the factor and
    /// accelerations by its square so the geometric path is unchanged.
    pub fn scale_time(&self, factor: f64) -> MotionResult<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(MotionError::OutOfRange(format!(
                "time scaling factor {factor} must be finite and positive"
            )));
        }
        let points = self
            .points
            .iter()
            .map(|p| {
                let scaled = p.time_from_start().as_secs_f64() * factor;
                let time_from_start = Duration::try_from_secs_f64(scaled).map_err(|_| {
                    MotionError::OutOfRange(format!(
                        "time {:?} scaled by {factor} is not a valid duration",
                        p.time_from_start()
                    ))
                })?;
                JointTrajectoryPoint::new(
                    time_from_start,
                    p.positions().clone(),
                    p.velocities().map(|v| v / factor),
                    p.accelerations().map(|a| a / (factor * factor)),
                    p.efforts().cloned(),
                )
            })
            .collect::<MotionResult<Vec<_>>>()?;
        Self::new(self.joint_set.clone(), points)
    }

    /// Pointwise merge of trajectories over disjoint joint sets sampled at
    /// identical times.
    pub fn merge(&self, other: &JointTrajectory) -> MotionResult<Self> {
        if self.len() != other.len()
            || self
                .iter()
                .zip(other.iter())
                .any(|(a, b)| a.time_from_start() != b.time_from_start())
        {
            return Err(MotionError::TimeMismatch(
                "trajectories must be sampled at identical times to be merged".to_string(),
            ));
        }
        let points = self
            .iter()
            .zip(other.iter())
            .map(|(a, b)| a.merge(b))
            .collect::<MotionResult<Vec<_>>>()?;
        let joint_set = self.joint_set.union(&other.joint_set);
        Self::new(joint_set, points)
    }

    pub fn transform<F>(&self, f: F) -> MotionResult<Self>
    where
        F: Fn(&JointTrajectoryPoint) -> JointTrajectoryPoint,
    {
        let points: Vec<_> = self.points.iter().map(f).collect();
        let joint_set = points
            .first()
            .map(|p| p.joint_set().clone())
            .unwrap_or_else(|| self.joint_set.clone());
        Self::new(joint_set, points)
    }

    pub fn to_msg(&self) -> MotionResult<JointTrajectoryMsg> {
        Ok(JointTrajectoryMsg {
            joint_names: self.joint_set.names().to_vec(),
            points: self
                .points
                .iter()
                .map(|p| p.to_msg())
                .collect::<MotionResult<Vec<_>>>()?,
        })
    }

    pub fn from_msg(msg: &JointTrajectoryMsg) -> MotionResult<Self> {
        let joint_set = JointSet::new(msg.joint_names.iter().cloned())?;
        let points = msg
            .points
            .iter()
            .map(|p| JointTrajectoryPoint::from_msg(&joint_set, p))
            .collect::<MotionResult<Vec<_>>>()?;
        Self::new(joint_set, points)
    }
}

impl fmt::Display for JointTrajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "JointTrajectory over {} with {} points ({:.3}s)",
            self.joint_set,
            self.len(),
            self.duration().as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn joints(names: &str) -> JointSet {
        JointSet::parse(names).unwrap()
    }

    fn point(names: &str, millis: u64, p: &[f64], v: &[f64]) -> JointTrajectoryPoint {
        JointTrajectoryPoint::new(
            Duration::from_millis(millis),
            JointValues::new(joints(names), p.to_vec()).unwrap(),
            Some(JointValues::new(joints(names), v.to_vec()).unwrap()),
            None,
            None,
        )
        .unwrap()
    }

    fn ramp() -> JointTrajectory {
        JointTrajectory::new(
            joints("j"),
            vec![
                point("j", 0, &[0.0], &[1.0]),
                point("j", 1000, &[2.0], &[-1.0]),
                point("j", 2000, &[2.0], &[0.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_non_monotonic_time_rejected() {
        let result = JointTrajectory::new(
            joints("j"),
            vec![point("j", 1000, &[0.0], &[0.0]), point("j", 500, &[0.0], &[0.0])],
        );
        assert!(matches!(result, Err(MotionError::NonMonotonicTime(_))));
    }

    #[test]
    fn test_foreign_joint_set_rejected() {
        let result = JointTrajectory::new(joints("j"), vec![point("k", 0, &[0.0], &[0.0])]);
        assert!(matches!(result, Err(MotionError::JointSetMismatch(_))));
    }

    #[test]
    fn test_flags_and_duration() {
        let trajectory = ramp();
        assert!(trajectory.has_velocity());
        assert!(!trajectory.has_acceleration());
        assert!(!trajectory.has_effort());
        assert_eq!(trajectory.duration(), Duration::from_secs(2));
        assert!(!JointTrajectory::empty().has_velocity());
    }

    #[test]
    fn test_evaluate_at() {
        let trajectory = ramp();
        let mid = trajectory.evaluate_at(Duration::from_millis(500)).unwrap();
        assert_relative_eq!(mid.positions().values()[0], 1.25, epsilon = 1e-12);

        let end = trajectory.evaluate_at(Duration::from_secs(10)).unwrap();
        assert_eq!(end.positions().values(), &[2.0]);
    }

    #[test]
    fn test_resample_includes_end() {
        let resampled = ramp().resample(Duration::from_millis(300)).unwrap();
        let times: Vec<u128> = resampled.iter().map(|p| p.time_from_start().as_millis()).collect();
        assert_eq!(times, vec![0, 300, 600, 900, 1200, 1500, 1800, 2000]);
    }

    #[test]
    fn test_concat_shifts_second_trajectory() {
        let joined = ramp().concat(&ramp()).unwrap();
        assert_eq!(joined.len(), 6);
        assert_eq!(joined.duration(), Duration::from_secs(4));
        assert_eq!(joined.points()[3].time_from_start(), Duration::from_secs(2));
    }

    #[test]
    fn test_scale_time() {
        let slow = ramp().scale_time(2.0).unwrap();
        assert_eq!(slow.duration(), Duration::from_secs(4));
        assert_eq!(slow.points()[0].velocities().unwrap().values(), &[0.5]);
        assert!(ramp().scale_time(0.0).is_err());
    }

    #[test]
    fn test_time_overflow_is_out_of_range() {
        assert!(matches!(
            ramp().scale_time(1e20),
            Err(MotionError::OutOfRange(_))
        ));

        let late = ramp().with_time_offset(Duration::MAX - Duration::from_secs(3)).unwrap();
        assert!(matches!(
            late.concat(&ramp()),
            Err(MotionError::OutOfRange(_))
        ));
        assert!(matches!(
            late.with_time_offset(Duration::from_secs(5)),
            Err(MotionError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_merge_disjoint_trajectories() {
        let a = ramp();
        let b = JointTrajectory::new(
            joints("k"),
            vec![
                point("k", 0, &[5.0], &[0.0]),
                point("k", 1000, &[6.0], &[0.0]),
                point("k", 2000, &[7.0], &[0.0]),
            ],
        )
        .unwrap();
        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.joint_set().names(), &["j", "k"]);
        assert_eq!(merged.points()[1].positions().values(), &[2.0, 6.0]);

        let shifted = b.with_time_offset(Duration::from_millis(1)).unwrap();
        assert!(matches!(a.merge(&shifted), Err(MotionError::TimeMismatch(_))));
    }

    #[test]
    fn test_msg_round_trip() {
        let trajectory = ramp();
        let msg = trajectory.to_msg().unwrap();
        assert_eq!(msg.joint_names, vec!["j".to_string()]);
        assert_eq!(msg.points[1].time_from_start.secs, 1);
        assert_eq!(JointTrajectory::from_msg(&msg).unwrap(), trajectory);
    }
}
