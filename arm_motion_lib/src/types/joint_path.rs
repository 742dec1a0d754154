use std::sync::Arc;

use super::{JointSet, JointValues};
use crate::error::{MotionError, MotionResult};

/// Sequence of joint configurations over one joint set.
#[derive(Debug, Clone, PartialEq)]
pub struct JointPath {
    joint_set: JointSet,
    points: Arc<[JointValues]>,
}

impl JointPath {
    /// Points defined over the same joints in a different order are
    /// reordered to `joint_set`.
    pub fn new(joint_set: JointSet, points: Vec<JointValues>) -> MotionResult<Self> {
        let points = points
            .into_iter()
            .map(|point| align(&joint_set, point))
            .collect::<MotionResult<Vec<_>>>()?;
        Ok(Self {
            joint_set,
            points: points.into(),
        })
    }

    pub fn from_one_point(point: JointValues) -> Self {
        Self {
            joint_set: point.joint_set().clone(),
            points: Arc::from(vec![point]),
        }
    }

    pub fn from_start_stop_point(start: JointValues, stop: JointValues) -> MotionResult<Self> {
        let joint_set = start.joint_set().clone();
        Self::new(joint_set, vec![start, stop])
    }

    pub fn joint_set(&self) -> &JointSet {
        &self.joint_set
    }

    pub fn points(&self) -> &[JointValues] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&JointValues> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&JointValues> {
        self.points.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JointValues> {
        self.points.iter()
    }

    pub fn prepend(&self, point: JointValues) -> MotionResult<Self> {
        let mut points = vec![align(&self.joint_set, point)?];
        points.extend(self.points.iter().cloned());
        Ok(Self {
            joint_set: self.joint_set.clone(),
            points: points.into(),
        })
    }

    pub fn append(&self, point: JointValues) -> MotionResult<Self> {
        let mut points = self.points.to_vec();
        points.push(align(&self.joint_set, point)?);
        Ok(Self {
            joint_set: self.joint_set.clone(),
            points: points.into(),
        })
    }

    pub fn concat(&self, other: &JointPath) -> MotionResult<Self> {
        let mut points = self.points.to_vec();
        for point in other.iter() {
            points.push(align(&self.joint_set, point.clone())?);
        }
        Ok(Self {
            joint_set: self.joint_set.clone(),
            points: points.into(),
        })
    }

    pub fn transform<F>(&self, f: F) -> Self
    where
        F: Fn(&JointValues) -> JointValues,
    {
        Self {
            joint_set: self.joint_set.clone(),
            points: self.points.iter().map(f).collect(),
        }
    }
}

fn align(joint_set: &JointSet, point: JointValues) -> MotionResult<JointValues> {
    if point.joint_set() == joint_set {
        Ok(point)
    } else if point.joint_set().is_similar(joint_set) {
        point.reorder(joint_set)
    } else {
        Err(MotionError::JointSetMismatch(format!(
            "path point over {} does not match path joints {}",
            point.joint_set(),
            joint_set
        )))
    }
}
