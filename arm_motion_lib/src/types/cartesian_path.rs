use nalgebra::{UnitQuaternion, Vector3};
use std::sync::Arc;

use super::Pose;

/// Sequence of poses, typically the waypoints of an end effector.
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianPath {
    points: Arc<[Pose]>,
}

impl CartesianPath {
    pub fn new(points: Vec<Pose>) -> Self {
        Self {
            points: points.into(),
        }
    }

    pub fn from_one_point(point: Pose) -> Self {
        Self::new(vec![point])
    }

    pub fn from_start_stop_point(start: Pose, stop: Pose) -> Self {
        Self::new(vec![start, stop])
    }

    pub fn points(&self) -> &[Pose] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Pose> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Pose> {
        self.points.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pose> {
        self.points.iter()
    }

    pub fn positions(&self) -> Vec<Vector3<f64>> {
        self.points.iter().map(|p| *p.translation()).collect()
    }

    pub fn orientations(&self) -> Vec<UnitQuaternion<f64>> {
        self.points.iter().map(|p| *p.rotation()).collect()
    }

    pub fn prepend(&self, point: Pose) -> Self {
        let mut points = vec![point];
        points.extend(self.points.iter().cloned());
        Self::new(points)
    }

    pub fn append(&self, point: Pose) -> Self {
        let mut points = self.points.to_vec();
        points.push(point);
        Self::new(points)
    }

    pub fn concat(&self, other: &CartesianPath) -> Self {
        let mut points = self.points.to_vec();
        points.extend(other.iter().cloned());
        Self::new(points)
    }

    pub fn transform<F>(&self, f: F) -> Self
    where
        F: Fn(&Pose) -> Pose,
    {
        Self {
            points: self.points.iter().map(f).collect(),
        }
    }
}
