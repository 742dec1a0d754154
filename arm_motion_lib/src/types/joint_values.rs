use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use super::JointSet;
use crate::error::{MotionError, MotionResult};

/// Per-joint scalar values (positions, velocities, ...) keyed by a [`JointSet`].
///
/// Immutable: every operation returns a new instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JointValuesRepr", into = "JointValuesRepr")]
pub struct JointValues {
    joint_set: JointSet,
    values: Arc<[f64]>,
}

#[derive(Serialize, Deserialize)]
struct JointValuesRepr {
    joint_names: JointSet,
    values: Vec<f64>,
}

impl TryFrom<JointValuesRepr> for JointValues {
    type Error = MotionError;

    fn try_from(repr: JointValuesRepr) -> Result<Self, Self::Error> {
        JointValues::new(repr.joint_names, repr.values)
    }
}

impl From<JointValues> for JointValuesRepr {
    fn from(values: JointValues) -> Self {
        JointValuesRepr {
            joint_names: values.joint_set,
            values: values.values.to_vec(),
        }
    }
}

impl JointValues {
    pub fn new(joint_set: JointSet, values: impl Into<Vec<f64>>) -> MotionResult<Self> {
        let values = values.into();
        if values.len() != joint_set.count() {
            return Err(MotionError::LengthMismatch {
                what: "joint values",
                expected: joint_set.count(),
                actual: values.len(),
            });
        }
        Ok(Self {
            joint_set,
            values: values.into(),
        })
    }

    /// Same value for every joint.
    pub fn broadcast(joint_set: JointSet, value: f64) -> Self {
        let values = vec![value; joint_set.count()];
        Self {
            joint_set,
            values: values.into(),
        }
    }

    pub fn zero(joint_set: JointSet) -> Self {
        Self::broadcast(joint_set, 0.0)
    }

    pub fn empty() -> Self {
        Self::zero(JointSet::empty())
    }

    pub fn joint_set(&self) -> &JointSet {
        &self.joint_set
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn at(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn try_value(&self, name: &str) -> Option<f64> {
        self.joint_set.try_index_of(name).map(|i| self.values[i])
    }

    /// Value of a single joint.
    pub fn value(&self, name: &str) -> MotionResult<f64> {
        Ok(self.values[self.joint_set.index_of(name)?])
    }

    /// Values in the order of `new_order`, which may be a subset of the own joints.
    pub fn reorder(&self, new_order: &JointSet) -> MotionResult<Self> {
        let values = new_order
            .iter()
            .map(|name| self.value(name))
            .collect::<MotionResult<Vec<f64>>>()?;
        Ok(Self {
            joint_set: new_order.clone(),
            values: values.into(),
        })
    }

    /// Values for the named joints, in the given order.
    pub fn select<I, S>(&self, names: I) -> MotionResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joint_set = JointSet::new(names.into_iter().map(|n| n.as_ref().to_string()))?;
        self.reorder(&joint_set)
    }

    pub fn transform<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            joint_set: self.joint_set.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    pub fn abs(&self) -> Self {
        self.transform(f64::abs)
    }

    /// Union of both joint sets. Joints present in both operands must agree.
    pub fn merge(&self, other: &JointValues) -> MotionResult<Self> {
        self.merge_all(std::iter::once(other))
    }

    pub fn merge_all<'a, I>(&self, others: I) -> MotionResult<Self>
    where
        I: IntoIterator<Item = &'a JointValues>,
    {
        let mut names: Vec<String> = self.joint_set.names().to_vec();
        let mut values: Vec<f64> = self.values.to_vec();

        for other in others {
            for (name, value) in other.joint_set.iter().zip(other.iter()) {
                match names.iter().position(|n| n == name) {
                    Some(i) if values[i] == value => {}
                    Some(i) => {
                        return Err(MotionError::MergeConflict(format!(
                            "joint {} is defined with differing values {} and {}",
                            name, values[i], value
                        )));
                    }
                    None => {
                        names.push(name.to_string());
                        values.push(value);
                    }
                }
            }
        }

        JointValues::new(JointSet::new(names)?, values)
    }

    /// Largest absolute per-joint difference to `other`.
    pub fn max_abs_diff(&self, other: &JointValues) -> MotionResult<f64> {
        let other = self.aligned(other)?;
        Ok(self
            .values
            .iter()
            .zip(other.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max))
    }

    /// Elementwise comparison with an absolute tolerance, NaN equal to NaN.
    pub fn is_close(&self, other: &JointValues, tolerance: f64) -> bool {
        self.joint_set == other.joint_set
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| (a.is_nan() && b.is_nan()) || (a - b).abs() <= tolerance)
    }

    pub fn try_add(&self, other: &JointValues) -> MotionResult<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn try_sub(&self, other: &JointValues) -> MotionResult<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn try_mul(&self, other: &JointValues) -> MotionResult<Self> {
        self.zip_with(other, |a, b| a * b)
    }

    pub fn try_div(&self, other: &JointValues) -> MotionResult<Self> {
        self.zip_with(other, |a, b| a / b)
    }

    fn zip_with<F>(&self, other: &JointValues, f: F) -> MotionResult<Self>
    where
        F: Fn(f64, f64) -> f64,
    {
        let other = self.aligned(other)?;
        Ok(Self {
            joint_set: self.joint_set.clone(),
            values: self
                .values
                .iter()
                .zip(other.iter())
                .map(|(&a, b)| f(a, b))
                .collect(),
        })
    }

    /// `other` in the joint order of `self`.
    fn aligned(&self, other: &JointValues) -> MotionResult<JointValues> {
        if self.joint_set == other.joint_set {
            return Ok(other.clone());
        }
        if !self.joint_set.is_similar(&other.joint_set) {
            return Err(MotionError::JointSetMismatch(format!(
                "{} is not compatible with {}",
                self.joint_set, other.joint_set
            )));
        }
        other.reorder(&self.joint_set)
    }
}

impl Add<f64> for &JointValues {
    type Output = JointValues;

    fn add(self, rhs: f64) -> JointValues {
        self.transform(|v| v + rhs)
    }
}

impl Sub<f64> for &JointValues {
    type Output = JointValues;

    fn sub(self, rhs: f64) -> JointValues {
        self.transform(|v| v - rhs)
    }
}

impl Mul<f64> for &JointValues {
    type Output = JointValues;

    fn mul(self, rhs: f64) -> JointValues {
        self.transform(|v| v * rhs)
    }
}

impl Div<f64> for &JointValues {
    type Output = JointValues;

    fn div(self, rhs: f64) -> JointValues {
        self.transform(|v| v / rhs)
    }
}

impl Neg for &JointValues {
    type Output = JointValues;

    fn neg(self) -> JointValues {
        self.transform(|v| -v)
    }
}

impl fmt::Display for JointValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "JointValues:")?;
        for (name, value) in self.joint_set.iter().zip(self.iter()) {
            writeln!(f, "  {name} : {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(names: &str, values: &[f64]) -> JointValues {
        JointValues::new(JointSet::parse(names).unwrap(), values.to_vec()).unwrap()
    }

    #[test]
    fn test_length_mismatch() {
        let err = JointValues::new(JointSet::parse("a,b,c").unwrap(), vec![1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            MotionError::LengthMismatch {
                what: "joint values",
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_reorder_roundtrip() {
        let original = values("a,b,c,d", &[1.0, 2.0, 3.0, 4.0]);
        let permutation = JointSet::parse("c,a,d,b").unwrap();

        let reordered = original.reorder(&permutation).unwrap();
        assert_eq!(reordered.values(), &[3.0, 1.0, 4.0, 2.0]);

        let back = reordered.reorder(original.joint_set()).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_reorder_subset_and_unknown_name() {
        let original = values("a,b,c", &[1.0, 2.0, 3.0]);
        let subset = original.reorder(&JointSet::parse("c,a").unwrap()).unwrap();
        assert_eq!(subset.values(), &[3.0, 1.0]);

        let err = original.reorder(&JointSet::parse("a,x").unwrap()).unwrap_err();
        assert_eq!(err, MotionError::NameNotFound("x".into()));
    }

    #[test]
    fn test_select() {
        let original = values("a,b,c", &[1.0, 2.0, 3.0]);
        assert_eq!(original.value("b").unwrap(), 2.0);
        assert_eq!(original.try_value("x"), None);

        let selected = original.select(["c", "b"]).unwrap();
        assert_eq!(selected.joint_set().names(), &["c", "b"]);
        assert_eq!(selected.values(), &[3.0, 2.0]);
    }

    #[test]
    fn test_merge_disjoint_and_overlapping() {
        let a = values("j1,j2", &[1.0, 1.0]);
        let b = values("j3,j4", &[2.0, 2.0]);
        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.joint_set().names(), &["j1", "j2", "j3", "j4"]);
        assert_eq!(merged.values(), &[1.0, 1.0, 2.0, 2.0]);

        let agreeing = values("j2,j5", &[1.0, 5.0]);
        let merged = a.merge(&agreeing).unwrap();
        assert_eq!(merged.values(), &[1.0, 1.0, 5.0]);

        let conflicting = values("j3,j1", &[3.0, 3.0]);
        assert!(matches!(
            a.merge(&conflicting),
            Err(MotionError::MergeConflict(_))
        ));
    }

    #[test]
    fn test_arithmetic_requires_matching_joint_sets() {
        let a = values("a,b", &[1.0, 2.0]);
        let b = values("b,a", &[10.0, 20.0]);
        let sum = a.try_add(&b).unwrap();
        assert_eq!(sum.joint_set(), a.joint_set());
        assert_eq!(sum.values(), &[21.0, 12.0]);

        let diff = a.try_sub(&b).unwrap();
        assert_eq!(diff.values(), &[-19.0, -8.0]);

        let c = values("a,c", &[1.0, 1.0]);
        assert!(matches!(
            a.try_add(&c),
            Err(MotionError::JointSetMismatch(_))
        ));
    }

    #[test]
    fn test_scalar_operators() {
        let a = values("a,b", &[1.0, -2.0]);
        assert_eq!((&a * 2.0).values(), &[2.0, -4.0]);
        assert_eq!((&a + 1.0).values(), &[2.0, -1.0]);
        assert_eq!((&a - 1.0).values(), &[0.0, -3.0]);
        assert_eq!((&a / 2.0).values(), &[0.5, -1.0]);
        assert_eq!((-&a).values(), &[-1.0, 2.0]);
        assert_eq!(a.abs().values(), &[1.0, 2.0]);
    }

    #[test]
    fn test_max_abs_diff() {
        let a = values("a,b,c", &[0.0, 1.0, 2.0]);
        let b = values("a,b,c", &[0.5, -1.0, 2.1]);
        assert!((a.max_abs_diff(&b).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_is_close() {
        let a = values("a,b", &[1.0, f64::NAN]);
        let b = values("a,b", &[1.0 + 1e-12, f64::NAN]);
        assert!(a.is_close(&b, 1e-9));
        assert!(!a.is_close(&b, 1e-14));
    }
}
