use nalgebra::{
    Isometry3, Matrix3, Matrix3xX, Matrix4, Matrix4xX, Quaternion, Rotation3, Translation3,
    UnitQuaternion, Vector3, Vector4,
};
use std::fmt;
use std::ops::Mul;

use crate::error::{MotionError, MotionResult};

pub const DEFAULT_FRAME_ID: &str = "world";

const QUATERNION_NORM_TOLERANCE: f64 = 1e-4;
const RIGID_TOLERANCE: f64 = 1e-6;

/// Rigid 3D transform: translation, unit quaternion rotation and the frame
/// it is expressed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    translation: Vector3<f64>,
    rotation: UnitQuaternion<f64>,
    frame_id: String,
}

impl Pose {
    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            translation,
            rotation,
            frame_id: DEFAULT_FRAME_ID.to_string(),
        }
    }

    /// Build from a raw quaternion. Unless `normalize` is set the quaternion
    /// must already have unit norm.
    pub fn from_parts(
        translation: Vector3<f64>,
        quaternion: Quaternion<f64>,
        frame_id: impl Into<String>,
        normalize: bool,
    ) -> MotionResult<Self> {
        let norm = quaternion.norm();
        if !norm.is_finite() || norm == 0.0 {
            return Err(MotionError::InvalidArgument(format!(
                "quaternion norm {norm} can not be normalized"
            )));
        }
        if !normalize && (norm - 1.0).abs() > QUATERNION_NORM_TOLERANCE {
            return Err(MotionError::InvalidArgument(format!(
                "quaternion is not normalized (norm {norm:.6})"
            )));
        }
        if !translation.iter().all(|v| v.is_finite()) {
            return Err(MotionError::InvalidArgument(
                "translation must be finite".to_string(),
            ));
        }
        Ok(Self {
            translation,
            rotation: UnitQuaternion::from_quaternion(quaternion),
            frame_id: frame_id.into(),
        })
    }

    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    /// Parse a 4x4 homogeneous transformation matrix.
    pub fn from_transformation_matrix(matrix: &Matrix4<f64>) -> MotionResult<Self> {
        let last_row = matrix.fixed_view::<1, 4>(3, 0);
        let expected = [0.0, 0.0, 0.0, 1.0];
        if last_row
            .iter()
            .zip(expected)
            .any(|(v, e)| (v - e).abs() > RIGID_TOLERANCE)
        {
            return Err(MotionError::InvalidArgument(
                "last row of a transformation matrix must be [0, 0, 0, 1]".to_string(),
            ));
        }
        let rotation = rotation_from_matrix(&matrix.fixed_view::<3, 3>(0, 0).into_owned())?;
        let translation: Vector3<f64> = matrix.fixed_view::<3, 1>(0, 3).into_owned();
        Ok(Self::new(translation, rotation))
    }

    pub fn with_frame_id(&self, frame_id: impl Into<String>) -> Self {
        Self {
            frame_id: frame_id.into(),
            ..self.clone()
        }
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    pub fn rotation(&self) -> &UnitQuaternion<f64> {
        &self.rotation
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.rotation.to_rotation_matrix().into_inner()
    }

    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    pub fn transformation_matrix(&self) -> Matrix4<f64> {
        self.to_isometry().to_homogeneous()
    }

    /// Same pose with the quaternion renormalized against numeric drift.
    pub fn normalize_rotation(&self) -> Self {
        Self {
            rotation: UnitQuaternion::new_normalize(self.rotation.into_inner()),
            ..self.clone()
        }
    }

    pub fn inverse(&self, new_frame_id: impl Into<String>) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            translation: rotation * (-self.translation),
            rotation,
            frame_id: new_frame_id.into(),
        }
    }

    /// Add a delta expressed in the world frame to the translation.
    pub fn translate(&self, delta: &Vector3<f64>) -> Self {
        Self {
            translation: self.translation + delta,
            ..self.clone()
        }
    }

    /// Apply `rotation` after the own orientation. Translation is unchanged.
    pub fn rotate(&self, rotation: &UnitQuaternion<f64>) -> Self {
        Self {
            rotation: self.rotation * rotation,
            ..self.clone()
        }
    }

    pub fn rotate_matrix(&self, rotation: &Matrix3<f64>) -> MotionResult<Self> {
        Ok(self.rotate(&rotation_from_matrix(rotation)?))
    }

    /// Compare the homogeneous matrices elementwise, so q and -q are equal.
    pub fn is_close(&self, other: &Pose, tolerance: f64) -> bool {
        self.frame_id == other.frame_id
            && (self.transformation_matrix() - other.transformation_matrix()).amax() <= tolerance
    }

    fn compose(&self, other: &Pose) -> Pose {
        Pose {
            translation: self.translation + self.rotation * other.translation,
            rotation: self.rotation * other.rotation,
            frame_id: self.frame_id.clone(),
        }
    }
}

fn rotation_from_matrix(matrix: &Matrix3<f64>) -> MotionResult<UnitQuaternion<f64>> {
    let orthogonality = (matrix.transpose() * matrix - Matrix3::identity()).amax();
    if orthogonality > RIGID_TOLERANCE || (matrix.determinant() - 1.0).abs() > RIGID_TOLERANCE {
        return Err(MotionError::InvalidArgument(
            "matrix is not a proper rotation".to_string(),
        ));
    }
    Ok(UnitQuaternion::from_rotation_matrix(
        &Rotation3::from_matrix_unchecked(*matrix),
    ))
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul<&Pose> for &Pose {
    type Output = Pose;

    fn mul(self, rhs: &Pose) -> Pose {
        self.compose(rhs)
    }
}

impl Mul<Pose> for Pose {
    type Output = Pose;

    fn mul(self, rhs: Pose) -> Pose {
        self.compose(&rhs)
    }
}

impl Mul<Vector3<f64>> for &Pose {
    type Output = Vector3<f64>;

    fn mul(self, point: Vector3<f64>) -> Vector3<f64> {
        self.rotation * point + self.translation
    }
}

/// Homogeneous point: the translation is scaled by `w`, `w` is kept.
impl Mul<Vector4<f64>> for &Pose {
    type Output = Vector4<f64>;

    fn mul(self, point: Vector4<f64>) -> Vector4<f64> {
        let w = point.w;
        let p = self.rotation * point.xyz() + self.translation * w;
        Vector4::new(p.x, p.y, p.z, w)
    }
}

/// Columns are points.
impl Mul<&Matrix3xX<f64>> for &Pose {
    type Output = Matrix3xX<f64>;

    fn mul(self, points: &Matrix3xX<f64>) -> Matrix3xX<f64> {
        let mut out = self.rotation_matrix() * points;
        for j in 0..out.ncols() {
            for i in 0..3 {
                out[(i, j)] += self.translation[i];
            }
        }
        out
    }
}

impl Mul<&Matrix4xX<f64>> for &Pose {
    type Output = Matrix4xX<f64>;

    fn mul(self, points: &Matrix4xX<f64>) -> Matrix4xX<f64> {
        let mut out = points.clone();
        for j in 0..points.ncols() {
            let column = points.column(j);
            let transformed = self * Vector4::new(column[0], column[1], column[2], column[3]);
            out.set_column(j, &transformed);
        }
        out
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.rotation.quaternion();
        write!(
            f,
            "Pose(frame_id={}, translation=[{}, {}, {}], rotation=[x={}, y={}, z={}, w={}])",
            self.frame_id,
            self.translation.x,
            self.translation.y,
            self.translation.z,
            q.i,
            q.j,
            q.k,
            q.w
        )
    }
}

/// A pose of a named end effector link.
#[derive(Debug, Clone, PartialEq)]
pub struct EndEffectorPose {
    pub pose: Pose,
    pub end_effector_link: String,
}

impl EndEffectorPose {
    pub fn new(pose: Pose, end_effector_link: impl Into<String>) -> Self {
        Self {
            pose,
            end_effector_link: end_effector_link.into(),
        }
    }
}
