//! Pose bones: identity, rest transform, animated channel, custom properties.
//!
//! A bone's world matrix is `parent_world * rest * channel`, where the
//! channel is the animated local translation and rotation. Bones run along
//! their local +Y axis; the tip sits `length` units along it.

use std::collections::HashMap;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

/// Index of a bone within its owning [`Armature`](crate::Armature).
///
/// A weak reference by position: resolved through the armature on every
/// access, never a pointer into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoneId(pub(crate) usize);

impl BoneId {
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Rotation channels
// ---------------------------------------------------------------------------

/// Axis orders for Euler rotation channels.
///
/// Extrinsic, fixed-axis orders: `Xyz` rotates about world X first, then Y,
/// then Z, matching the host's pose-channel convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EulerOrder {
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

/// A bone's local rotation channel.
///
/// Hosts store either representation per bone; copies between chains go
/// through unit quaternions to avoid mismatched-order Euler artifacts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationChannel {
    Quaternion(UnitQuaternion<f32>),
    Euler(EulerOrder, Vector3<f32>),
}

impl RotationChannel {
    /// The channel's rotation as a unit quaternion, converting if needed.
    #[must_use]
    pub fn to_quaternion(&self) -> UnitQuaternion<f32> {
        match *self {
            Self::Quaternion(q) => q,
            Self::Euler(order, angles) => euler_to_quaternion(order, &angles),
        }
    }

    /// Whether the channel is stored as a quaternion.
    #[must_use]
    pub const fn is_quaternion(&self) -> bool {
        matches!(self, Self::Quaternion(_))
    }
}

/// Compose per-axis rotations for an extrinsic Euler order.
///
/// Rotating about fixed axes in listed order means the composite applies the
/// listed rotations right to left.
fn euler_to_quaternion(order: EulerOrder, angles: &Vector3<f32>) -> UnitQuaternion<f32> {
    let qx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angles.x);
    let qy = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angles.y);
    let qz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angles.z);

    match order {
        EulerOrder::Xyz => qz * qy * qx,
        EulerOrder::Xzy => qy * qz * qx,
        EulerOrder::Yxz => qz * qx * qy,
        EulerOrder::Yzx => qx * qz * qy,
        EulerOrder::Zxy => qy * qx * qz,
        EulerOrder::Zyx => qx * qy * qz,
    }
}

// ---------------------------------------------------------------------------
// Bone
// ---------------------------------------------------------------------------

/// A single pose bone.
///
/// `rest` is the parent-relative bind transform; the channel (translation +
/// rotation) animates on top of it. The cached world matrix is only valid
/// after [`Armature::reevaluate`](crate::Armature::reevaluate) — channel
/// writes do not refresh it.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    name: String,
    parent: Option<BoneId>,
    rest: Isometry3<f32>,
    length: f32,
    translation: Vector3<f32>,
    rotation: RotationChannel,
    properties: HashMap<String, f32>,
    world: Isometry3<f32>,
}

impl Bone {
    pub(crate) fn new(
        name: impl Into<String>,
        parent: Option<BoneId>,
        rest: Isometry3<f32>,
        length: f32,
    ) -> Self {
        Self {
            name: name.into(),
            parent,
            rest,
            length,
            translation: Vector3::zeros(),
            rotation: RotationChannel::Quaternion(UnitQuaternion::identity()),
            properties: HashMap::new(),
            world: Isometry3::identity(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn parent(&self) -> Option<BoneId> {
        self.parent
    }

    #[must_use]
    pub const fn rest(&self) -> &Isometry3<f32> {
        &self.rest
    }

    /// Rest-pose length along the bone's local +Y axis.
    #[must_use]
    pub const fn length(&self) -> f32 {
        self.length
    }

    // ---- Channel access ----

    #[must_use]
    pub const fn translation(&self) -> Vector3<f32> {
        self.translation
    }

    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.translation = translation;
    }

    #[must_use]
    pub const fn rotation_channel(&self) -> &RotationChannel {
        &self.rotation
    }

    /// The channel rotation as a unit quaternion, converting from Euler if
    /// needed. The stored channel is untouched.
    #[must_use]
    pub fn rotation_quaternion(&self) -> UnitQuaternion<f32> {
        self.rotation.to_quaternion()
    }

    /// Store a quaternion rotation, switching the channel to quaternion mode
    /// if it was Euler — the way a host snap tool sets mode and value
    /// together.
    pub fn set_rotation_quaternion(&mut self, rotation: UnitQuaternion<f32>) {
        self.rotation = RotationChannel::Quaternion(rotation);
    }

    pub fn set_rotation_euler(&mut self, order: EulerOrder, angles: Vector3<f32>) {
        self.rotation = RotationChannel::Euler(order, angles);
    }

    /// Convert the rotation channel to quaternion mode in place, preserving
    /// the rotation it represents.
    pub fn force_quaternion_mode(&mut self) {
        if !self.rotation.is_quaternion() {
            self.rotation = RotationChannel::Quaternion(self.rotation.to_quaternion());
        }
    }

    /// The channel as a local isometry (translation then rotation).
    #[must_use]
    pub fn local_isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation_quaternion())
    }

    // ---- Custom properties ----

    /// Read a custom property, `None` when the key was never set.
    #[must_use]
    pub fn custom_property(&self, key: &str) -> Option<f32> {
        self.properties.get(key).copied()
    }

    pub fn set_custom_property(&mut self, key: impl Into<String>, value: f32) {
        self.properties.insert(key.into(), value);
    }

    // ---- Derived world state ----

    /// World matrix as of the last re-evaluation.
    #[must_use]
    pub const fn world_matrix(&self) -> &Isometry3<f32> {
        &self.world
    }

    pub(crate) fn set_world(&mut self, world: Isometry3<f32>) {
        self.world = world;
    }

    /// World-space vector from the bone's head to its tip.
    #[must_use]
    pub fn bone_vector(&self) -> Vector3<f32> {
        self.world.rotation * (Vector3::y() * self.length)
    }

    /// World-space tip position (head plus bone vector).
    #[must_use]
    pub fn tip(&self) -> Vector3<f32> {
        self.world.translation.vector + self.bone_vector()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    // ---- Euler conversion ----

    #[test]
    fn euler_xyz_matches_nalgebra_euler_angles() {
        // nalgebra's from_euler_angles is extrinsic XYZ (Rz * Ry * Rx).
        for angles in [
            Vector3::new(0.3, 0.0, 0.0),
            Vector3::new(0.0, -0.7, 0.0),
            Vector3::new(0.3, -0.7, 1.1),
            Vector3::new(-1.2, 0.4, 2.5),
        ] {
            let ours = euler_to_quaternion(EulerOrder::Xyz, &angles);
            let reference = UnitQuaternion::from_euler_angles(angles.x, angles.y, angles.z);
            assert_relative_eq!(ours.angle_to(&reference), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn single_axis_euler_is_axis_angle_in_every_order() {
        let orders = [
            EulerOrder::Xyz,
            EulerOrder::Xzy,
            EulerOrder::Yxz,
            EulerOrder::Yzx,
            EulerOrder::Zxy,
            EulerOrder::Zyx,
        ];
        for order in orders {
            let q = euler_to_quaternion(order, &Vector3::new(0.0, 0.0, 0.9));
            let reference = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.9);
            assert_relative_eq!(q.angle_to(&reference), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn euler_orders_disagree_on_composite_rotations() {
        let angles = Vector3::new(0.8, 0.0, 0.8);
        let xyz = euler_to_quaternion(EulerOrder::Xyz, &angles);
        let zyx = euler_to_quaternion(EulerOrder::Zyx, &angles);
        assert!(xyz.angle_to(&zyx) > 1e-3);
    }

    // ---- Rotation channel ----

    #[test]
    fn force_quaternion_mode_preserves_rotation() {
        let mut bone = Bone::new("test", None, Isometry3::identity(), 1.0);
        bone.set_rotation_euler(EulerOrder::Zxy, Vector3::new(0.2, 0.5, -0.3));
        let before = bone.rotation_quaternion();

        bone.force_quaternion_mode();
        assert!(bone.rotation_channel().is_quaternion());
        assert_relative_eq!(bone.rotation_quaternion().angle_to(&before), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn force_quaternion_mode_is_idempotent() {
        let mut bone = Bone::new("test", None, Isometry3::identity(), 1.0);
        let q = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.4);
        bone.set_rotation_quaternion(q);
        bone.force_quaternion_mode();
        assert_eq!(bone.rotation_channel(), &RotationChannel::Quaternion(q));
    }

    #[test]
    fn set_rotation_quaternion_switches_euler_channel() {
        let mut bone = Bone::new("test", None, Isometry3::identity(), 1.0);
        bone.set_rotation_euler(EulerOrder::Xyz, Vector3::new(0.1, 0.2, 0.3));
        assert!(!bone.rotation_channel().is_quaternion());

        let q = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 1.0);
        bone.set_rotation_quaternion(q);
        assert!(bone.rotation_channel().is_quaternion());
        assert_relative_eq!(bone.rotation_quaternion().angle_to(&q), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn local_isometry_applies_translation_then_rotation() {
        let mut bone = Bone::new("test", None, Isometry3::identity(), 1.0);
        bone.set_translation(Vector3::new(1.0, 2.0, 3.0));
        let quarter_turn = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        bone.set_rotation_quaternion(quarter_turn);

        let local = bone.local_isometry();
        assert_relative_eq!(local.translation.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(local.translation.y, 2.0, epsilon = 1e-6);
        // Rotation sits inside the frame placed by the translation.
        let p = local.transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-6);
    }

    // ---- Custom properties ----

    #[test]
    fn custom_property_missing_is_none() {
        let bone = Bone::new("test", None, Isometry3::identity(), 1.0);
        assert_eq!(bone.custom_property("IK_FK"), None);
    }

    #[test]
    fn custom_property_set_then_get() {
        let mut bone = Bone::new("test", None, Isometry3::identity(), 1.0);
        bone.set_custom_property("IK_FK", 1.0);
        assert_eq!(bone.custom_property("IK_FK"), Some(1.0));
        bone.set_custom_property("IK_FK", 0.0);
        assert_eq!(bone.custom_property("IK_FK"), Some(0.0));
    }

    // ---- Derived world state ----

    #[test]
    fn tip_runs_along_world_y() {
        let mut bone = Bone::new("test", None, Isometry3::identity(), 2.0);
        bone.set_world(Isometry3::identity());
        let tip = bone.tip();
        assert_relative_eq!(tip.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(tip.y, 2.0, epsilon = 1e-6);
        assert_relative_eq!(tip.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn tip_follows_world_rotation() {
        let mut bone = Bone::new("test", None, Isometry3::identity(), 2.0);
        let world = Isometry3::from_parts(
            Translation3::new(1.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        bone.set_world(world);
        // +Y rotated 90 deg about Z points along -X.
        let tip = bone.tip();
        assert_relative_eq!(tip.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(tip.y, 0.0, epsilon = 1e-5);
    }
}
