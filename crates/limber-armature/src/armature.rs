//! Armature storage and pose-graph evaluation.
//!
//! Evaluation model:
//!
//! ```text
//!   channels (translation + rotation, per bone)
//!        |  reevaluate()
//!        v
//!   world = parent_world * rest * channel      (parents first)
//!        |
//!        v
//!   two-bone IK constraints, in registration order
//!        |
//!        v
//!   constrained subtrees re-propagated
//! ```
//!
//! Nothing re-evaluates implicitly: channel writes leave world matrices
//! stale until [`Armature::reevaluate`] runs. That explicit step is the
//! synchronization point pose tools sequence their reads and writes around.

use std::collections::HashMap;

use nalgebra::{Isometry3, Point3};
use thiserror::Error;

use crate::bone::{Bone, BoneId};
use crate::constraint::{TwoBoneIk, solve_two_bone};

/// Errors from armature construction.
#[derive(Debug, Error)]
pub enum ArmatureError {
    /// Bone names are unique case-insensitively.
    #[error("duplicate bone name: {0}")]
    DuplicateBone(String),

    /// Parents must be registered before their children.
    #[error("unknown parent {parent} for bone {bone}")]
    UnknownParent { bone: String, parent: String },

    /// A constraint referenced a bone that was never registered.
    #[error("unknown bone in constraint: {0}")]
    UnknownBone(String),

    /// A two-bone constraint's mid joint must hang directly off its root.
    #[error("constraint mid joint {mid} is not a child of root joint {root}")]
    BrokenChain { root: String, mid: String },
}

// ---------------------------------------------------------------------------
// Armature
// ---------------------------------------------------------------------------

/// An ordered collection of bones plus a case-insensitive name index and the
/// rig's two-bone IK constraints.
///
/// Bone order is evaluation order: the builder guarantees parents precede
/// children, so one forward sweep propagates world matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Armature {
    name: String,
    bones: Vec<Bone>,
    index: HashMap<String, BoneId>,
    constraints: Vec<TwoBoneIk>,
}

impl Armature {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Look up a bone id by name, case-insensitively.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<BoneId> {
        self.index.get(&name.to_lowercase()).copied()
    }

    /// Access a bone.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different armature.
    #[must_use]
    pub fn bone(&self, id: BoneId) -> &Bone {
        &self.bones[id.index()]
    }

    /// Mutable access to a bone's channels and properties.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different armature.
    pub fn bone_mut(&mut self, id: BoneId) -> &mut Bone {
        &mut self.bones[id.index()]
    }

    /// Borrow a bone by name, case-insensitively.
    #[must_use]
    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.find(name).map(|id| self.bone(id))
    }

    /// Bone names in evaluation order.
    #[must_use]
    pub fn bone_names(&self) -> Vec<&str> {
        self.bones.iter().map(Bone::name).collect()
    }

    /// Bones with their ids, in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (BoneId, &Bone)> {
        self.bones.iter().enumerate().map(|(i, b)| (BoneId(i), b))
    }

    /// The rig's two-bone IK constraints, in application order.
    #[must_use]
    pub fn constraints(&self) -> &[TwoBoneIk] {
        &self.constraints
    }

    // ---- Pose-graph evaluation ----

    /// Propagate world matrices from channels, then apply constraints.
    pub fn reevaluate(&mut self) {
        for i in 0..self.bones.len() {
            self.refresh_world(i);
        }
        for ci in 0..self.constraints.len() {
            let constraint = self.constraints[ci];
            self.apply_constraint(&constraint);
        }
    }

    /// Back-solve the channel translation so the bone's world head lands on
    /// `target`. Reads the parent's world matrix, so worlds must be current;
    /// the write leaves them stale until the next [`reevaluate`](Self::reevaluate).
    pub fn set_world_location(&mut self, id: BoneId, target: &Point3<f32>) {
        let bone = self.bone(id);
        let parent_global = match bone.parent() {
            Some(p) => self.bone(p).world_matrix() * bone.rest(),
            None => *bone.rest(),
        };
        // The channel rotation pivots about the head, so the head position
        // in rest space is exactly the channel translation.
        let local = parent_global.inverse_transform_point(target);
        self.bone_mut(id).set_translation(local.coords);
    }

    fn refresh_world(&mut self, i: usize) {
        let parent_world = match self.bones[i].parent() {
            Some(p) => *self.bones[p.index()].world_matrix(),
            None => Isometry3::identity(),
        };
        let world = parent_world * self.bones[i].rest() * self.bones[i].local_isometry();
        self.bones[i].set_world(world);
    }

    fn apply_constraint(&mut self, constraint: &TwoBoneIk) {
        let root_world = *self.bone(constraint.root).world_matrix();
        let mid_world = *self.bone(constraint.mid).world_matrix();
        let target_pos = self.bone(constraint.target).world_matrix().translation.vector;
        let pole_pos = constraint
            .pole
            .map(|p| self.bone(p).world_matrix().translation.vector);

        let Some(solution) = solve_two_bone(
            &root_world,
            &mid_world,
            &target_pos,
            pole_pos.as_ref(),
            self.bone(constraint.root).length(),
            self.bone(constraint.mid).length(),
        ) else {
            // Degenerate span: keep the FK pose.
            return;
        };

        self.bones[constraint.root.index()].set_world(solution.root_world);
        self.bones[constraint.mid.index()].set_world(solution.mid_world);
        self.refresh_descendants(constraint.root, constraint.mid);
    }

    /// Re-propagate every descendant of `root` except the already-solved
    /// `mid`. Index order puts parents first, so one forward sweep suffices.
    fn refresh_descendants(&mut self, root: BoneId, mid: BoneId) {
        for i in (root.index() + 1)..self.bones.len() {
            if i == mid.index() {
                continue;
            }
            if self.has_ancestor(i, root) {
                self.refresh_world(i);
            }
        }
    }

    fn has_ancestor(&self, start: usize, ancestor: BoneId) -> bool {
        let mut current = self.bones[start].parent();
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.bones[p.index()].parent();
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

struct BoneDef {
    name: String,
    parent: Option<String>,
    rest: Isometry3<f32>,
    length: f32,
}

struct ConstraintDef {
    root: String,
    mid: String,
    target: String,
    pole: Option<String>,
}

/// Declarative armature construction; all validation happens in
/// [`build`](ArmatureBuilder::build).
///
/// Bones must be declared parents-first — that declaration order becomes the
/// evaluation order.
pub struct ArmatureBuilder {
    name: String,
    bones: Vec<BoneDef>,
    constraints: Vec<ConstraintDef>,
}

impl ArmatureBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Declare a bone. `parent` of `None` makes it a root bone.
    #[must_use]
    pub fn bone(
        mut self,
        name: &str,
        parent: Option<&str>,
        rest: Isometry3<f32>,
        length: f32,
    ) -> Self {
        self.bones.push(BoneDef {
            name: name.to_owned(),
            parent: parent.map(str::to_owned),
            rest,
            length,
        });
        self
    }

    /// Declare a two-bone IK constraint over already-declared bones.
    #[must_use]
    pub fn two_bone_ik(mut self, root: &str, mid: &str, target: &str, pole: Option<&str>) -> Self {
        self.constraints.push(ConstraintDef {
            root: root.to_owned(),
            mid: mid.to_owned(),
            target: target.to_owned(),
            pole: pole.map(str::to_owned),
        });
        self
    }

    /// Validate and build. The new armature is evaluated once, so world
    /// matrices are current for the rest pose.
    pub fn build(self) -> Result<Armature, ArmatureError> {
        let mut bones = Vec::with_capacity(self.bones.len());
        let mut index: HashMap<String, BoneId> = HashMap::with_capacity(self.bones.len());

        for def in self.bones {
            let key = def.name.to_lowercase();
            if index.contains_key(&key) {
                return Err(ArmatureError::DuplicateBone(def.name));
            }
            let parent = match &def.parent {
                Some(parent_name) => Some(
                    index
                        .get(&parent_name.to_lowercase())
                        .copied()
                        .ok_or_else(|| ArmatureError::UnknownParent {
                            bone: def.name.clone(),
                            parent: parent_name.clone(),
                        })?,
                ),
                None => None,
            };
            let id = BoneId(bones.len());
            bones.push(Bone::new(def.name, parent, def.rest, def.length));
            index.insert(key, id);
        }

        let mut constraints = Vec::with_capacity(self.constraints.len());
        for def in self.constraints {
            let resolve = |name: &str| {
                index
                    .get(&name.to_lowercase())
                    .copied()
                    .ok_or_else(|| ArmatureError::UnknownBone(name.to_owned()))
            };
            let root = resolve(&def.root)?;
            let mid = resolve(&def.mid)?;
            let target = resolve(&def.target)?;
            let pole = def.pole.as_deref().map(resolve).transpose()?;

            if bones[mid.index()].parent() != Some(root) {
                return Err(ArmatureError::BrokenChain {
                    root: def.root,
                    mid: def.mid,
                });
            }
            constraints.push(TwoBoneIk {
                root,
                mid,
                target,
                pole,
            });
        }

        let mut armature = Armature {
            name: self.name,
            bones,
            index,
            constraints,
        };
        armature.reevaluate();
        Ok(armature)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
