//! Limb vocabulary and switch-state types.
//!
//! A rig exposes each limb twice: an IK chain driven by an end-effector plus
//! pole target, and an FK chain driven by per-joint rotations. Which chain is
//! authoritative is stored as a scalar custom property (the control flag) on
//! one designated control bone per limb. The tables here are the rig-naming
//! contract: chain member names, control-bone names, pole-target names, and
//! the lowercase substrings used to classify a selection.

use serde::{Deserialize, Serialize};

/// Custom-property key for the per-limb control flag.
///
/// `0.0` means the IK chain is authoritative; any non-zero value means FK.
pub const IK_FK_PROP: &str = "IK_FK";

// ---------------------------------------------------------------------------
// Limb kinds and the rig-naming contract
// ---------------------------------------------------------------------------

/// A switchable limb category.
///
/// Derived from the selection at call time, never stored on the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimbKind {
    ArmLeft,
    ArmRight,
    LegLeft,
    LegRight,
    /// Side-less single-joint hand rig (test harness limb on the reference
    /// rig; real characters use the arm chains).
    Hand,
}

impl LimbKind {
    /// All kinds, in classification priority order.
    ///
    /// `Hand` is last so its bare `hand_ik`/`hand_fk` patterns only catch
    /// names the side-specific arm patterns did not already claim.
    pub const ALL: [Self; 5] = [
        Self::ArmLeft,
        Self::ArmRight,
        Self::LegLeft,
        Self::LegRight,
        Self::Hand,
    ];

    /// Lowercase substrings that classify a selected bone name as this kind.
    #[must_use]
    pub const fn match_patterns(self) -> &'static [&'static str] {
        match self {
            Self::ArmLeft => &["hand_ik.l", "forearm_fk.l", "upper_arm_fk.l", "hand_fk.l"],
            Self::ArmRight => &["hand_ik.r", "forearm_fk.r", "upper_arm_fk.r", "hand_fk.r"],
            Self::LegLeft => &[
                "foot_ik.l",
                "foot_fk.l",
                "shin_fk.l",
                "thigh_fk.l",
                "thigh_ik.l",
            ],
            Self::LegRight => &[
                "foot_ik.r",
                "foot_fk.r",
                "shin_fk.r",
                "thigh_fk.r",
                "thigh_ik.r",
            ],
            Self::Hand => &["hand_ik", "hand_fk"],
        }
    }

    /// IK chain bone names, root first.
    #[must_use]
    pub const fn ik_chain(self) -> &'static [&'static str] {
        match self {
            Self::ArmLeft => &["upper_arm_ik.L", "forearm_ik.L", "hand_ik.L"],
            Self::ArmRight => &["upper_arm_ik.R", "forearm_ik.R", "hand_ik.R"],
            Self::LegLeft => &["thigh_ik.L", "shin_ik.L", "foot_ik.L", "toe_ik.L"],
            Self::LegRight => &["thigh_ik.R", "shin_ik.R", "foot_ik.R", "toe_ik.R"],
            Self::Hand => &["hand_ik"],
        }
    }

    /// FK chain bone names, root first. Always the same length as
    /// [`ik_chain`](Self::ik_chain); transforms are copied index-wise.
    #[must_use]
    pub const fn fk_chain(self) -> &'static [&'static str] {
        match self {
            Self::ArmLeft => &["upper_arm_fk.L", "forearm_fk.L", "hand_fk.L"],
            Self::ArmRight => &["upper_arm_fk.R", "forearm_fk.R", "hand_fk.R"],
            Self::LegLeft => &["thigh_fk.L", "shin_fk.L", "foot_fk.L", "toe_fk.L"],
            Self::LegRight => &["thigh_fk.R", "shin_fk.R", "foot_fk.R", "toe_fk.R"],
            Self::Hand => &["hand_fk"],
        }
    }

    /// The two IK joints whose bend plane the pole target controls, or
    /// `None` for single-joint kinds.
    #[must_use]
    pub const fn pole_joints(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::ArmLeft => Some(("upper_arm_ik.L", "forearm_ik.L")),
            Self::ArmRight => Some(("upper_arm_ik.R", "forearm_ik.R")),
            Self::LegLeft => Some(("thigh_ik.L", "shin_ik.L")),
            Self::LegRight => Some(("thigh_ik.R", "shin_ik.R")),
            Self::Hand => None,
        }
    }

    /// Name of the relocatable pole-target bone, or `None` for kinds
    /// without a pole.
    #[must_use]
    pub const fn pole_target(self) -> Option<&'static str> {
        match self {
            Self::ArmLeft => Some("upper_arm_ik_target.L"),
            Self::ArmRight => Some("upper_arm_ik_target.R"),
            Self::LegLeft => Some("thigh_ik_target.L"),
            Self::LegRight => Some("thigh_ik_target.R"),
            Self::Hand => None,
        }
    }

    /// Name of the control bone carrying the [`IK_FK_PROP`] flag.
    #[must_use]
    pub const fn control_bone(self) -> &'static str {
        match self {
            Self::ArmLeft => "upper_arm_parent.L",
            Self::ArmRight => "upper_arm_parent.R",
            Self::LegLeft => "thigh_parent.L",
            Self::LegRight => "thigh_parent.R",
            Self::Hand => "hand_ik",
        }
    }

    /// Human-readable label for notifications.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ArmLeft => "left arm",
            Self::ArmRight => "right arm",
            Self::LegLeft => "left leg",
            Self::LegRight => "right leg",
            Self::Hand => "hand",
        }
    }
}

impl std::fmt::Display for LimbKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Switch state
// ---------------------------------------------------------------------------

/// Which chain is authoritative for a limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchMode {
    Ik,
    Fk,
}

impl SwitchMode {
    /// Interpret a control-flag value: `0.0` is IK, anything else is FK.
    #[must_use]
    pub fn from_flag(flag: f32) -> Self {
        if flag == 0.0 { Self::Ik } else { Self::Fk }
    }

    /// Canonical flag value written for this mode.
    #[must_use]
    pub const fn flag_value(self) -> f32 {
        match self {
            Self::Ik => 0.0,
            Self::Fk => 1.0,
        }
    }

    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ik => Self::Fk,
            Self::Fk => Self::Ik,
        }
    }

    /// Copy direction that hands control from this mode to the other one.
    #[must_use]
    pub const fn toggle_direction(self) -> SwitchDirection {
        match self {
            Self::Ik => SwitchDirection::IkToFk,
            Self::Fk => SwitchDirection::FkToIk,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ik => "IK",
            Self::Fk => "FK",
        }
    }
}

impl std::fmt::Display for SwitchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction of a pose copy between the two chains of a limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchDirection {
    /// Copy the IK chain's pose onto the FK chain (FK takes over).
    IkToFk,
    /// Copy the FK chain's pose onto the IK chain and re-solve the pole
    /// target (IK takes over).
    FkToIk,
}

/// Host interaction context the switch operation was invoked from.
///
/// The operation is only available while editing a pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextMode {
    Object,
    Pose,
}

/// Outcome of a successful switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchReport {
    /// Limb the selection classified as.
    pub limb: LimbKind,
    /// Mode that is now authoritative.
    pub mode: SwitchMode,
}

impl SwitchReport {
    /// Notification for the host's message area.
    #[must_use]
    pub fn notification(&self) -> Notification {
        Notification::info(format!("Switched {} to {}", self.limb, self.mode))
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Severity of a host-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single human-readable message plus severity, shaped for a host
/// notification area. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
