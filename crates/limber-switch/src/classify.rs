//! Selection-to-limb classification.
//!
//! The switch operation never asks which limb to toggle; it infers the limb
//! from whatever bones the user has selected, so a hotkey works no matter
//! which chain member happens to be active.

use limber_core::types::LimbKind;

/// Classify a selection of bone names as a switchable limb.
///
/// Each selected name is tested in turn against every kind's patterns, in
/// [`LimbKind::ALL`] priority order, and the first hit wins; matching is
/// case-insensitive substring containment, so decorated names like
/// `MCH-hand_ik.L.001` still classify. Returns `None` when no selected
/// name matches any limb.
#[must_use]
pub fn classify<S: AsRef<str>>(selection: &[S]) -> Option<LimbKind> {
    for name in selection {
        let lower = name.as_ref().to_lowercase();
        for kind in LimbKind::ALL {
            if kind.match_patterns().iter().any(|p| lower.contains(p)) {
                return Some(kind);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_members_classify_to_their_limb() {
        assert_eq!(classify(&["hand_ik.L"]), Some(LimbKind::ArmLeft));
        assert_eq!(classify(&["upper_arm_fk.R"]), Some(LimbKind::ArmRight));
        assert_eq!(classify(&["foot_fk.L"]), Some(LimbKind::LegLeft));
        assert_eq!(classify(&["thigh_ik.R"]), Some(LimbKind::LegRight));
    }

    #[test]
    fn bare_hand_names_classify_as_the_hand_rig() {
        assert_eq!(classify(&["hand_ik"]), Some(LimbKind::Hand));
        assert_eq!(classify(&["hand_fk"]), Some(LimbKind::Hand));
    }

    #[test]
    fn sided_hand_names_classify_as_arms_not_hand() {
        // "hand_ik.l" contains the bare "hand_ik" pattern too; priority
        // order decides.
        assert_eq!(classify(&["hand_ik.L"]), Some(LimbKind::ArmLeft));
        assert_eq!(classify(&["hand_fk.R"]), Some(LimbKind::ArmRight));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify(&["HAND_IK.L"]), Some(LimbKind::ArmLeft));
        assert_eq!(classify(&["Foot_IK.r"]), Some(LimbKind::LegRight));
    }

    #[test]
    fn decorated_names_still_classify() {
        assert_eq!(classify(&["MCH-hand_ik.L.001"]), Some(LimbKind::ArmLeft));
    }

    #[test]
    fn first_matching_selection_wins() {
        assert_eq!(
            classify(&["spine_01", "foot_ik.L", "hand_ik.R"]),
            Some(LimbKind::LegLeft)
        );
    }

    #[test]
    fn unrelated_selection_is_none() {
        assert_eq!(classify(&["spine_01", "head", "pelvis"]), None);
        let empty: &[&str] = &[];
        assert_eq!(classify(empty), None);
    }
}
