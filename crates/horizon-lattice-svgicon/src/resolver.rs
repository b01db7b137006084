//! Variant fallback resolution.
//!
//! When no source is registered for the requested (mode, state), a
//! substitute is chosen from a fixed precedence list that depends on the
//! requested mode:
//!
//! - **Disabled / Selected**: the mode's own look matters most, so the same
//!   mode in the other state is preferred over the other styled mode.
//!   Order: `(M,S)`, `(Normal,S)`, `(Active,S)`, `(M,S')`, `(Normal,S')`,
//!   `(Active,S')`, `(M',S)`, `(M',S')`.
//! - **Normal / Active**: state continuity matters most.
//!   Order: `(M,S)`, `(M',S)`, `(M,S')`, `(M',S')`, `(Disabled,S)`,
//!   `(Selected,S)`, `(Disabled,S')`, `(Selected,S')`.
//!
//! `M'` is the sibling mode (Disabled↔Selected, Normal↔Active) and `S'` the
//! opposite state.

use tracing::trace;

use crate::types::{IconMode, IconState};

/// Number of candidates tried for any request.
pub const CHAIN_LEN: usize = 8;

/// The ordered candidates tried for a request, exact match first.
pub fn fallback_chain(mode: IconMode, state: IconState) -> [(IconMode, IconState); CHAIN_LEN] {
    let opposite_state = state.opposite();

    match mode {
        IconMode::Disabled | IconMode::Selected => {
            let opposite_mode = if mode == IconMode::Disabled {
                IconMode::Selected
            } else {
                IconMode::Disabled
            };
            [
                (mode, state),
                (IconMode::Normal, state),
                (IconMode::Active, state),
                (mode, opposite_state),
                (IconMode::Normal, opposite_state),
                (IconMode::Active, opposite_state),
                (opposite_mode, state),
                (opposite_mode, opposite_state),
            ]
        }
        IconMode::Normal | IconMode::Active => {
            let opposite_mode = if mode == IconMode::Normal {
                IconMode::Active
            } else {
                IconMode::Normal
            };
            [
                (mode, state),
                (opposite_mode, state),
                (mode, opposite_state),
                (opposite_mode, opposite_state),
                (IconMode::Disabled, state),
                (IconMode::Selected, state),
                (IconMode::Disabled, opposite_state),
                (IconMode::Selected, opposite_state),
            ]
        }
    }
}

/// Find the first candidate that `try_load` accepts.
///
/// `try_load` is expected to actually load the candidate, not just check
/// that something is registered; a candidate that fails to load is skipped.
/// Returns the variant that was loaded, or `None` if every candidate failed.
pub fn resolve<F>(
    mode: IconMode,
    state: IconState,
    mut try_load: F,
) -> Option<(IconMode, IconState)>
where
    F: FnMut(IconMode, IconState) -> bool,
{
    let found = fallback_chain(mode, state)
        .into_iter()
        .find(|&(m, s)| try_load(m, s));

    trace!(
        target: "horizon_lattice_svgicon::resolver",
        requested_mode = ?mode,
        requested_state = ?state,
        resolved = ?found,
        "resolved icon variant"
    );

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use IconMode::*;
    use IconState::*;

    fn resolve_with(
        available: &[(IconMode, IconState)],
        mode: IconMode,
        state: IconState,
    ) -> Option<(IconMode, IconState)> {
        resolve(mode, state, |m, s| available.contains(&(m, s)))
    }

    #[test]
    fn test_chain_covers_every_variant_once() {
        for mode in IconMode::ALL {
            for state in IconState::ALL {
                let chain = fallback_chain(mode, state);
                let unique: HashSet<_> = chain.iter().collect();
                assert_eq!(unique.len(), CHAIN_LEN, "{mode:?}/{state:?}");
                assert_eq!(chain[0], (mode, state));
            }
        }
    }

    #[test]
    fn test_chain_disabled() {
        assert_eq!(
            fallback_chain(Disabled, On),
            [
                (Disabled, On),
                (Normal, On),
                (Active, On),
                (Disabled, Off),
                (Normal, Off),
                (Active, Off),
                (Selected, On),
                (Selected, Off),
            ]
        );
    }

    #[test]
    fn test_chain_selected() {
        assert_eq!(
            fallback_chain(Selected, Off),
            [
                (Selected, Off),
                (Normal, Off),
                (Active, Off),
                (Selected, On),
                (Normal, On),
                (Active, On),
                (Disabled, Off),
                (Disabled, On),
            ]
        );
    }

    #[test]
    fn test_chain_active() {
        assert_eq!(
            fallback_chain(Active, Off),
            [
                (Active, Off),
                (Normal, Off),
                (Active, On),
                (Normal, On),
                (Disabled, Off),
                (Selected, Off),
                (Disabled, On),
                (Selected, On),
            ]
        );
    }

    #[test]
    fn test_exact_match_wins() {
        let all: Vec<_> = IconMode::ALL
            .iter()
            .flat_map(|&m| IconState::ALL.iter().map(move |&s| (m, s)))
            .collect();
        for &(m, s) in &all {
            assert_eq!(resolve_with(&all, m, s), Some((m, s)));
        }
    }

    #[test]
    fn test_disabled_falls_back_to_normal_other_state() {
        assert_eq!(
            resolve_with(&[(Normal, Off)], Disabled, On),
            Some((Normal, Off))
        );
    }

    #[test]
    fn test_normal_falls_back_to_active_other_state() {
        assert_eq!(
            resolve_with(&[(Active, Off)], Normal, On),
            Some((Active, Off))
        );
    }

    #[test]
    fn test_disabled_prefers_normal_same_state_over_own_mode() {
        let available = [(Disabled, Off), (Normal, On)];
        assert_eq!(resolve_with(&available, Disabled, On), Some((Normal, On)));
    }

    #[test]
    fn test_disabled_prefers_own_mode_over_selected() {
        let available = [(Disabled, Off), (Selected, On)];
        assert_eq!(
            resolve_with(&available, Disabled, On),
            Some((Disabled, Off))
        );
    }

    #[test]
    fn test_normal_uses_styled_modes_last() {
        assert_eq!(
            resolve_with(&[(Selected, On), (Disabled, Off)], Normal, On),
            Some((Selected, On))
        );
        assert_eq!(
            resolve_with(&[(Selected, Off)], Active, On),
            Some((Selected, Off))
        );
    }

    #[test]
    fn test_nothing_available() {
        assert_eq!(resolve_with(&[], Normal, Off), None);
    }

    #[test]
    fn test_failed_load_falls_through() {
        let mut tried = Vec::new();
        let found = resolve(Normal, Off, |m, s| {
            tried.push((m, s));
            // Pretend (Normal, Off) is registered but corrupt.
            (m, s) == (Normal, On)
        });
        assert_eq!(found, Some((Normal, On)));
        assert_eq!(tried, vec![(Normal, Off), (Active, Off), (Normal, On)]);
    }
}
