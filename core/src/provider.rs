//! State provider contract.
//!
//! RULE: Every subsystem whose state survives a suspend implements
//! StateProvider. The capture coordinator calls project_state() on each
//! one in any order; the restore coordinator calls reconstruct_from() in
//! the fixed order documented in restore.rs.
//! Providers never read each other. Cross-provider inputs (effective
//! modifiers, templates) are handed in by the coordinator or held from
//! construction.

use crate::event::RestoreWarning;

pub trait StateProvider {
    /// The schema section this provider owns.
    type Fragment: Default;

    /// Unique stable name for this provider.
    fn name(&self) -> &'static str;

    /// Project live state into its schema section. Must not mutate.
    fn project_state(&self) -> Self::Fragment;

    /// Replace live state with the contents of `fragment`.
    /// Entries that cannot be rebuilt are skipped and reported in `warnings`.
    fn reconstruct_from(&mut self, fragment: &Self::Fragment, warnings: &mut Vec<RestoreWarning>);
}

/// Providers that own a roster of live entities.
pub trait RosterProvider: StateProvider {
    /// Destroy every live entity, including the ones normal run
    /// initialization spawned. Returns how many were destroyed.
    fn destroy_all_live_defaults(&mut self) -> usize;

    fn live_count(&self) -> usize;
}

/// Project `provider`, or synthesize an empty section if it was never
/// initialized. Partial data beats no save.
pub fn project_or_default<P: StateProvider>(
    name: &'static str,
    provider: Option<&P>,
) -> P::Fragment {
    match provider {
        Some(p) => p.project_state(),
        None => {
            log::debug!("capture: provider '{name}' absent, writing empty section");
            P::Fragment::default()
        }
    }
}
