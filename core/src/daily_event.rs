//! Daily event provider: the per-day modifier bundle.
//!
//! An event is rolled at most once per day. The resolved flag is persisted
//! so a resumed run keeps the day's event instead of rolling a new one.
//! The introductory day never has an event.

use crate::{
    config::DailyEventDef,
    event::RestoreWarning,
    modifiers::ModifierBundle,
    provider::StateProvider,
    rng::StreamRng,
    snapshot::{DailyEventRecord, DailyEventState},
};

#[derive(Debug, Clone, Default)]
pub struct DailyEvents {
    current:            Option<DailyEventRecord>,
    resolved_for_today: bool,
    catalog:            Vec<DailyEventDef>,
}

impl DailyEvents {
    pub fn new(catalog: Vec<DailyEventDef>) -> Self {
        Self { current: None, resolved_for_today: false, catalog }
    }

    pub fn current(&self) -> Option<&DailyEventRecord> {
        self.current.as_ref()
    }

    pub fn current_modifiers(&self) -> Option<&ModifierBundle> {
        self.current.as_ref().map(|e| &e.modifiers)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_for_today
    }

    /// Forget today's event. Called when a new day begins.
    pub fn start_new_day(&mut self) {
        self.current = None;
        self.resolved_for_today = false;
    }

    /// Roll today's event unless one was already resolved.
    pub fn resolve_today(
        &mut self,
        is_first_day: bool,
        rng: &mut StreamRng,
    ) -> Option<&DailyEventRecord> {
        if !self.resolved_for_today {
            self.current = if is_first_day {
                None
            } else {
                rng.pick(&self.catalog).map(|def| DailyEventRecord {
                    id: def.id.clone(),
                    name: def.name.clone(),
                    description: def.description.clone(),
                    modifiers: def.modifiers,
                })
            };
            self.resolved_for_today = true;
            if let Some(event) = &self.current {
                log::info!("daily_event: rolled '{}' ({})", event.id, rng.name);
            }
        }
        self.current.as_ref()
    }
}

impl StateProvider for DailyEvents {
    type Fragment = DailyEventState;

    fn name(&self) -> &'static str { "daily_event" }

    fn project_state(&self) -> DailyEventState {
        DailyEventState {
            event: self.current.clone(),
            resolved_for_today: self.resolved_for_today,
        }
    }

    fn reconstruct_from(
        &mut self,
        fragment: &DailyEventState,
        _warnings: &mut Vec<RestoreWarning>,
    ) {
        self.current = fragment.event.clone();
        self.resolved_for_today = fragment.resolved_for_today || fragment.event.is_some();
    }
}
