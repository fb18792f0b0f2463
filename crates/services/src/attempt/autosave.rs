//! Per-question autosave slots.
//!
//! Each question moves through `Idle -> Pending -> InFlight -> Idle`. The
//! table only decides transitions; the controller owns the timers and the
//! network calls. Generations let a stale timer recognise that it has been
//! superseded even if its abort raced with its wake-up.

use std::collections::HashMap;

use exam_core::model::QuestionId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    /// Debounce timer running.
    Pending { generation: u64 },
    /// Request sent; `follow_up` records an edit made while waiting.
    InFlight { follow_up: bool },
}

impl SlotState {
    /// Saves this slot still owes: a pending timer, a request, or both.
    #[must_use]
    pub fn outstanding(self) -> usize {
        match self {
            SlotState::Idle => 0,
            SlotState::Pending { .. } | SlotState::InFlight { follow_up: false } => 1,
            SlotState::InFlight { follow_up: true } => 2,
        }
    }
}

/// What the controller must do after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotAction {
    Nothing,
    /// (Re)start the timer for this question with the given generation,
    /// cancelling any earlier one.
    Schedule { generation: u64 },
}

#[derive(Debug, Default)]
pub struct SaveSlots {
    slots: HashMap<QuestionId, SlotState>,
    next_generation: u64,
}

impl SaveSlots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    #[must_use]
    pub fn state(&self, question_id: &QuestionId) -> SlotState {
        self.slots
            .get(question_id)
            .copied()
            .unwrap_or(SlotState::Idle)
    }

    /// A local edit happened.
    pub fn on_edit(&mut self, question_id: &QuestionId) -> SlotAction {
        match self.state(question_id) {
            SlotState::Idle | SlotState::Pending { .. } => {
                let generation = self.bump();
                self.slots
                    .insert(question_id.clone(), SlotState::Pending { generation });
                SlotAction::Schedule { generation }
            }
            SlotState::InFlight { .. } => {
                self.slots
                    .insert(question_id.clone(), SlotState::InFlight { follow_up: true });
                SlotAction::Nothing
            }
        }
    }

    /// A timer woke up. Returns `true` when it is still current, in which case
    /// the slot is now in flight and the caller must send the save.
    pub fn on_timer(&mut self, question_id: &QuestionId, generation: u64) -> bool {
        match self.state(question_id) {
            SlotState::Pending { generation: current } if current == generation => {
                self.slots
                    .insert(question_id.clone(), SlotState::InFlight { follow_up: false });
                true
            }
            _ => false,
        }
    }

    /// The request for this question settled, successfully or not.
    pub fn on_resolved(&mut self, question_id: &QuestionId) -> SlotAction {
        match self.state(question_id) {
            SlotState::InFlight { follow_up: true } => {
                let generation = self.bump();
                self.slots
                    .insert(question_id.clone(), SlotState::Pending { generation });
                SlotAction::Schedule { generation }
            }
            SlotState::InFlight { follow_up: false } => {
                self.slots.remove(question_id);
                SlotAction::Nothing
            }
            SlotState::Idle | SlotState::Pending { .. } => SlotAction::Nothing,
        }
    }

    /// Re-arm every pending slot so the caller can fire it immediately.
    pub fn flush(&mut self) -> Vec<(QuestionId, u64)> {
        let pending: Vec<QuestionId> = self
            .slots
            .iter()
            .filter(|(_, state)| matches!(state, SlotState::Pending { .. }))
            .map(|(id, _)| id.clone())
            .collect();
        pending
            .into_iter()
            .map(|id| {
                let generation = self.bump();
                self.slots
                    .insert(id.clone(), SlotState::Pending { generation });
                (id, generation)
            })
            .collect()
    }

    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.slots.values().map(|state| state.outstanding()).sum()
    }
}
