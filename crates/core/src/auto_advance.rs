//! Resume-where-you-left-off logic for returning learners.
//!
//! The state machine is pure: callers feed it observations of the store and
//! act on the returned decision. Scheduling the delayed jump is the caller's job.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::model::LessonId;
use crate::progress::{ProgressMap, SectionId};
use crate::sequencer::LessonOutline;

/// Delay before jumping, so the "resuming" notice can render first.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoAdvancePhase {
    Idle,
    Pending,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoAdvanceDecision {
    /// Nothing to do.
    Wait,
    /// Jump after `AUTO_ADVANCE_DELAY`. `target_step` is the first incomplete
    /// section right now; the jump itself looks it up again when it fires.
    Schedule {
        target_step: usize,
        section: SectionId,
    },
    /// A previously scheduled jump must be dropped.
    Cancel,
    /// Every section is already complete.
    CompleteLesson,
}

/// Snapshot of the store the controller reacts to.
#[derive(Debug, Clone, Copy)]
pub struct AutoAdvanceInput<'a> {
    pub lesson_id: Option<LessonId>,
    pub is_loading: bool,
    pub current_step: usize,
    pub outline: &'a LessonOutline,
    pub progress: &'a ProgressMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoAdvance {
    lesson_id: Option<LessonId>,
    phase: AutoAdvancePhase,
    /// Lessons that already advanced or celebrated in this session.
    advanced: BTreeSet<LessonId>,
}

impl Default for AutoAdvance {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoAdvance {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lesson_id: None,
            phase: AutoAdvancePhase::Idle,
            advanced: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> AutoAdvancePhase {
        self.phase
    }

    #[must_use]
    pub fn lesson_id(&self) -> Option<LessonId> {
        self.lesson_id
    }

    #[must_use]
    pub fn has_advanced(&self) -> bool {
        self.phase == AutoAdvancePhase::Advanced
    }

    /// React to the latest store state.
    pub fn observe(&mut self, input: AutoAdvanceInput<'_>) -> AutoAdvanceDecision {
        let mut cancelled = false;
        if input.lesson_id != self.lesson_id {
            cancelled = self.phase == AutoAdvancePhase::Pending;
            self.lesson_id = input.lesson_id;
            self.phase = match input.lesson_id {
                Some(id) if self.advanced.contains(&id) => AutoAdvancePhase::Advanced,
                _ => AutoAdvancePhase::Idle,
            };
        }

        if self.phase == AutoAdvancePhase::Pending {
            // Leaving the overview (or reloading) invalidates the pending jump.
            if input.current_step != 0 || input.is_loading {
                self.phase = AutoAdvancePhase::Idle;
                return AutoAdvanceDecision::Cancel;
            }
            return AutoAdvanceDecision::Wait;
        }

        let fallback = if cancelled {
            AutoAdvanceDecision::Cancel
        } else {
            AutoAdvanceDecision::Wait
        };

        if input.lesson_id.is_none()
            || input.is_loading
            || self.phase != AutoAdvancePhase::Idle
            || input.current_step != 0
            || !input.progress.is_completed(SectionId::Overview)
        {
            return fallback;
        }

        match input.outline.first_incomplete(input.progress) {
            Some(section) if section.id != SectionId::Overview => {
                self.phase = AutoAdvancePhase::Pending;
                AutoAdvanceDecision::Schedule {
                    target_step: section.step_index,
                    section: section.id,
                }
            }
            Some(_) => fallback,
            None if input.outline.total_steps() > 0 => {
                self.mark_advanced();
                AutoAdvanceDecision::CompleteLesson
            }
            None => fallback,
        }
    }

    /// The delayed jump elapsed. Returns true if the jump is still valid for
    /// `lesson_id`; the caller then moves to the first incomplete section.
    pub fn fire(&mut self, lesson_id: LessonId) -> bool {
        if self.lesson_id != Some(lesson_id) || self.phase != AutoAdvancePhase::Pending {
            return false;
        }
        self.mark_advanced();
        true
    }

    /// Drop the current lesson and any pending jump. Lessons that already
    /// advanced stay advanced.
    pub fn reset(&mut self) {
        self.lesson_id = None;
        self.phase = AutoAdvancePhase::Idle;
    }

    fn mark_advanced(&mut self) {
        self.phase = AutoAdvancePhase::Advanced;
        if let Some(id) = self.lesson_id {
            self.advanced.insert(id);
        }
    }
}
