use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use lesson_core::auto_advance::{AUTO_ADVANCE_DELAY, AutoAdvance, AutoAdvanceDecision};
use lesson_core::model::LessonId;

use crate::notice::Notice;
use crate::store::LessonStore;

/// Runs the auto-advance state machine against a `LessonStore` and owns the
/// delayed jump. The pending task is aborted on cancel, on lesson change and on drop.
pub struct AutoAdvanceScheduler {
    store: LessonStore,
    controller: Arc<Mutex<AutoAdvance>>,
    task: Mutex<Option<JoinHandle<()>>>,
    delay: Duration,
}

impl AutoAdvanceScheduler {
    #[must_use]
    pub fn new(store: LessonStore) -> Self {
        Self::with_delay(store, AUTO_ADVANCE_DELAY)
    }

    #[must_use]
    pub fn with_delay(store: LessonStore, delay: Duration) -> Self {
        Self {
            store,
            controller: Arc::new(Mutex::new(AutoAdvance::new())),
            task: Mutex::new(None),
            delay,
        }
    }

    #[must_use]
    pub fn has_advanced(&self) -> bool {
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .has_advanced()
    }

    /// Feed the current store state to the controller and act on its decision.
    ///
    /// Call after the lesson loads and whenever the step changes. Must be
    /// called from within a tokio runtime.
    pub fn sync(&self) -> AutoAdvanceDecision {
        let (decision, lesson_id) = self.store.read(|state| {
            let mut controller = self
                .controller
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            (controller.observe(state.auto_advance_input()), state.lesson_id())
        });

        match decision {
            AutoAdvanceDecision::Wait => {}
            AutoAdvanceDecision::Cancel => self.abort_task(),
            AutoAdvanceDecision::Schedule {
                target_step,
                section,
            } => {
                tracing::debug!(target_step, %section, "scheduling auto-advance");
                self.store
                    .push_notice(Notice::info("Resuming where you left off..."));
                if let Some(lesson_id) = lesson_id {
                    self.spawn_jump(lesson_id);
                }
            }
            AutoAdvanceDecision::CompleteLesson => {
                self.store.set_celebration_shown(true);
                self.store.push_notice(
                    Notice::success("Lesson completed!")
                        .with_description("You've finished all sections. Great work!"),
                );
            }
        }
        decision
    }

    /// Abort a pending jump, e.g. when the view unmounts. Lessons that already
    /// advanced are remembered for the rest of the session.
    pub fn cancel(&self) {
        self.abort_task();
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();
    }

    fn spawn_jump(&self, lesson_id: LessonId) {
        self.abort_task();
        let store = self.store.clone();
        let controller = Arc::clone(&self.controller);
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let armed = controller
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .fire(lesson_id);
            let still_on_overview =
                store.read(|s| s.lesson_id() == Some(lesson_id) && s.current_step == 0);
            if !armed || !still_on_overview {
                return;
            }
            match store.auto_advance_to_next_section() {
                Some(step) => tracing::debug!(lesson_id = %lesson_id, step, "auto-advanced"),
                None => tracing::debug!(lesson_id = %lesson_id, "nothing left to resume"),
            }
        });
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    fn abort_task(&self) {
        if let Some(handle) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for AutoAdvanceScheduler {
    fn drop(&mut self) {
        self.abort_task();
    }
}
