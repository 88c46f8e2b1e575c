use lesson_core::model::LessonId;
use lesson_core::navigation::NavigationControls;

use crate::notice::Notice;
use crate::store::LessonStore;

/// Where the learner lands after finishing a lesson.
#[must_use]
pub fn completion_route(id: LessonId) -> String {
    format!("/dashboard/lessons/completed/{id}")
}

/// What a press of "Next" did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// A redirect is already in flight.
    Ignored,
    /// The current section is not completed yet.
    Blocked,
    Moved { step: usize },
    /// At the last step, but the lesson is not ready to finish.
    Stayed,
    /// The lesson was marked complete upstream; navigate to `redirect`.
    Completed { redirect: String },
    CompletionFailed,
}

/// Previous/next/jump actions on top of a `LessonStore`.
#[derive(Clone)]
pub struct LessonNavigator {
    store: LessonStore,
}

impl LessonNavigator {
    #[must_use]
    pub fn new(store: LessonStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &LessonStore {
        &self.store
    }

    #[must_use]
    pub fn controls(&self) -> NavigationControls {
        self.store.read(|s| s.controls())
    }

    pub fn handle_prev(&self) -> bool {
        if self.store.read(|s| s.is_redirecting) {
            return false;
        }
        self.store.prev_step()
    }

    pub fn navigate_to_section(&self, step: usize) -> bool {
        if self.store.read(|s| s.is_redirecting) {
            return false;
        }
        self.store.navigate_to_section(step)
    }

    /// Advance one step, or finish the lesson from the last step once every
    /// section is complete.
    pub async fn handle_next(&self) -> NextOutcome {
        if self.store.read(|s| s.is_redirecting) {
            return NextOutcome::Ignored;
        }
        if !self.store.check_current_step_completion() {
            self.store.push_notice(
                Notice::error("Cannot proceed")
                    .with_description("Please complete the current section first."),
            );
            return NextOutcome::Blocked;
        }
        if self.store.next_step() {
            return NextOutcome::Moved {
                step: self.store.current_step(),
            };
        }

        let ready = self.store.read(|s| {
            let is_last = s.lesson.is_some() && s.current_step == s.outline.last_step();
            let finished = s.outline.all_complete(&s.progress);
            s.lesson_id()
                .filter(|_| is_last && finished && !s.celebration_shown)
        });
        let Some(lesson_id) = ready else {
            return NextOutcome::Stayed;
        };

        self.store.set_redirecting(true);
        match self.store.api().complete_lesson(lesson_id).await {
            Ok(_) => {
                self.store.set_celebration_shown(true);
                tracing::info!(lesson_id = %lesson_id, "lesson completed");
                NextOutcome::Completed {
                    redirect: completion_route(lesson_id),
                }
            }
            Err(err) => {
                tracing::warn!(lesson_id = %lesson_id, error = %err, "failed to complete lesson");
                self.store.set_redirecting(false);
                self.store.set_celebration_shown(false);
                self.store.push_notice(
                    Notice::error("Failed to load completion summary")
                        .with_description("Please try finishing the lesson again."),
                );
                NextOutcome::CompletionFailed
            }
        }
    }
}
