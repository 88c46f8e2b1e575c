use std::sync::Arc;

use lesson_core::rbac::{AuthUser, UserRole};
use services::{AutoAdvanceScheduler, LessonNavigator, LessonStore};

pub trait UiApp: Send + Sync {
    fn lesson_store(&self) -> LessonStore;

    /// The signed-in user, if any.
    fn current_user(&self) -> Option<AuthUser>;
}

/// Shared services for every view. Cloning is cheap; all clones see the same store.
#[derive(Clone)]
pub struct AppContext {
    store: LessonStore,
    navigator: LessonNavigator,
    auto_advance: Arc<AutoAdvanceScheduler>,
    user: Option<AuthUser>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        let store = app.lesson_store();
        Self {
            navigator: LessonNavigator::new(store.clone()),
            auto_advance: Arc::new(AutoAdvanceScheduler::new(store.clone())),
            user: app.current_user(),
            store,
        }
    }

    #[must_use]
    pub fn lesson_store(&self) -> LessonStore {
        self.store.clone()
    }

    #[must_use]
    pub fn navigator(&self) -> LessonNavigator {
        self.navigator.clone()
    }

    #[must_use]
    pub fn auto_advance(&self) -> Arc<AutoAdvanceScheduler> {
        Arc::clone(&self.auto_advance)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    /// Users without a session are treated as guests.
    #[must_use]
    pub fn role(&self) -> UserRole {
        self.user
            .as_ref()
            .map_or(UserRole::Guest, AuthUser::primary_role)
    }
}

// Provided by the composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
