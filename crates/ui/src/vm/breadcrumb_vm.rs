use services::LessonState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrumbState {
    Current,
    Completed,
    Available,
    Locked,
}

impl CrumbState {
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Current => "crumb current",
            Self::Completed => "crumb completed",
            Self::Available => "crumb available",
            Self::Locked => "crumb locked",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreadcrumbItemVm {
    pub step: usize,
    pub title: String,
    pub state: CrumbState,
    pub badge: Option<String>,
    pub clickable: bool,
}

#[must_use]
pub fn map_breadcrumb(state: &LessonState) -> Vec<BreadcrumbItemVm> {
    state
        .outline
        .sections()
        .iter()
        .map(|section| {
            let step = section.step_index;
            let progress = state.progress.get(section.id);
            let completed = progress.is_some_and(|p| p.is_completed);
            let accessible = state
                .outline
                .is_accessible(step, state.current_step, &state.progress);

            let crumb = if step == state.current_step {
                CrumbState::Current
            } else if completed {
                CrumbState::Completed
            } else if accessible {
                CrumbState::Available
            } else {
                CrumbState::Locked
            };

            let badge = match progress.and_then(|p| p.score) {
                Some(score) => Some(format!("{score}%")),
                None if completed => Some("✓".to_string()),
                None => None,
            };

            BreadcrumbItemVm {
                step,
                title: section.title.clone(),
                state: crumb,
                badge,
                clickable: accessible,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use lesson_core::model::{Concept, ConceptId};
    use lesson_core::progress::{ProgressMap, SectionId};
    use lesson_core::sequencer::LessonOutline;
    use lesson_core::time::fixed_now;
    use serde_json::json;

    use super::*;

    fn state_at(step: usize) -> LessonState {
        let concepts: Vec<Concept> = serde_json::from_value(json!([
            {"id": 1, "title": "Halves"},
            {"id": 2, "title": ""}
        ]))
        .unwrap();
        let mut state = LessonState::default();
        state.outline = LessonOutline::from_concepts(&concepts);
        state.progress = ProgressMap::for_lesson(&concepts, 0);
        state.current_step = step;
        state
    }

    #[test]
    fn states_and_badges_follow_progress() {
        let mut state = state_at(2);
        state
            .progress
            .mark_completed(SectionId::Overview, fixed_now(), None);
        state
            .progress
            .mark_completed(SectionId::Concept(ConceptId::new(1)), fixed_now(), Some(80));

        let items = map_breadcrumb(&state);
        assert_eq!(items.len(), 5);

        assert_eq!(items[0].state, CrumbState::Completed);
        assert_eq!(items[0].badge.as_deref(), Some("✓"));
        assert_eq!(items[1].state, CrumbState::Completed);
        assert_eq!(items[1].badge.as_deref(), Some("80%"));

        assert_eq!(items[2].title, "Concept 2");
        assert_eq!(items[2].state, CrumbState::Current);
        assert!(items[2].clickable);

        assert_eq!(items[3].state, CrumbState::Locked);
        assert!(!items[3].clickable);
        assert_eq!(items[4].title, "Practice");
        assert_eq!(items[4].badge, None);
    }

    #[test]
    fn overview_stays_reachable() {
        let items = map_breadcrumb(&state_at(1));
        assert_eq!(items[0].state, CrumbState::Available);
        assert!(items[0].clickable);
        assert_eq!(items[0].state.class(), "crumb available");
    }
}
