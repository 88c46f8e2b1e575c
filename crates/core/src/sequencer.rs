//! Ordered sections of a lesson: overview, one per concept, summary, practice.

use crate::model::Concept;
use crate::progress::{ProgressMap, SectionId, SectionKind};

/// Sections that are not concepts.
pub const FIXED_SECTIONS: usize = 3;

#[must_use]
pub const fn total_steps(concept_count: usize) -> usize {
    concept_count + FIXED_SECTIONS
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: SectionId,
    pub kind: SectionKind,
    pub title: String,
    pub step_index: usize,
}

/// The sequenced sections of one lesson.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LessonOutline {
    sections: Vec<Section>,
}

impl LessonOutline {
    #[must_use]
    pub fn from_concepts(concepts: &[Concept]) -> Self {
        let mut sections = Vec::with_capacity(total_steps(concepts.len()));
        sections.push(Section {
            id: SectionId::Overview,
            kind: SectionKind::Overview,
            title: "Overview".to_string(),
            step_index: 0,
        });
        for (idx, concept) in concepts.iter().enumerate() {
            let title = if concept.title.trim().is_empty() {
                format!("Concept {}", idx + 1)
            } else {
                concept.title.clone()
            };
            sections.push(Section {
                id: SectionId::Concept(concept.id),
                kind: SectionKind::Concept,
                title,
                step_index: idx + 1,
            });
        }
        sections.push(Section {
            id: SectionId::SummaryApplication,
            kind: SectionKind::SummaryApplication,
            title: "Summary".to_string(),
            step_index: concepts.len() + 1,
        });
        sections.push(Section {
            id: SectionId::GeneralExercises,
            kind: SectionKind::GeneralExercises,
            title: "Practice".to_string(),
            step_index: concepts.len() + 2,
        });
        Self { sections }
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Zero for an outline that was never built from a lesson.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn last_step(&self) -> usize {
        self.sections.len().saturating_sub(1)
    }

    #[must_use]
    pub fn concept_count(&self) -> usize {
        self.sections.len().saturating_sub(FIXED_SECTIONS)
    }

    #[must_use]
    pub fn section_at(&self, step: usize) -> Option<&Section> {
        self.sections.get(step)
    }

    #[must_use]
    pub fn step_of(&self, id: SectionId) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.sections.iter().map(|s| s.id)
    }

    /// First section, in lesson order, that is not completed.
    #[must_use]
    pub fn first_incomplete(&self, progress: &ProgressMap) -> Option<&Section> {
        self.sections.iter().find(|s| !progress.is_completed(s.id))
    }

    /// True when every section of this outline is completed. Progress for
    /// sections outside the outline is ignored.
    #[must_use]
    pub fn all_complete(&self, progress: &ProgressMap) -> bool {
        !self.sections.is_empty() && self.ids().all(|id| progress.is_completed(id))
    }

    #[must_use]
    pub fn completed_count(&self, progress: &ProgressMap) -> usize {
        self.ids().filter(|id| progress.is_completed(*id)).count()
    }

    /// A section is reachable when it is completed, is the current step, or is the first one.
    #[must_use]
    pub fn is_accessible(&self, step: usize, current_step: usize, progress: &ProgressMap) -> bool {
        let Some(section) = self.section_at(step) else {
            return false;
        };
        step == 0 || step == current_step || progress.is_completed(section.id)
    }
}
