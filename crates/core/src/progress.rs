use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;
use crate::model::{CheckMarker, Concept, ConceptId, ExerciseId};

//
// ─── SECTION IDS ───────────────────────────────────────────────────────────────
//

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Overview,
    Concept,
    SummaryApplication,
    GeneralExercises,
}

impl SectionKind {
    /// Kind of the section rendered at `step` for a lesson with `concept_count` concepts.
    ///
    /// Out-of-range steps fall back to the overview.
    #[must_use]
    pub fn at_step(step: usize, concept_count: usize) -> Self {
        match step {
            0 => Self::Overview,
            s if s <= concept_count => Self::Concept,
            s if s == concept_count + 1 => Self::SummaryApplication,
            s if s == concept_count + 2 => Self::GeneralExercises,
            _ => Self::Overview,
        }
    }

    /// Long-form heading used above the section body.
    #[must_use]
    pub fn heading(self, concept_index: Option<usize>) -> String {
        match self {
            Self::Overview => "Overview".to_string(),
            Self::Concept => match concept_index {
                Some(idx) => format!("Concept {}", idx + 1),
                None => "Concept".to_string(),
            },
            Self::SummaryApplication => "Summary & Application".to_string(),
            Self::GeneralExercises => "General Exercises".to_string(),
        }
    }
}

/// Key of a navigable section: `overview`, `concept_{id}`, `summary_application`
/// or `general_exercises`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionId {
    Overview,
    Concept(ConceptId),
    SummaryApplication,
    GeneralExercises,
}

impl SectionId {
    #[must_use]
    pub fn kind(self) -> SectionKind {
        match self {
            Self::Overview => SectionKind::Overview,
            Self::Concept(_) => SectionKind::Concept,
            Self::SummaryApplication => SectionKind::SummaryApplication,
            Self::GeneralExercises => SectionKind::GeneralExercises,
        }
    }

    /// Resolve a check-marker key against the lesson's ordered concepts.
    ///
    /// Positional keys (`concept_one` .. `concept_seven`) refer to the n-th concept.
    #[must_use]
    pub fn from_marker_key(key: &str, concepts: &[Concept]) -> Option<Self> {
        const POSITIONAL: [&str; 7] = [
            "concept_one",
            "concept_two",
            "concept_three",
            "concept_four",
            "concept_five",
            "concept_six",
            "concept_seven",
        ];
        let key = key.trim();
        if let Some(pos) = POSITIONAL.iter().position(|k| *k == key) {
            return concepts.get(pos).map(|c| Self::Concept(c.id));
        }
        match key {
            "summary" | "application" => Some(Self::SummaryApplication),
            other => other
                .parse::<Self>()
                .ok()
                .filter(|id| match id {
                    Self::Concept(cid) => concepts.iter().any(|c| c.id == *cid),
                    _ => true,
                }),
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overview => f.write_str("overview"),
            Self::Concept(id) => write!(f, "concept_{id}"),
            Self::SummaryApplication => f.write_str("summary_application"),
            Self::GeneralExercises => f.write_str("general_exercises"),
        }
    }
}

impl FromStr for SectionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(Self::Overview),
            "summary_application" => Ok(Self::SummaryApplication),
            "general_exercises" => Ok(Self::GeneralExercises),
            other => other
                .strip_prefix("concept_")
                .and_then(|raw| raw.parse::<ConceptId>().ok())
                .map(Self::Concept)
                .ok_or_else(|| Error::InvalidSectionId(other.to_string())),
        }
    }
}

impl Serialize for SectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SectionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

//
// ─── SECTION PROGRESS ──────────────────────────────────────────────────────────
//

/// Client-side progress of one section. Lives only as long as the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionProgress {
    pub section_id: SectionId,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub exercises_completed: u32,
    pub exercises_total: u32,
    pub attempts: u32,
    /// Percentage, 0..=100.
    pub score: Option<u8>,
    #[serde(skip)]
    solved: BTreeSet<ExerciseId>,
}

impl SectionProgress {
    #[must_use]
    pub fn new(section_id: SectionId, exercises_total: u32) -> Self {
        Self {
            section_id,
            is_completed: false,
            completed_at: None,
            exercises_completed: 0,
            exercises_total,
            attempts: 0,
            score: None,
            solved: BTreeSet::new(),
        }
    }

    pub fn complete(&mut self, at: DateTime<Utc>, score: Option<u8>) {
        if !self.is_completed {
            self.is_completed = true;
            self.completed_at = Some(at);
        }
        if let Some(score) = score {
            self.score = Some(score.min(100));
        }
    }

    /// Record one answer. The section completes once every exercise has been
    /// solved; the score is solved exercises over attempts.
    ///
    /// Returns true when this attempt completed the section.
    pub fn record_attempt(&mut self, exercise: ExerciseId, correct: bool, at: DateTime<Utc>) -> bool {
        self.attempts = self.attempts.saturating_add(1);
        if correct && self.solved.insert(exercise) {
            self.exercises_completed = self.exercises_completed.saturating_add(1);
        }
        if self.is_completed || self.exercises_total == 0 {
            return false;
        }
        if self.exercises_completed < self.exercises_total {
            return false;
        }
        let pct = u64::from(self.exercises_total) * 100 / u64::from(self.attempts.max(1));
        self.complete(at, Some(u8::try_from(pct.min(100)).unwrap_or(100)));
        true
    }

    #[must_use]
    pub fn has_exercises(&self) -> bool {
        self.exercises_total > 0
    }
}

/// Progress for every section of the loaded lesson.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ProgressMap {
    sections: BTreeMap<SectionId, SectionProgress>,
}

impl ProgressMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh, all-incomplete progress for a lesson's concepts.
    #[must_use]
    pub fn for_lesson(concepts: &[Concept], general_exercise_count: usize) -> Self {
        let mut map = Self::new();
        map.insert(SectionProgress::new(SectionId::Overview, 0));
        for concept in concepts {
            let total = u32::try_from(concept.exercises.len()).unwrap_or(u32::MAX);
            map.insert(SectionProgress::new(SectionId::Concept(concept.id), total));
        }
        map.insert(SectionProgress::new(SectionId::SummaryApplication, 0));
        let total = u32::try_from(general_exercise_count).unwrap_or(u32::MAX);
        map.insert(SectionProgress::new(SectionId::GeneralExercises, total));
        map
    }

    /// Mark sections complete from check markers that carry `completed: true`.
    ///
    /// Returns how many sections were marked.
    pub fn seed_from_markers(
        &mut self,
        markers: &[CheckMarker],
        concepts: &[Concept],
        at: DateTime<Utc>,
    ) -> usize {
        let mut marked = 0;
        for marker in markers.iter().filter(|m| m.completed == Some(true)) {
            let Some(id) = SectionId::from_marker_key(&marker.section, concepts) else {
                continue;
            };
            if let Some(progress) = self.sections.get_mut(&id) {
                if !progress.is_completed {
                    progress.complete(at, None);
                    marked += 1;
                }
            }
        }
        marked
    }

    pub fn insert(&mut self, progress: SectionProgress) {
        self.sections.insert(progress.section_id, progress);
    }

    #[must_use]
    pub fn get(&self, id: SectionId) -> Option<&SectionProgress> {
        self.sections.get(&id)
    }

    pub fn get_mut(&mut self, id: SectionId) -> Option<&mut SectionProgress> {
        self.sections.get_mut(&id)
    }

    #[must_use]
    pub fn is_completed(&self, id: SectionId) -> bool {
        self.sections.get(&id).is_some_and(|p| p.is_completed)
    }

    /// Returns false when the section is unknown.
    pub fn mark_completed(&mut self, id: SectionId, at: DateTime<Utc>, score: Option<u8>) -> bool {
        match self.sections.get_mut(&id) {
            Some(progress) => {
                progress.complete(at, score);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.sections.values().filter(|p| p.is_completed).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn clear(&mut self) {
        self.sections.clear();
    }
}

/// Whole-lesson completion percentage, rounded to the nearest integer.
#[must_use]
pub fn percent_complete(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (completed.min(total) * 200 + total) / (2 * total);
    u8::try_from(pct).unwrap_or(100)
}

/// Minutes assumed per section when estimating time remaining.
pub const MINUTES_PER_SECTION: u32 = 5;

/// Estimated minutes left, or `None` once the lesson is complete.
#[must_use]
pub fn estimated_minutes_remaining(percent: u8, total_sections: usize) -> Option<u32> {
    if percent >= 100 || total_sections == 0 {
        return None;
    }
    let completed = usize::from(percent) * total_sections / 100;
    let remaining = u32::try_from(total_sections - completed).unwrap_or(u32::MAX);
    Some(remaining.saturating_mul(MINUTES_PER_SECTION))
}
