use dioxus::prelude::Key;
use services::LessonState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavVm {
    pub previous_disabled: bool,
    pub next_disabled: bool,
    pub next_label: &'static str,
    pub next_aria_label: &'static str,
    pub position: String,
    pub step: usize,
    pub last_step: usize,
    pub percent_complete: u8,
    pub time_remaining: Option<String>,
}

#[must_use]
pub fn map_nav(state: &LessonState) -> NavVm {
    let controls = state.controls();
    let label = controls.next_label();
    NavVm {
        previous_disabled: controls.previous_disabled(),
        next_disabled: controls.next_disabled(),
        next_label: label.text(),
        next_aria_label: label.aria_label(),
        position: controls.position_label(),
        step: state.current_step,
        last_step: state.outline.last_step(),
        percent_complete: state.percent_complete(),
        time_remaining: state
            .estimated_minutes_remaining()
            .map(|minutes| format!("About {minutes} min left")),
    }
}

/// What a key press on the lesson page asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    Previous,
    Next,
    /// Digit keys 1-9 jump to that section, counted from the overview.
    Section(usize),
}

impl NavVm {
    /// Arrow keys step within the lesson and never finish it; digits jump to
    /// sections that exist.
    #[must_use]
    pub fn key_action(&self, key: &Key) -> Option<NavKey> {
        match key {
            Key::ArrowLeft if self.step > 0 => Some(NavKey::Previous),
            Key::ArrowRight if self.step < self.last_step => Some(NavKey::Next),
            Key::Character(value) => {
                let digit = value.parse::<usize>().ok().filter(|d| (1..=9).contains(d))?;
                let step = digit - 1;
                (step <= self.last_step).then_some(NavKey::Section(step))
            }
            _ => None,
        }
    }
}
