use crate::error::Error;

/// Current step within a lesson. The index never leaves `0..total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCursor {
    index: usize,
    total: usize,
}

impl StepCursor {
    /// # Errors
    ///
    /// Returns `Error::EmptyOutline` when `total` is zero.
    pub fn new(total: usize) -> Result<Self, Error> {
        if total == 0 {
            return Err(Error::EmptyOutline);
        }
        Ok(Self { index: 0, total })
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }

    /// Returns true if the index moved.
    pub fn prev(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Returns true if the index moved.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// # Errors
    ///
    /// Returns `Error::StepOutOfRange` and leaves the index untouched when `step >= total`.
    pub fn jump(&mut self, step: usize) -> Result<(), Error> {
        if step >= self.total {
            return Err(Error::StepOutOfRange {
                step,
                total: self.total,
            });
        }
        self.index = step;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextLabel {
    Next,
    FinishLesson,
    Redirecting,
}

impl NextLabel {
    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Self::Next => "Next",
            Self::FinishLesson => "Finish Lesson",
            Self::Redirecting => "Loading...",
        }
    }

    #[must_use]
    pub fn aria_label(self) -> &'static str {
        match self {
            Self::Next | Self::Redirecting => "Go to next section",
            Self::FinishLesson => "Finish lesson",
        }
    }
}

/// Derived state of the previous/next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationControls {
    pub current_step: usize,
    pub total_steps: usize,
    pub is_redirecting: bool,
}

impl NavigationControls {
    #[must_use]
    pub fn new(current_step: usize, total_steps: usize, is_redirecting: bool) -> Self {
        Self {
            current_step,
            total_steps,
            is_redirecting,
        }
    }

    #[must_use]
    pub fn is_last_step(&self) -> bool {
        self.total_steps > 0 && self.current_step + 1 == self.total_steps
    }

    #[must_use]
    pub fn previous_disabled(&self) -> bool {
        self.current_step == 0 || self.is_redirecting
    }

    #[must_use]
    pub fn next_disabled(&self) -> bool {
        self.is_redirecting || self.total_steps == 0
    }

    #[must_use]
    pub fn next_label(&self) -> NextLabel {
        if self.is_redirecting {
            NextLabel::Redirecting
        } else if self.is_last_step() {
            NextLabel::FinishLesson
        } else {
            NextLabel::Next
        }
    }

    #[must_use]
    pub fn position_label(&self) -> String {
        format!("{} / {}", self.current_step + 1, self.total_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_stays_in_bounds() {
        let mut cursor = StepCursor::new(5).unwrap();
        assert!(!cursor.prev());
        assert_eq!(cursor.index(), 0);
        for expected in 1..5 {
            assert!(cursor.next());
            assert_eq!(cursor.index(), expected);
        }
        assert!(!cursor.next());
        assert_eq!(cursor.index(), 4);
        assert!(cursor.is_last());
    }

    #[test]
    fn jump_rejects_out_of_range() {
        let mut cursor = StepCursor::new(3).unwrap();
        cursor.jump(2).unwrap();
        assert_eq!(
            cursor.jump(3),
            Err(Error::StepOutOfRange { step: 3, total: 3 })
        );
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn empty_cursor_is_rejected() {
        assert_eq!(StepCursor::new(0), Err(Error::EmptyOutline));
    }

    #[test]
    fn controls_relabel_last_step() {
        let first = NavigationControls::new(0, 5, false);
        assert!(first.previous_disabled());
        assert_eq!(first.next_label(), NextLabel::Next);
        assert_eq!(first.position_label(), "1 / 5");

        let last = NavigationControls::new(4, 5, false);
        assert!(!last.previous_disabled());
        assert_eq!(last.next_label(), NextLabel::FinishLesson);
        assert_eq!(last.next_label().text(), "Finish Lesson");

        let busy = NavigationControls::new(4, 5, true);
        assert!(busy.previous_disabled());
        assert!(busy.next_disabled());
        assert_eq!(busy.next_label(), NextLabel::Redirecting);
    }
}
