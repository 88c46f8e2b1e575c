use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

macro_rules! upstream_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self).map_err(|_| Error::InvalidId {
                    kind: stringify!($name),
                    raw: s.to_string(),
                })
            }
        }
    };
}

upstream_id!(
    /// Upstream identifier of a lesson.
    LessonId
);
upstream_id!(
    /// Upstream identifier of a concept within a lesson.
    ConceptId
);
upstream_id!(
    /// Upstream identifier of a concept exercise or general exercise.
    ExerciseId
);
upstream_id!(
    /// Upstream identifier of an authenticated user.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_id_parses_and_displays() {
        let id: LessonId = " 42 ".parse().unwrap();
        assert_eq!(id, LessonId::new(42));
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "LessonId(42)");
    }

    #[test]
    fn invalid_id_reports_kind() {
        let err = "abc".parse::<ConceptId>().unwrap_err();
        assert_eq!(
            err,
            Error::InvalidId {
                kind: "ConceptId",
                raw: "abc".into()
            }
        );
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&ExerciseId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str("9").unwrap();
        assert_eq!(back.value(), 9);
    }
}
