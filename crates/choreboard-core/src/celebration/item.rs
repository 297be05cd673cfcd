//! Celebration payloads.
//!
//! A [`CelebrationItem`] is built by whoever decided a celebration is due
//! (badge awarding, goal completion, streak tracking) and handed to the queue.
//! It never changes after construction.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifies one display of one item in the current slot.
///
/// Tokens increase monotonically per queue, so a timer carrying an old token
/// can always be told apart from the item that is current now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayToken(u64);

impl DisplayToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DisplayToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A badge the user just unlocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub earned_at: Option<DateTime<Utc>>,
}

/// A family or personal goal that was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub target_points: u32,
    #[serde(default)]
    pub reward: Option<String>,
}

/// A round-number achievement, e.g. a 7-day streak or 100 chores done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneRecord {
    pub id: String,
    pub label: String,
    pub value: u32,
}

/// Discriminant of [`CelebrationItem`], used for per-kind timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelebrationKind {
    Badge,
    Goal,
    Milestone,
}

impl fmt::Display for CelebrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CelebrationKind::Badge => "badge",
            CelebrationKind::Goal => "goal",
            CelebrationKind::Milestone => "milestone",
        };
        f.write_str(s)
    }
}

/// A transient full-screen celebration waiting for, or occupying, the
/// display slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "lowercase")]
pub enum CelebrationItem {
    Badge(BadgeRecord),
    Goal(GoalRecord),
    Milestone(MilestoneRecord),
}

impl CelebrationItem {
    pub fn kind(&self) -> CelebrationKind {
        match self {
            CelebrationItem::Badge(_) => CelebrationKind::Badge,
            CelebrationItem::Goal(_) => CelebrationKind::Goal,
            CelebrationItem::Milestone(_) => CelebrationKind::Milestone,
        }
    }

    /// Id of the underlying badge, goal or milestone record.
    pub fn id(&self) -> &str {
        match self {
            CelebrationItem::Badge(b) => &b.id,
            CelebrationItem::Goal(g) => &g.id,
            CelebrationItem::Milestone(m) => &m.id,
        }
    }

    /// Headline text for the overlay.
    pub fn title(&self) -> &str {
        match self {
            CelebrationItem::Badge(b) => &b.name,
            CelebrationItem::Goal(g) => &g.title,
            CelebrationItem::Milestone(m) => &m.label,
        }
    }

    /// Check that the payload carries everything a presenter needs.
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingField`] for a blank id or headline.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let kind = self.kind();
        let title_field = match kind {
            CelebrationKind::Badge => "name",
            CelebrationKind::Goal => "title",
            CelebrationKind::Milestone => "label",
        };
        if self.id().trim().is_empty() {
            return Err(missing(kind, "id"));
        }
        if self.title().trim().is_empty() {
            return Err(missing(kind, title_field));
        }
        Ok(())
    }
}

fn missing(kind: CelebrationKind, field: &str) -> ValidationError {
    ValidationError::MissingField {
        kind: kind.to_string(),
        field: field.to_string(),
    }
}

impl From<BadgeRecord> for CelebrationItem {
    fn from(badge: BadgeRecord) -> Self {
        CelebrationItem::Badge(badge)
    }
}

impl From<GoalRecord> for CelebrationItem {
    fn from(goal: GoalRecord) -> Self {
        CelebrationItem::Goal(goal)
    }
}

impl From<MilestoneRecord> for CelebrationItem {
    fn from(milestone: MilestoneRecord) -> Self {
        CelebrationItem::Milestone(milestone)
    }
}

#[cfg(test)]
pub(crate) fn badge(id: &str) -> CelebrationItem {
    CelebrationItem::Badge(BadgeRecord {
        id: id.to_string(),
        name: format!("Badge {id}"),
        description: String::new(),
        icon: None,
        earned_at: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_title_follow_variant() {
        let goal = CelebrationItem::from(GoalRecord {
            id: "g1".into(),
            title: "Clean garage".into(),
            target_points: 50,
            reward: Some("Pizza night".into()),
        });
        assert_eq!(goal.kind(), CelebrationKind::Goal);
        assert_eq!(goal.title(), "Clean garage");
        assert!(goal.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_badge_name() {
        let item = CelebrationItem::Badge(BadgeRecord {
            id: "b1".into(),
            name: "   ".into(),
            description: String::new(),
            icon: None,
            earned_at: None,
        });
        assert_eq!(
            item.validate(),
            Err(ValidationError::MissingField {
                kind: "badge".into(),
                field: "name".into()
            })
        );
    }

    #[test]
    fn validate_rejects_blank_id() {
        let item = CelebrationItem::Milestone(MilestoneRecord {
            id: String::new(),
            label: "7 day streak".into(),
            value: 7,
        });
        assert!(matches!(
            item.validate(),
            Err(ValidationError::MissingField { ref field, .. }) if field == "id"
        ));
    }

    #[test]
    fn items_deserialize_from_tagged_json() {
        let json = r#"{"kind":"milestone","payload":{"id":"m1","label":"100 chores","value":100}}"#;
        let item: CelebrationItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind(), CelebrationKind::Milestone);
        assert_eq!(item.title(), "100 chores");
    }
}
