use serde::{Deserialize, Serialize};

use super::PersistHooks;

pub const STATE_DISABLED: i32 = 0;
pub const STATE_ENABLED: i32 = 1;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_AUTHOR_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub state: i32,
    pub created_by: String,
    pub modified_by: String,
    pub created_on: i64,
    pub modified_on: i64,
}

impl Tag {
    pub const HOOKS: PersistHooks<Tag> = PersistHooks {
        before_create: stamp_created,
        before_update: stamp_modified,
    };

    /// Unsaved tag; the store assigns `id` and the hooks stamp the times.
    pub fn new(name: String, state: i32, created_by: String) -> Self {
        Self {
            id: 0,
            name,
            state,
            created_by,
            modified_by: String::new(),
            created_on: 0,
            modified_on: 0,
        }
    }
}

fn stamp_created(tag: &mut Tag, now: i64) {
    tag.created_on = now;
    tag.modified_on = now;
}

fn stamp_modified(tag: &mut Tag, now: i64) {
    tag.modified_on = now;
}

pub fn is_valid_state(state: i32) -> bool {
    state == STATE_DISABLED || state == STATE_ENABLED
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TagFilter {
    pub name: Option<String>,
    pub state: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct TagQuery {
    pub name: Option<String>,
    pub state: Option<i32>,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub state: Option<i32>,
    pub created_by: String,
}

#[derive(Debug, Deserialize)]
pub struct EditTag {
    pub name: Option<String>,
    pub state: Option<i32>,
    pub modified_by: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagList {
    pub lists: Vec<Tag>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_hook_stamps_both_times() {
        let mut tag = Tag::new("rust".into(), STATE_ENABLED, "alice".into());
        (Tag::HOOKS.before_create)(&mut tag, 42);
        assert_eq!((tag.created_on, tag.modified_on), (42, 42));
    }

    #[test]
    fn update_hook_leaves_created_on() {
        let mut tag = Tag::new("rust".into(), STATE_ENABLED, "alice".into());
        (Tag::HOOKS.before_create)(&mut tag, 42);
        (Tag::HOOKS.before_update)(&mut tag, 99);
        assert_eq!((tag.created_on, tag.modified_on), (42, 99));
    }

    #[test]
    fn only_zero_and_one_are_states() {
        assert!(is_valid_state(0));
        assert!(is_valid_state(1));
        assert!(!is_valid_state(2));
        assert!(!is_valid_state(-1));
    }
}
