pub mod auth;
pub mod tag;

/// Callbacks run on an entity right before it is written, given the current
/// unix time in seconds.
pub struct PersistHooks<T> {
    pub before_create: fn(&mut T, i64),
    pub before_update: fn(&mut T, i64),
}

impl<T> Clone for PersistHooks<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PersistHooks<T> {}
