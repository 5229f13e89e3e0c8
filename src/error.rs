use thiserror::Error;

/// Failures surfaced by feed, follow and post operations.
///
/// Validation problems are not errors here; they come back as
/// [`crate::forms::FormErrors`] values so the form can be re-rendered.
#[derive(Debug, Error)]
pub enum BlogError {
    /// An unknown group slug, username or post id.
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BlogError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type BlogResult<T> = Result<T, BlogError>;

/// Turn a missing row into [`BlogError::NotFound`].
pub trait OrNotFound<T> {
    /// # Errors
    ///
    /// Returns `NotFound(what)` when the value is absent.
    fn or_not_found(self, what: &'static str) -> BlogResult<T>;
}

impl<T> OrNotFound<T> for anyhow::Result<Option<T>> {
    fn or_not_found(self, what: &'static str) -> BlogResult<T> {
        self?.ok_or(BlogError::NotFound(what))
    }
}
