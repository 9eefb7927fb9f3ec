use crate::{ErrString, StrataError};

/// Extension trait attaching context to failed results.
pub trait ResultExt<T>: private::Sealed {
    /// Wrap the error, if any, in a [`StrataError::Context`] built lazily from `msg`.
    fn with_context<F, S>(self, msg: F) -> Result<T, StrataError>
    where
        F: FnOnce() -> S,
        S: Into<ErrString>;
}

mod private {
    pub trait Sealed {}

    impl<T, E> Sealed for Result<T, E> {}
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<StrataError>,
{
    fn with_context<F, S>(self, msg: F) -> Result<T, StrataError>
    where
        F: FnOnce() -> S,
        S: Into<ErrString>,
    {
        self.map_err(|e| e.into().with_context(msg()))
    }
}
