//! Wrapping engine: building fresh causes, tagging existing failures, and
//! tagging whatever fails inside a callback.

use std::any::Any;
use std::panic::UnwindSafe;

use crate::cause::Cause;
use crate::error::Error;
use crate::taxonomy::Category;
use crate::types::CauseKind;

/// A failure value that can be lifted into a [`Cause`].
///
/// Implemented for every `std::error::Error`. A value that already is a
/// [`Cause`] comes back unchanged, so its kind and categories survive.
pub trait IntoCause {
    fn into_cause(self) -> Cause;
}

impl<E> IntoCause for E
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[track_caller]
    fn into_cause(self) -> Cause {
        Cause::from_boxed(Box::new(self))
    }
}

impl Category {
    /// A fresh cause of this category's effective kind, tagged with the
    /// category and all of its ancestors.
    #[track_caller]
    pub fn construct(&self, message: impl Into<String>, data: Option<serde_json::Value>) -> Cause {
        let mut cause = Cause::new(self.effective_cause_kind(), message);
        cause.attach_data(data);
        cause.tag(self);
        cause
    }

    /// Tags an existing failure with this category and its ancestors. Kind and
    /// message are left untouched; `data` is only used when none is attached.
    #[track_caller]
    pub fn wrap(&self, failure: impl IntoCause, data: Option<serde_json::Value>) -> Cause {
        let mut cause = failure.into_cause();
        cause.attach_data(data);
        cause.tag(self);
        cause
    }

    /// [`wrap`](Self::wrap) for values of unknown type.
    ///
    /// Accepts a [`Cause`], a boxed error, a `std::io::Error`, or a `String` /
    /// `&'static str` message (lifted as [`CauseKind::Runtime`]).
    #[track_caller]
    pub fn wrap_value(
        &self,
        value: Box<dyn Any + Send>,
        data: Option<serde_json::Value>,
    ) -> Result<Cause, Error> {
        match lift_value(value) {
            Ok(cause) => Ok(self.wrap(cause, data)),
            Err(value) => Err(Error::InvalidWrapArgument {
                type_id: (*value).type_id(),
            }),
        }
    }

    /// Runs `f`; a failure escaping it comes back tagged with this category.
    #[track_caller]
    pub fn wrap_callable<T, E, F>(&self, f: F) -> Result<T, Cause>
    where
        E: IntoCause,
        F: FnOnce() -> Result<T, E>,
    {
        match f() {
            Ok(value) => Ok(value),
            Err(failure) => Err(self.wrap(failure, None)),
        }
    }

    /// Runs `f`, turning a panic with a message payload into a tagged cause.
    /// Panics carrying any other payload are resumed unchanged.
    #[track_caller]
    pub fn wrap_unwind<T, F>(&self, f: F) -> Result<T, Cause>
    where
        F: FnOnce() -> T + UnwindSafe,
    {
        match std::panic::catch_unwind(f) {
            Ok(value) => Ok(value),
            Err(payload) => match lift_value(payload) {
                Ok(cause) => Err(self.wrap(cause, None)),
                Err(payload) => std::panic::resume_unwind(payload),
            },
        }
    }
}

/// Hands the value back when it is not a recognizable failure.
#[track_caller]
fn lift_value(value: Box<dyn Any + Send>) -> Result<Cause, Box<dyn Any + Send>> {
    let value = match value.downcast::<Cause>() {
        Ok(cause) => return Ok(*cause),
        Err(value) => value,
    };
    let value = match value.downcast::<Box<dyn std::error::Error + Send + Sync>>() {
        Ok(raw) => return Ok(Cause::from_boxed(*raw)),
        Err(value) => value,
    };
    let value = match value.downcast::<std::io::Error>() {
        Ok(raw) => return Ok((*raw).into_cause()),
        Err(value) => value,
    };
    let value = match value.downcast::<String>() {
        Ok(message) => return Ok(Cause::new(CauseKind::Runtime, *message)),
        Err(value) => value,
    };
    match value.downcast::<&'static str>() {
        Ok(message) => Ok(Cause::new(CauseKind::Runtime, *message)),
        Err(value) => Err(value),
    }
}
