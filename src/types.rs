use std::io;

/// The concrete failure mechanism underlying a [`Cause`](crate::Cause).
///
/// Independent of taxonomy categories: a category only declares which kind it
/// constructs by default, wrapping never changes the kind of an existing cause.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
    strum_macros::VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CauseKind {
    #[default]
    Generic,
    Runtime,
    Io,
    Argument,
    Type,
    NotFound,
    Timeout,
    Permission,
}

impl CauseKind {
    /// Kind reported by a raw error of unknown provenance.
    pub fn of_error(err: &(dyn std::error::Error + 'static)) -> Self {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Self::of_io(io_err.kind());
        }
        if err.is::<std::num::ParseIntError>()
            || err.is::<std::num::ParseFloatError>()
            || err.is::<std::str::ParseBoolError>()
            || err.is::<std::str::Utf8Error>()
            || err.is::<std::string::FromUtf8Error>()
        {
            return Self::Argument;
        }
        if err.is::<std::fmt::Error>() {
            return Self::Runtime;
        }
        Self::Generic
    }

    pub fn of_io(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout,
            io::ErrorKind::PermissionDenied => Self::Permission,
            io::ErrorKind::InvalidInput => Self::Argument,
            _ => Self::Io,
        }
    }
}

/// One entry of a JSON taxonomy declaration, see [`Registry::load_json`](crate::Registry::load_json).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CategoryDecl {
    /// Unique category name.
    pub name: String,
    /// Parent names in declaration order; each must already be defined.
    #[serde(default)]
    pub parents: Vec<String>,
    /// Kind constructed by default, inherited when absent.
    #[serde(default)]
    pub cause_kind: Option<CauseKind>,
}
