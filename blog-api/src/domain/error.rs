use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resource {
    User,
    Post,
    Comment,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::User => "user",
            Resource::Post => "post",
            Resource::Comment => "comment",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    /// Absent resource, or one owned by somebody else.
    #[error("{0} not found")]
    NotFound(Resource),

    /// A comment refers to a post that does not exist.
    #[error("post does not exist")]
    PostMissing,

    #[error("{0} is exist")]
    AlreadyExists(&'static str),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("two password not match")]
    PasswordMismatch,

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}
