pub(crate) mod auth;
pub(crate) mod cors;
pub(crate) mod logging;
pub(crate) mod recovery;
