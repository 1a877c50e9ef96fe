pub(crate) mod config;
pub(crate) mod transition_session;
