pub(crate) mod common;
mod evaluation;
