//! In-process stand-in for the LOKIZ backend, shared by the flows under `tests/`.

pub mod support;
