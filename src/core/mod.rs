//! Service layer consumed by whatever transport sits on top of the core.

pub mod services;
