//! Adapters between the outside world's formats and the domain types.

pub mod csv;
