//! Adapters between the core and the outside world (file formats, CLI).

pub mod csv;
