//! Session-level services built on the repositories.

pub mod designer;

pub use designer::DesignSession;
