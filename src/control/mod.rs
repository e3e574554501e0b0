//! Fill-level signal processing: range → fill → emptied.

pub mod emptied;
pub mod fill;
