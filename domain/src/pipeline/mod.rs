//! Pipeline subdomain: stages, run state, and the records that flow between stages.

pub mod entities;
pub mod fallback;
pub mod value_objects;
