//! # Domain Layer
//!
//! Operations, their plans and statuses, and the balance snapshot model.
//! Nothing in this layer talks to the chain.

pub mod entities;
pub mod errors;
pub mod value_objects;
