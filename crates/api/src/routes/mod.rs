//! Route handlers

pub mod diagnosis;
pub mod form;
pub mod health;
