//! Input loading and the sequential batch runner for the `revrate` binary.

pub mod input;
pub mod run;
