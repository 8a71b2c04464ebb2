//! Subcommands

pub mod inspect;
pub mod paths;
pub mod view;
