//! Step definitions for placement BDD scenarios.

pub mod world;
