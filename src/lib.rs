//! CYOA Engine: Choose-Your-Own-Adventure stories as validated page graphs.
//!
//! Parses a line-oriented story description into a graph of pages,
//! validates its structure, plays it interactively with variable-gated
//! choices, and enumerates every path from the start page to each win page.

pub mod core;
pub mod schema;
