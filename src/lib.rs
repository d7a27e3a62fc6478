//! treectl: terminal client for a binary-tree session service
//!
//! Layers, innermost first: `domain` (pure types, layout, validation),
//! `application` (REST client and services), `infrastructure` (I/O and wiring),
//! `cli` (arguments, dispatch, output).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
