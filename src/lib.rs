//! agentflow - a simulated agentic workflow with a gated security step
//!
//! The library holds the workflow controller, the reveal and OTP models, and
//! the drivers (TUI and headless) used by the binary.

pub mod app;
pub mod config;
pub mod headless;
pub mod logging;
pub mod otp;
pub mod reveal;
pub mod ui;
pub mod workflow;
