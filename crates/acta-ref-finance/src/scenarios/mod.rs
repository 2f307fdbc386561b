//! Finance reference demo scenarios.
//!
//! Each scenario is a self-contained module that wires real components
//! (scripted reasoning client, marker parser, tool registry, audit sink)
//! over the seeded ledger and demonstrates one loop behavior end to end.

pub mod expense_audit;
pub mod runaway_loop;
pub mod unknown_tool;
