//! Chrome Vipers recruitment terminal.
//!
//! Walks an applicant through a profile form, a timed decryption test, and a
//! voice-clip initiation judged by a remote generative model, ending in an
//! assigned gang role. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (session state machine, cipher,
//!   countdown, invariants). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting edges (catalog and config files, the model
//!   gateway and its Gemini HTTP backend, prompt rendering). Isolated to
//!   enable scripted gateways in tests.
//! - **[`agents`]**: One wrapper per remote operation, each owning its prompt
//!   and reply schema.
//!
//! [`flow`] orchestrates the two-step analysis pipeline; [`term`] is the
//! thin terminal presentation driving everything through the session's
//! transition methods.

pub mod agents;
pub mod core;
pub mod exit_codes;
pub mod flow;
pub mod io;
pub mod logging;
pub mod term;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
