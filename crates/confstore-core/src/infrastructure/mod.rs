//! Infrastructure layer: everything that touches the outside world.
//!
//! - **`fs`**    – the persistence gateway (`ConfigFs`) with local-disk and
//!   in-memory implementations.
//! - **`paths`** – `~` expansion for configuration paths.
//! - **`sink`**  – diagnostics sinks (`tracing`, no-op, collecting).
//!
//! **Dependency rule**: this layer may depend on `domain`, but `domain` and
//! `parser` MUST NOT import it.

pub mod fs;
pub mod paths;
pub mod sink;
