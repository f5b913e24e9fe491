//! Application layer.
//!
//! - **`store`** – [`ConfigStore`](store::ConfigStore): owns the document
//!   and the handler registry, exposes get/set/remove/list, persists through
//!   the `ConfigFs` gateway, and dispatches handlers.

pub mod store;
