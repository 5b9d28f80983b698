// Typed async clients for the services back-office jobs talk to.
//
// **Architecture Overview:**
// - `core/` = Range arithmetic, name matching, message composition and the
//   traits the services are written against (no HTTP types)
// - `infra/` = Implementations of core traits (Google, Chatwork, Slack, AWS,
//   WebDriver over HTTP)
//
// The `office-hooks` binary wires these to environment configuration.

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
pub mod core;
#[path = "infra/infra_layer.rs"]
pub mod infra;
