// Application layer: the ledger store, input validation and report shapes.
// This is the surface every client (the CLI, tests, a future UI) talks to.

pub mod error;
pub mod reporting;
pub mod store;
pub mod validation;

pub use error::*;
pub use reporting::*;
pub use store::*;
pub use validation::*;
