// Composition root for the background process.
//
// Responsibilities
// - Read config from environment.
// - Instantiate concrete adapters.
// - Wire them into the runner.

pub mod state;
