// Library surface for headless/integration tests and the binary.
pub mod config;
pub mod corpus;
pub mod display;
pub mod runtime;
pub mod scores;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod shutdown;
