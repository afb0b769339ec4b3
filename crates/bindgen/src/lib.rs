//! Generates and verifies the `sol!` bindings of the permissioning contracts from their ABI
//! artifacts.

#[macro_use]
extern crate tracing;

pub mod artifact;
pub use artifact::{ContractArtifact, json_artifacts};

mod sol_macro_gen;
pub use sol_macro_gen::{ARTIFACTS_DIR, GENERATED_HEADER, MultiSolMacroGen, SolMacroGen};
