//! Code generated by permission-bindgen - DO NOT EDIT.
//!
//! Bindings for the `VoterManager` contract, expanded by `sol!` from `artifacts/VoterManager.json`.

alloy_sol_types::sol!(
    #[derive(Debug)]
    #[sol(rpc, abi)]
    VoterManager,
    "artifacts/VoterManager.json"
);
