//! Code generated by permission-bindgen - DO NOT EDIT.
//!
//! Bindings for the `RoleManager` contract, expanded by `sol!` from `artifacts/RoleManager.json`.

alloy_sol_types::sol!(
    #[derive(Debug)]
    #[sol(rpc, abi)]
    RoleManager,
    "artifacts/RoleManager.json"
);
