//! Code generated by permission-bindgen - DO NOT EDIT.
//!
//! Bindings for the `PermissionsInterface` contract, expanded by `sol!` from `artifacts/PermissionsInterface.json`.

alloy_sol_types::sol!(
    #[derive(Debug)]
    #[sol(rpc, abi)]
    PermissionsInterface,
    "artifacts/PermissionsInterface.json"
);
