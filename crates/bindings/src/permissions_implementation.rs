//! Code generated by permission-bindgen - DO NOT EDIT.
//!
//! Bindings for the `PermissionsImplementation` contract, expanded by `sol!` from `artifacts/PermissionsImplementation.json`.

alloy_sol_types::sol!(
    #[derive(Debug)]
    #[sol(rpc, abi)]
    PermissionsImplementation,
    "artifacts/PermissionsImplementation.json"
);
