//! Code generated by permission-bindgen - DO NOT EDIT.
//!
//! Bindings for the `PermissionsUpgradable` contract, expanded by `sol!` from `artifacts/PermissionsUpgradable.json`.

alloy_sol_types::sol!(
    #[derive(Debug)]
    #[sol(rpc, abi)]
    PermissionsUpgradable,
    "artifacts/PermissionsUpgradable.json"
);
