//! Code generated by permission-bindgen - DO NOT EDIT.
//!
//! Bindings for the `AccountManager` contract, expanded by `sol!` from `artifacts/AccountManager.json`.

alloy_sol_types::sol!(
    #[derive(Debug)]
    #[sol(rpc, abi)]
    AccountManager,
    "artifacts/AccountManager.json"
);
