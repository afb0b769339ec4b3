//! Code generated by permission-bindgen - DO NOT EDIT.
//!
//! Bindings for the `NodeManager` contract, expanded by `sol!` from `artifacts/NodeManager.json`.

alloy_sol_types::sol!(
    #[derive(Debug)]
    #[sol(rpc, abi)]
    NodeManager,
    "artifacts/NodeManager.json"
);
