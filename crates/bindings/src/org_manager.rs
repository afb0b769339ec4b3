//! Code generated by permission-bindgen - DO NOT EDIT.
//!
//! Bindings for the `OrgManager` contract, expanded by `sol!` from `artifacts/OrgManager.json`.

alloy_sol_types::sol!(
    #[derive(Debug)]
    #[sol(rpc, abi)]
    OrgManager,
    "artifacts/OrgManager.json"
);
