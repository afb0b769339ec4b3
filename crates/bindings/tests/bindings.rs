//! Sanity checks for the generated bindings.

use alloy_primitives::{Address, U256, keccak256};
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use permission_bindings::{
    AccountManager, CONTRACTS, NodeManager, OrgManager, PermissionsImplementation,
    PermissionsInterface, PermissionsUpgradable, RoleManager, VoterManager,
};

fn selector(signature: &str) -> [u8; 4] {
    keccak256(signature)[..4].try_into().unwrap()
}

#[test]
fn lists_every_contract() {
    assert_eq!(CONTRACTS.len(), 8);
    assert!(CONTRACTS.contains(&"PermissionsInterface"));
    assert!(CONTRACTS.windows(2).all(|w| w[0] < w[1]), "{CONTRACTS:?}");
}

#[test]
fn interface_selectors() {
    assert_eq!(
        PermissionsInterface::addOrgCall::SIGNATURE,
        "addOrg(string,string,address)"
    );
    assert_eq!(
        PermissionsInterface::addOrgCall::SELECTOR,
        selector("addOrg(string,string,address)")
    );
    assert_eq!(
        PermissionsInterface::addNewRoleCall::SELECTOR,
        selector("addNewRole(string,string,uint256,bool,bool)")
    );
    assert_eq!(PermissionsInterface::initCall::SELECTOR, selector("init(uint256,uint256)"));
    assert_eq!(PermissionsUpgradable::initCall::SELECTOR, selector("init(address,address)"));
    assert_eq!(
        PermissionsImplementation::addOrgCall::SELECTOR,
        selector("addOrg(string,string,address,address)")
    );
}

#[test]
fn encodes_call_with_selector_prefix() {
    let call = NodeManager::addNodeCall {
        _enodeId: "enode://abc@127.0.0.1:21000?discport=0".to_string(),
        _orgId: "ORG1".to_string(),
    };
    let data = call.abi_encode();
    assert_eq!(&data[..4], &selector("addNode(string,string)"));

    let decoded = NodeManager::addNodeCall::abi_decode(&data).unwrap();
    assert_eq!(decoded._orgId, "ORG1");
}

#[test]
fn decodes_named_returns() {
    let data = ("ORG1".to_string(), "enode://abc@127.0.0.1:21000".to_string(), U256::from(2))
        .abi_encode_params();
    let ret = NodeManager::getNodeDetailsCall::abi_decode_returns(&data).unwrap();
    assert_eq!(ret._orgId, "ORG1");
    assert_eq!(ret._nodeStatus, U256::from(2));

    let data = (
        "ADMIN".to_string(),
        "NWADMIN".to_string(),
        U256::from(3),
        true,
        true,
        true,
    )
        .abi_encode_params();
    let ret = RoleManager::getRoleDetailsCall::abi_decode_returns(&data).unwrap();
    assert_eq!(ret.roleId, "ADMIN");
    assert_eq!(ret.accessType, U256::from(3));
    assert!(ret.active);
}

#[test]
fn decodes_unnamed_returns() {
    let account = Address::repeat_byte(0x11);
    let data = (account, "ORG1".to_string(), "ORGADMIN".to_string(), U256::from(2), true)
        .abi_encode_params();
    let ret = AccountManager::getAccountDetailsCall::abi_decode_returns(&data).unwrap();
    assert_eq!(ret._0, account);
    assert_eq!(ret._2, "ORGADMIN");
    assert!(ret._4);
}

#[test]
fn event_topics() {
    assert_eq!(
        NodeManager::NodeApproved::SIGNATURE_HASH,
        keccak256("NodeApproved(string,string)")
    );
    assert_eq!(
        OrgManager::OrgPendingApproval::SIGNATURE_HASH,
        keccak256("OrgPendingApproval(string,string,string,uint256,uint256)")
    );
    assert_eq!(
        AccountManager::AccountAccessModified::SIGNATURE_HASH,
        keccak256("AccountAccessModified(address,string,string,bool,uint256)")
    );
    assert_eq!(
        VoterManager::VoterAdded::SIGNATURE_HASH,
        keccak256("VoterAdded(string,address)")
    );
}

#[test]
fn decodes_role_created_log() {
    let event = RoleManager::RoleCreated {
        _roleId: "TXN".to_string(),
        _orgId: "ORG1".to_string(),
        _baseAccess: U256::from(1),
        _isVoter: false,
        _isAdmin: false,
    };
    let log = event.encode_log_data();
    assert_eq!(log.topics()[0], RoleManager::RoleCreated::SIGNATURE_HASH);

    let decoded = RoleManager::RoleCreated::decode_log_data(&log).unwrap();
    assert_eq!(decoded._roleId, "TXN");
    assert_eq!(decoded._baseAccess, U256::from(1));
}

#[test]
fn embedded_abi() {
    let abi = NodeManager::abi::contract();
    assert_eq!(abi.events.len(), 7);
    assert!(abi.function("getNodeDetailsFromIndex").is_some());
    assert!(abi.constructor.is_some());

    let abi = PermissionsImplementation::abi::contract();
    assert!(abi.events.is_empty());
    assert!(abi.function("getPendingOp").is_some());
}

#[test]
fn embedded_bytecode() {
    for code in [
        &PermissionsUpgradable::BYTECODE,
        &PermissionsInterface::BYTECODE,
        &NodeManager::BYTECODE,
        &RoleManager::BYTECODE,
        &VoterManager::BYTECODE,
    ] {
        // solc free memory pointer setup
        assert_eq!(&code[..5], &[0x60, 0x80, 0x60, 0x40, 0x52]);
    }
}
