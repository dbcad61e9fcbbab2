use alloy::primitives::U256;
use std::fs;

use crate::test_utils::{MockZkChain, write_default_artifacts};
use zkpay::Error;
use zkpay::logger::RunLog;
use zkpay::models::ContractName;
use zkpay::services::deploy::{
    ArtifactStore, ConstructorArg, ContractDeployer, DeployStep, DeploymentPipeline, default_plan,
};
use zkpay::services::propagation::{AddressBook, extract_addresses_from_log};
use zkpay::services::zksync::CallTarget;

struct Fixture {
    dir: tempfile::TempDir,
    artifacts: ArtifactStore,
    log: RunLog,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_default_artifacts(&dir.path().join("artifacts-zk"));
        Self {
            artifacts: ArtifactStore::new(dir.path().join("artifacts-zk")),
            log: RunLog::new(dir.path().join("logs")),
            dir,
        }
    }

    fn address_book(&self) -> std::path::PathBuf {
        self.dir.path().join("deployments/addresses.json")
    }

    fn pipeline<'a>(&'a self, chain: &'a MockZkChain) -> DeploymentPipeline<'a> {
        let channel = self.log.channel("deploy");
        DeploymentPipeline::new(
            ContractDeployer::new(chain, &self.artifacts, channel),
            self.address_book(),
            channel,
        )
    }

    fn deploy_log(&self) -> String {
        fs::read_to_string(self.log.path_for("deploy")).unwrap()
    }
}

fn constructor_args(chain: &MockZkChain, index: usize) -> Vec<u8> {
    match &chain.sent()[index].target {
        CallTarget::Create(params) => params.constructor_args.clone(),
        other => panic!("expected a create call, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dependency_is_deployed_first_and_passed_to_dependent() {
    let fx = Fixture::new();
    let chain = MockZkChain::default();

    let outcome = fx.pipeline(&chain).run(&default_plan(), false).await.unwrap();

    let token = MockZkChain::created_address(0);
    let messages = MockZkChain::created_address(1);
    assert_eq!(outcome.addresses[&ContractName::FidToken], token);
    assert_eq!(outcome.addresses[&ContractName::ZkMessages], messages);
    assert_eq!(outcome.deployed.len(), 2);
    assert!(outcome.skipped.is_empty());

    assert_eq!(chain.sent().len(), 2);
    // zkMessages(address token): one word holding the token address
    let args = constructor_args(&chain, 1);
    assert_eq!(args.len(), 32);
    assert_eq!(&args[12..], token.as_slice());
}

#[tokio::test]
async fn test_each_deployment_is_recorded_and_summarized() {
    let fx = Fixture::new();
    let chain = MockZkChain::default();
    fx.pipeline(&chain).run(&default_plan(), false).await.unwrap();

    let book = AddressBook::load(&fx.address_book()).unwrap();
    assert_eq!(book.deployments.len(), 2);
    let record = &book.deployments[&ContractName::ZkMessages];
    assert_eq!(record.address, MockZkChain::created_address(1));
    assert_eq!(record.block_number, Some(101));
    assert!(record.transaction_hash.is_some());

    let log = fx.deploy_log();
    assert!(log.contains("FidToken deployment estimated to cost"));
    assert!(log.contains("Deployment Summary:"));
    assert!(log.contains("Deployment info: {"));

    let extracted = extract_addresses_from_log(&log).unwrap();
    assert_eq!(
        extracted[&ContractName::FidToken],
        MockZkChain::created_address(0).to_string()
    );
}

#[tokio::test]
async fn test_estimate_is_gas_times_price() {
    let fx = Fixture::new();
    let chain = MockZkChain::default();
    let deployer = ContractDeployer::new(&chain, &fx.artifacts, fx.log.channel("deploy"));

    let outcome = deployer
        .deploy(
            ContractName::FidToken,
            &["FidToken".to_string(), "FID".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(
        outcome.fee_estimate,
        U256::from(chain.gas_estimate) * U256::from(chain.gas_price)
    );
    assert_eq!(outcome.record.contract_name, ContractName::FidToken);
    assert!(
        fx.deploy_log()
            .contains("balance before FidToken: 1.000000000000000000 ETH")
    );
}

#[tokio::test]
async fn test_zero_balance_fails_before_sending() {
    let fx = Fixture::new();
    let chain = MockZkChain::with_balance(U256::ZERO);

    let err = fx.pipeline(&chain).run(&default_plan(), false).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds { address } if address == chain.signer));
    assert!(chain.sent().is_empty());
    assert!(!fx.address_book().exists());
    let log = fx.deploy_log();
    assert!(log.contains("balance before FidToken: 0.000000000000000000 ETH"));
    assert!(log.contains("No contracts were deployed"));
}

#[tokio::test]
async fn test_failed_second_deployment_keeps_the_first() {
    let fx = Fixture::new();
    let chain = MockZkChain::default();
    chain.fail_send(1, "nonce too low");

    let err = fx.pipeline(&chain).run(&default_plan(), false).await.unwrap_err();
    match err {
        Error::Deployment { contract, reason } => {
            assert_eq!(contract, ContractName::ZkMessages);
            assert!(reason.contains("nonce too low"));
        }
        other => panic!("expected a deployment error, got {other}"),
    }

    let book = AddressBook::load(&fx.address_book()).unwrap();
    assert_eq!(
        book.address(ContractName::FidToken),
        Some(MockZkChain::created_address(0))
    );
    assert!(book.address(ContractName::ZkMessages).is_none());

    let log = fx.deploy_log();
    assert!(log.contains("Already deployed and kept: FidToken"));
    assert!(log.contains("--resume"));
    assert!(!log.contains("Deployment Summary:"));
}

#[tokio::test]
async fn test_resume_skips_recorded_contracts() {
    let fx = Fixture::new();
    let first = MockZkChain::default();
    first.fail_send(1, "connection reset");
    fx.pipeline(&first).run(&default_plan(), false).await.unwrap_err();
    let token = MockZkChain::created_address(0);

    let second = MockZkChain::default();
    let outcome = fx.pipeline(&second).run(&default_plan(), true).await.unwrap();

    assert_eq!(outcome.skipped, vec![ContractName::FidToken]);
    assert_eq!(second.sent().len(), 1);
    assert_eq!(&constructor_args(&second, 0)[12..], token.as_slice());
    assert_eq!(outcome.addresses[&ContractName::FidToken], token);
    assert!(fx.deploy_log().contains("Resuming: FidToken already deployed"));
}

#[tokio::test]
async fn test_unknown_dependency_fails_without_deploying() {
    let fx = Fixture::new();
    let chain = MockZkChain::default();
    let plan = vec![DeployStep {
        contract: ContractName::ZkMessages,
        args: vec![ConstructorArg::AddressOf(ContractName::FidToken)],
    }];

    let err = fx.pipeline(&chain).run(&plan, false).await.unwrap_err();
    assert!(matches!(
        err,
        Error::MissingDependency {
            contract: ContractName::ZkMessages,
            dependency: ContractName::FidToken
        }
    ));
    assert!(chain.sent().is_empty());
    assert!(chain.estimated().is_empty());
}

#[tokio::test]
async fn test_reverted_deployment_is_an_error() {
    let fx = Fixture::new();
    let chain = MockZkChain::default();
    chain.revert_send(0);

    let err = fx.pipeline(&chain).run(&default_plan(), false).await.unwrap_err();
    assert!(matches!(err, Error::Reverted(_)));
    assert_eq!(chain.sent().len(), 1);
}

#[tokio::test]
async fn test_missing_artifact_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = ArtifactStore::new(dir.path().join("artifacts-zk"));
    let log = RunLog::new(dir.path().join("logs"));
    let chain = MockZkChain::default();
    let deployer = ContractDeployer::new(&chain, &artifacts, log.channel("deploy"));

    let err = deployer
        .deploy(ContractName::FidToken, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Artifact(_)));
    assert!(chain.estimated().is_empty());
}
