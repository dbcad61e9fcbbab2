//! Contract deployment: artifacts, the single-contract deployer and the ordered pipeline.

pub mod artifact;
pub mod deployer;
pub mod pipeline;

pub use artifact::{Artifact, ArtifactStore};
pub use deployer::{ContractDeployer, DeployOutcome};
pub use pipeline::{
    ConstructorArg, DeployStep, DeploymentPipeline, PipelineOutcome, default_plan, resolve_args,
};
