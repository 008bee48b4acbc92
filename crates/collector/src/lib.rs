pub mod cli;
pub mod client;
pub mod metrics;
pub mod service;

pub use cli::{Cli, RunOutcome};
pub use client::{GithubApiError, GithubClient, ReqwestGithubClient};
pub use service::ActivityService;
