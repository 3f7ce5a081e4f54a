//! CLI argument definitions using clap derive

use crate::context::EvaluationContext;
use crate::restore::HitFailurePolicy;
use crate::store::s3::S3Config;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cachepull - restore CI build caches from S3-compatible storage
///
/// Resolves an ordered list of restore-key templates against the current
/// CI context, probes the store in priority order, and extracts the
/// first matching archive.
#[derive(Parser, Debug)]
#[command(name = "cachepull")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restore the first matching cache into the destination path
    Restore(RestoreArgs),

    /// Resolve restore-key templates and print the concrete keys
    Keys(KeysArgs),

    /// Probe every restore key against the store without downloading
    Check(CheckArgs),
}

/// Context values available to key template functions
#[derive(Args, Debug)]
pub struct ContextArgs {
    /// Git branch substituted by the `branch` key function
    #[arg(long, env = "BITRISE_GIT_BRANCH")]
    pub branch: Option<String>,

    /// Stack revision substituted by the `stack-rev` key function
    #[arg(long, env = "BITRISE_OSX_STACK_REV_ID")]
    pub stack_rev: Option<String>,
}

impl ContextArgs {
    pub fn to_context(&self) -> EvaluationContext {
        EvaluationContext::new(self.branch.clone(), self.stack_rev.clone())
    }
}

/// Store connection settings
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// S3 bucket holding the cache archives
    #[arg(long, env = "CACHE_S3_BUCKET")]
    pub bucket: String,

    /// AWS region of the bucket
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Access key id for the store
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: String,

    /// Secret access key for the store
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: String,

    /// Endpoint override for S3-compatible servers
    #[arg(long, env = "CACHE_S3_ENDPOINT")]
    pub endpoint: Option<String>,
}

impl StoreArgs {
    pub fn to_config(&self) -> S3Config {
        S3Config {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

/// Arguments for the restore command
#[derive(Parser, Debug)]
pub struct RestoreArgs {
    /// Restore-key templates, one per line, most preferred first
    #[arg(short = 'k', long, env = "CACHE_RESTORE_KEYS")]
    pub restore_keys: String,

    /// Directory that receives the extracted cache
    #[arg(short, long, env = "CACHE_RESTORE_PATH")]
    pub path: PathBuf,

    /// Extension of the stored archives (zip, tar.gz, tgz, tar)
    #[arg(long, env = "CACHE_ARCHIVE_EXT", default_value = "zip")]
    pub archive_ext: String,

    /// Behavior when a matched cache fails to download or extract
    #[arg(long, value_enum, default_value_t = OnHitFailure::Stop)]
    pub on_hit_failure: OnHitFailure,

    #[command(flatten)]
    pub context: ContextArgs,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Arguments for the keys command
#[derive(Parser, Debug)]
pub struct KeysArgs {
    /// Restore-key templates, one per line, most preferred first
    #[arg(short = 'k', long, env = "CACHE_RESTORE_KEYS")]
    pub restore_keys: String,

    /// Print templates and resolved keys as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub context: ContextArgs,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Restore-key templates, one per line, most preferred first
    #[arg(short = 'k', long, env = "CACHE_RESTORE_KEYS")]
    pub restore_keys: String,

    /// Print probe results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub context: ContextArgs,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// CLI surface for [`HitFailurePolicy`]
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnHitFailure {
    /// Fail the run without trying lower-priority keys
    Stop,
    /// Fall back to the next key in the list
    Continue,
}

impl From<OnHitFailure> for HitFailurePolicy {
    fn from(value: OnHitFailure) -> Self {
        match value {
            OnHitFailure::Stop => HitFailurePolicy::Stop,
            OnHitFailure::Continue => HitFailurePolicy::Continue,
        }
    }
}
