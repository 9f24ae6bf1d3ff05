use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{capability::Configured, resolve::Resolve, strategy::StrategyBundle};

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("unknown execution policy: {0}")]
    Unknown(String),
}

/// Runtime mirror of the [`Policy`] marker types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PolicyKind {
    #[display("sequential")]
    Sequential,
    #[display("parallel")]
    Parallel,
    #[display("host_parallel")]
    HostParallel,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [Self::Sequential, Self::Parallel, Self::HostParallel];

    /// Resolves the bundle of the policy against the configured capabilities.
    #[inline]
    pub const fn bundle(self) -> StrategyBundle {
        match self {
            PolicyKind::Sequential => <Sequential as Resolve<Configured>>::BUNDLE,
            PolicyKind::Parallel => <Parallel as Resolve<Configured>>::BUNDLE,
            PolicyKind::HostParallel => <HostParallel as Resolve<Configured>>::BUNDLE,
        }
    }
}

impl FromStr for PolicyKind {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Self::Sequential,
            "parallel" => Self::Parallel,
            "host_parallel" | "host-parallel" => Self::HostParallel,
            _ => return Err(PolicyError::Unknown(s.to_owned())),
        };
        log::debug!("selected execution policy {kind}");
        Ok(kind)
    }
}

/// An execution intent. Only the three markers in this module implement it.
pub trait Policy: Copy + Default + Send + Sync + 'static + sealed::Sealed {
    const KIND: PolicyKind;
}

/// Run on the calling thread, in order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sequential;

/// Run on whatever parallel hardware the build supports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parallel;

/// Run in parallel on the host, even when an accelerator is available.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostParallel;

impl Policy for Sequential {
    const KIND: PolicyKind = PolicyKind::Sequential;
}

impl Policy for Parallel {
    const KIND: PolicyKind = PolicyKind::Parallel;
}

impl Policy for HostParallel {
    const KIND: PolicyKind = PolicyKind::HostParallel;
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Sequential {}
    impl Sealed for super::Parallel {}
    impl Sealed for super::HostParallel {}
}
