/// Hardware support fixed when the crate is built.
pub trait Capability: Copy + Default + Send + Sync + 'static + sealed::Sealed {
    /// Whether kernels may be launched on an accelerator.
    const ACCELERATOR: bool;
}

/// Accelerator execution is available. Only exists when the build has accelerator support.
#[cfg(any(test, feature = "accelerator"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Accelerated;

/// Only the host is available.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostOnly;

#[cfg(any(test, feature = "accelerator"))]
impl Capability for Accelerated {
    const ACCELERATOR: bool = true;
}

impl Capability for HostOnly {
    const ACCELERATOR: bool = false;
}

/// Capabilities of this build, selected by the `accelerator` feature.
#[cfg(feature = "accelerator")]
pub type Configured = Accelerated;
/// Capabilities of this build, selected by the `accelerator` feature.
#[cfg(not(feature = "accelerator"))]
pub type Configured = HostOnly;

pub const ACCELERATOR_AVAILABLE: bool = Configured::ACCELERATOR;

mod sealed {
    pub trait Sealed {}

    #[cfg(any(test, feature = "accelerator"))]
    impl Sealed for super::Accelerated {}
    impl Sealed for super::HostOnly {}
}
