//! The `policy` module resolves abstract execution intent into concrete execution strategies.
//!
//! ## Key Components
//! 1. **Policy Tags**:
//!    - Marker types [`Sequential`], [`Parallel`] and [`HostParallel`], sealed under [`Policy`].
//!    - [`PolicyKind`] mirrors them at runtime for configuration-driven call sites.
//!
//! 2. **Capabilities**:
//!    - [`Capability`] describes hardware support fixed at build time.
//!    - [`Configured`] follows the `accelerator` feature.
//!
//! 3. **Strategies**:
//!    - [`ScalarStrategy`] for flat iteration, [`LoopNest`] for 1-, 2- and 3-dimensional
//!      iteration spaces, [`ReductionStrategy`] for accumulation.
//!    - A [`LoopNest`] is an ordered list of [`LoopDim`] descriptors: which dimension
//!      each loop walks, its tile, and the execution unit it is mapped to.
//!
//! 4. **Resolution**:
//!    - [`Resolve`] holds the table as associated constants, one impl per tag.
//!    - [`resolve`] and [`loop_nest`] are evaluated at compile time; nothing branches at runtime.
//!
//! `Parallel` is the only tag whose strategies depend on the build: tiled asynchronous
//! accelerator kernels with the `accelerator` feature, host loops otherwise.

pub mod capability;
pub mod resolve;
pub mod strategy;
pub mod tag;

#[cfg(any(test, feature = "accelerator"))]
pub use capability::Accelerated;
pub use capability::{ACCELERATOR_AVAILABLE, Capability, Configured, HostOnly};
pub use resolve::{Resolve, loop_nest, loop_nest_with, resolve, resolve_with};
pub use strategy::{
    Axis, LaunchMode, LoopDim, LoopExec, LoopNest, Rank, ReductionStrategy, ScalarStrategy,
    StrategyBundle, SupportedRank, Tile,
};
pub use tag::{HostParallel, Parallel, Policy, PolicyError, PolicyKind, Sequential};
