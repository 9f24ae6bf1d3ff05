//! Compile-time execution policy resolution.
//!
//! A call site names *how* a computation should run with a policy tag and receives, at
//! compile time, the concrete strategies an execution runtime needs:
//!
//! ```
//! use strand::policy::{loop_nest, resolve, Parallel, Sequential};
//!
//! let bundle = resolve::<Sequential>();
//! assert_eq!(bundle.nest_3d.loop_order(), [2, 1, 0]);
//!
//! // Tiled accelerator kernel with the `accelerator` feature, host loops otherwise.
//! let nest = loop_nest::<Parallel, 2>();
//! assert_eq!(nest.innermost().dim, 0);
//! ```
//!
//! The [`host`] module interprets resolved strategies on the CPU.

pub mod host;
pub mod num;
pub mod policy;
