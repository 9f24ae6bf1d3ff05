use std::num::NonZeroU32;

#[cfg(any(test, feature = "accelerator"))]
use super::{
    capability::Accelerated,
    strategy::{Axis, LoopDim},
};
use super::{
    capability::{Capability, Configured, HostOnly},
    strategy::{
        LoopExec, LoopNest, Rank, ReductionStrategy, ScalarStrategy, StrategyBundle, SupportedRank,
    },
    tag::{HostParallel, Parallel, Policy, Sequential},
};

const fn block_size(threads: u32) -> NonZeroU32 {
    match NonZeroU32::new(threads) {
        Some(threads) => threads,
        None => panic!("block size must be non-zero"),
    }
}

/// Block size of a flat accelerator launch.
pub const SCALAR_BLOCK_SIZE: NonZeroU32 = block_size(128);
/// Block size of every accelerator loop-nest launch.
pub const KERNEL_BLOCK_SIZE: NonZeroU32 = block_size(256);

pub const TILE_1D: [u32; 1] = [256];
pub const TILE_2D: [u32; 2] = [16, 16];
pub const TILE_3D: [u32; 3] = [8, 8, 4];

/// Maps a policy to its strategies under capabilities `C`.
pub trait Resolve<C: Capability>: Policy {
    const SCALAR: ScalarStrategy;
    const NEST_1D: LoopNest<1>;
    const NEST_2D: LoopNest<2>;
    const NEST_3D: LoopNest<3>;
    const REDUCTION: ReductionStrategy;

    const BUNDLE: StrategyBundle = StrategyBundle {
        scalar: Self::SCALAR,
        nest_1d: Self::NEST_1D,
        nest_2d: Self::NEST_2D,
        nest_3d: Self::NEST_3D,
        reduction: Self::REDUCTION,
    };
}

impl<C: Capability> Resolve<C> for Sequential {
    const SCALAR: ScalarStrategy = ScalarStrategy::Sequential;
    const NEST_1D: LoopNest<1> = LoopNest::host(LoopExec::Sequential);
    const NEST_2D: LoopNest<2> = LoopNest::host(LoopExec::Sequential);
    const NEST_3D: LoopNest<3> = LoopNest::host(LoopExec::Sequential);
    const REDUCTION: ReductionStrategy = ReductionStrategy::Sequential;
}

impl<C: Capability> Resolve<C> for HostParallel {
    const SCALAR: ScalarStrategy = ScalarStrategy::HostLoop;
    const NEST_1D: LoopNest<1> = LoopNest::host(LoopExec::HostLoop);
    const NEST_2D: LoopNest<2> = LoopNest::host(LoopExec::HostLoop);
    const NEST_3D: LoopNest<3> = LoopNest::host(LoopExec::HostLoop);
    const REDUCTION: ReductionStrategy = ReductionStrategy::Sequential;
}

#[cfg(any(test, feature = "accelerator"))]
impl Resolve<Accelerated> for Parallel {
    const SCALAR: ScalarStrategy = ScalarStrategy::Accelerator {
        threads: SCALAR_BLOCK_SIZE,
    };
    const NEST_1D: LoopNest<1> =
        LoopNest::accelerator(KERNEL_BLOCK_SIZE, [LoopDim::tiled(0, TILE_1D[0], Axis::X)]);
    const NEST_2D: LoopNest<2> = LoopNest::accelerator(
        KERNEL_BLOCK_SIZE,
        [
            LoopDim::tiled(1, TILE_2D[1], Axis::Y),
            LoopDim::tiled(0, TILE_2D[0], Axis::X),
        ],
    );
    const NEST_3D: LoopNest<3> = LoopNest::accelerator(
        KERNEL_BLOCK_SIZE,
        [
            LoopDim::tiled(2, TILE_3D[2], Axis::Z),
            LoopDim::tiled(1, TILE_3D[1], Axis::Y),
            LoopDim::tiled(0, TILE_3D[0], Axis::X),
        ],
    );
    const REDUCTION: ReductionStrategy = ReductionStrategy::Accelerator;
}

// TODO: resolve to a dedicated multithreaded host backend once one is configurable.
impl Resolve<HostOnly> for Parallel {
    const SCALAR: ScalarStrategy = <HostParallel as Resolve<HostOnly>>::SCALAR;
    const NEST_1D: LoopNest<1> = <HostParallel as Resolve<HostOnly>>::NEST_1D;
    const NEST_2D: LoopNest<2> = <HostParallel as Resolve<HostOnly>>::NEST_2D;
    const NEST_3D: LoopNest<3> = <HostParallel as Resolve<HostOnly>>::NEST_3D;
    const REDUCTION: ReductionStrategy = <HostParallel as Resolve<HostOnly>>::REDUCTION;
}

/// Resolves the strategies of policy `P` for this build.
#[inline]
pub const fn resolve<P: Resolve<Configured>>() -> StrategyBundle {
    P::BUNDLE
}

/// Resolves the strategies of policy `P` under explicit capabilities `C`.
///
/// Accelerator capabilities only exist in builds with the `accelerator` feature:
#[cfg_attr(not(feature = "accelerator"), doc = "```compile_fail")]
#[cfg_attr(feature = "accelerator", doc = "```")]
/// use strand::policy::{resolve_with, Accelerated, Parallel};
///
/// assert!(resolve_with::<Accelerated, Parallel>().scalar.is_async());
/// ```
#[inline]
pub const fn resolve_with<C: Capability, P: Resolve<C>>() -> StrategyBundle {
    P::BUNDLE
}

/// Resolves the rank-`N` loop nest of policy `P` for this build.
///
/// ```compile_fail
/// use strand::policy::{loop_nest, Parallel};
///
/// let nest = loop_nest::<Parallel, 4>();
/// ```
#[inline]
pub fn loop_nest<P, const N: usize>() -> LoopNest<N>
where
    P: Resolve<Configured>,
    Rank<N>: SupportedRank<N>,
{
    P::BUNDLE.nest::<N>()
}

/// Resolves the rank-`N` loop nest of policy `P` under explicit capabilities `C`.
#[inline]
pub fn loop_nest_with<C, P, const N: usize>() -> LoopNest<N>
where
    C: Capability,
    P: Resolve<C>,
    Rank<N>: SupportedRank<N>,
{
    P::BUNDLE.nest::<N>()
}

#[cfg(test)]
mod tests {
    use super::{
        KERNEL_BLOCK_SIZE, Resolve, TILE_1D, TILE_2D, TILE_3D, loop_nest, loop_nest_with,
        resolve, resolve_with,
    };
    use crate::policy::{
        capability::{ACCELERATOR_AVAILABLE, Accelerated, Capability, Configured, HostOnly},
        strategy::{
            Axis, LaunchMode, LoopExec, LoopNest, Rank, ReductionStrategy, ScalarStrategy,
            StrategyBundle, SupportedRank,
        },
        tag::{HostParallel, Parallel, Policy, Sequential},
    };

    fn check_nest<const N: usize>(nest: LoopNest<N>) {
        let mut order = nest.loop_order();
        order.sort_unstable();
        assert_eq!(order, std::array::from_fn(|d| d), "every dimension appears once");
        assert_eq!(nest.innermost().dim, 0);
    }

    fn check_bundle(bundle: StrategyBundle) {
        check_nest(bundle.nest_1d);
        check_nest(bundle.nest_2d);
        check_nest(bundle.nest_3d);
        assert_eq!(bundle.scalar.is_async(), bundle.nest_1d.is_async());
        assert_eq!(bundle.nest_1d.is_async(), bundle.nest_3d.is_async());
    }

    fn check_all<C: Capability>()
    where
        Sequential: Resolve<C>,
        Parallel: Resolve<C>,
        HostParallel: Resolve<C>,
    {
        check_bundle(resolve_with::<C, Sequential>());
        check_bundle(resolve_with::<C, Parallel>());
        check_bundle(resolve_with::<C, HostParallel>());
    }

    #[test]
    fn test_totality() {
        check_all::<Accelerated>();
        check_all::<HostOnly>();
        check_all::<Configured>();
    }

    #[test]
    fn test_determinism() {
        assert_eq!(resolve::<Parallel>(), resolve::<Parallel>());
        assert_eq!(
            resolve_with::<Accelerated, Parallel>(),
            <Parallel as Resolve<Accelerated>>::BUNDLE
        );
        assert_eq!(
            loop_nest::<Sequential, 2>(),
            loop_nest::<Sequential, 2>()
        );
    }

    #[test]
    fn test_fallback_equivalence() {
        assert_eq!(
            resolve_with::<HostOnly, Parallel>(),
            resolve_with::<HostOnly, HostParallel>()
        );
        assert_ne!(
            resolve_with::<Accelerated, Parallel>(),
            resolve_with::<Accelerated, HostParallel>()
        );
        if !Configured::ACCELERATOR {
            assert_eq!(resolve::<Parallel>(), resolve::<HostParallel>());
        }
    }

    #[test]
    fn test_parallel_follows_build() {
        let bundle = resolve::<Parallel>();
        assert_eq!(resolve_with::<Configured, Parallel>(), bundle);
        assert_eq!(bundle.scalar.is_async(), ACCELERATOR_AVAILABLE);
        assert_eq!(bundle.nest_1d.is_tiled(), ACCELERATOR_AVAILABLE);
        assert_eq!(bundle.nest_2d.is_async(), ACCELERATOR_AVAILABLE);
        assert_eq!(bundle.nest_3d.is_tiled(), ACCELERATOR_AVAILABLE);
        assert_eq!(bundle.reduction.is_ordered(), !ACCELERATOR_AVAILABLE);
    }

    #[test]
    fn test_host_parallel_ignores_accelerator() {
        assert_eq!(
            resolve_with::<Accelerated, HostParallel>(),
            resolve_with::<HostOnly, HostParallel>()
        );
        let bundle = resolve::<HostParallel>();
        assert_eq!(bundle.scalar, ScalarStrategy::HostLoop);
        assert_eq!(bundle.nest_2d.loops()[0].exec, LoopExec::HostLoop);
        assert!(!bundle.nest_3d.is_tiled());
        assert_eq!(bundle.reduction, ReductionStrategy::Sequential);
    }

    #[test]
    fn test_sequential_hardware_independent() {
        let bundle = resolve_with::<Accelerated, Sequential>();
        assert_eq!(bundle, resolve_with::<HostOnly, Sequential>());
        assert_eq!(bundle, resolve::<Sequential>());

        assert_eq!(bundle.scalar, ScalarStrategy::Sequential);
        assert_eq!(bundle.reduction, ReductionStrategy::Sequential);
        assert!(bundle.reduction.is_ordered());
        assert_eq!(bundle.nest_3d.loop_order(), [2, 1, 0]);
        assert_eq!(bundle.nest_2d.loop_order(), [1, 0]);
        assert!(
            bundle
                .nest_3d
                .loops()
                .iter()
                .all(|l| l.exec == LoopExec::Sequential && l.tile.is_none())
        );
        assert_eq!(bundle.nest_1d.launch(), LaunchMode::Synchronous);
    }

    #[test]
    fn test_fixed_tiling() {
        let nest = loop_nest_with::<Accelerated, Parallel, 1>();
        assert_eq!(nest.tile_sizes(), TILE_1D.map(Some));
        assert_eq!(nest.tile_sizes(), [Some(256)]);

        let nest = loop_nest_with::<Accelerated, Parallel, 2>();
        assert_eq!(nest.tile_sizes(), [Some(16), Some(16)]);
        assert_eq!(nest.tile_sizes(), TILE_2D.map(Some));

        let nest = loop_nest_with::<Accelerated, Parallel, 3>();
        assert_eq!(nest.tile_sizes(), [Some(8), Some(8), Some(4)]);
        assert_eq!(nest.tile_sizes(), TILE_3D.map(Some));
        assert_eq!(nest.loop_order(), [2, 1, 0]);

        let innermost = nest.innermost();
        assert_eq!(innermost.dim, 0);
        assert_eq!(innermost.exec, LoopExec::Thread(Axis::X));
        assert_eq!(innermost.tile.map(|tile| tile.block), Some(Axis::X));
        assert_eq!(nest.loops()[0].exec, LoopExec::Thread(Axis::Z));
    }

    #[test]
    fn test_tiles_fill_block() {
        let bundle = resolve_with::<Accelerated, Parallel>();
        assert!(matches!(
            bundle.scalar,
            ScalarStrategy::Accelerator { threads } if threads.get() == 128
        ));
        assert_eq!(bundle.reduction, ReductionStrategy::Accelerator);

        fn volume<const N: usize>(nest: LoopNest<N>) -> u32 {
            nest.tile_sizes().iter().flatten().product()
        }
        for threads in [
            bundle.nest_1d.threads_per_block(),
            bundle.nest_2d.threads_per_block(),
            bundle.nest_3d.threads_per_block(),
        ] {
            assert_eq!(threads, Some(KERNEL_BLOCK_SIZE.get()));
        }
        assert_eq!(volume(bundle.nest_1d), KERNEL_BLOCK_SIZE.get());
        assert_eq!(volume(bundle.nest_2d), KERNEL_BLOCK_SIZE.get());
        assert_eq!(volume(bundle.nest_3d), KERNEL_BLOCK_SIZE.get());
    }

    #[test]
    fn test_nest_by_rank() {
        fn nest_of<P: Resolve<Configured>, const N: usize>() -> LoopNest<N>
        where
            Rank<N>: SupportedRank<N>,
        {
            loop_nest::<P, N>()
        }
        let bundle = resolve::<Parallel>();
        assert_eq!(nest_of::<Parallel, 1>(), bundle.nest_1d);
        assert_eq!(nest_of::<Parallel, 2>(), bundle.nest_2d);
        assert_eq!(nest_of::<Parallel, 3>(), bundle.nest_3d);
        assert_eq!(Parallel::KIND.bundle(), bundle);
    }
}
