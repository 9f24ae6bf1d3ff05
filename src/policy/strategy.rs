use std::{fmt, num::NonZeroU32};

use derive_more::Display;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hardware axis of an accelerator grid or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    #[display("x")]
    X,
    #[display("y")]
    Y,
    #[display("z")]
    Z,
}

/// How a flat, non-nested iteration is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScalarStrategy {
    /// Single thread, in order.
    #[display("seq")]
    Sequential,
    /// Host loop construct; synchronous, may use several host threads.
    #[display("loop")]
    HostLoop,
    /// Asynchronous accelerator launch with `threads` per block.
    #[display("accel<{threads}>")]
    Accelerator { threads: NonZeroU32 },
}

impl ScalarStrategy {
    #[inline]
    pub const fn is_async(self) -> bool {
        matches!(self, Self::Accelerator { .. })
    }
}

/// How a loop nest is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LaunchMode {
    /// The call returns after every iteration completed.
    #[display("sync")]
    Synchronous,
    /// The call only enqueues a kernel of fixed block size `threads`.
    #[display("async<{threads}>")]
    Asynchronous { threads: NonZeroU32 },
}

/// The execution unit walking the in-tile (or whole) range of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LoopExec {
    #[display("seq")]
    Sequential,
    #[display("loop")]
    HostLoop,
    #[display("thread.{_0}")]
    Thread(Axis),
}

/// A fixed-size tile of one dimension, mapped to one accelerator block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[display("tile<{size}, block.{block}>")]
pub struct Tile {
    pub size: u32,
    pub block: Axis,
}

/// One loop of a nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoopDim {
    /// The iteration-space dimension this loop walks.
    pub dim: usize,
    pub tile: Option<Tile>,
    pub exec: LoopExec,
}

impl LoopDim {
    #[inline]
    pub const fn new(dim: usize, exec: LoopExec) -> Self {
        Self {
            dim,
            tile: None,
            exec,
        }
    }

    /// Tiles of `size` go to blocks along `axis`; in-tile indices go to threads along the same axis.
    #[inline]
    pub const fn tiled(dim: usize, size: u32, axis: Axis) -> Self {
        Self {
            dim,
            tile: Some(Tile { size, block: axis }),
            exec: LoopExec::Thread(axis),
        }
    }
}

impl fmt::Display for LoopDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tile {
            Some(tile) => write!(f, "for<{}, {}, {}>", self.dim, tile, self.exec),
            None => write!(f, "for<{}, {}>", self.dim, self.exec),
        }
    }
}

/// Marker for the rank of an iteration space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rank<const N: usize>;

/// Implemented only for the ranks a loop nest can be resolved for: 1, 2 and 3.
pub trait SupportedRank<const N: usize> {
    fn select(bundle: &StrategyBundle) -> LoopNest<N>;
}

impl SupportedRank<1> for Rank<1> {
    #[inline]
    fn select(bundle: &StrategyBundle) -> LoopNest<1> {
        bundle.nest_1d
    }
}

impl SupportedRank<2> for Rank<2> {
    #[inline]
    fn select(bundle: &StrategyBundle) -> LoopNest<2> {
        bundle.nest_2d
    }
}

impl SupportedRank<3> for Rank<3> {
    #[inline]
    fn select(bundle: &StrategyBundle) -> LoopNest<3> {
        bundle.nest_3d
    }
}

/// A declarative loop nest over an `N`-dimensional index space.
///
/// Loops are ordered from outermost to innermost. The innermost loop always walks
/// dimension 0, so dimension 0 is the fastest varying one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{launch} [{}]", loops.iter().format(", "))]
pub struct LoopNest<const N: usize> {
    launch: LaunchMode,
    loops: [LoopDim; N],
}

impl<const N: usize> LoopNest<N> {
    /// Untiled, synchronous nest. Dimension `N - 1` is outermost.
    pub(crate) const fn host(exec: LoopExec) -> Self {
        let mut loops = [LoopDim::new(0, exec); N];
        let mut depth = 0;
        while depth < N {
            loops[depth] = LoopDim::new(N - 1 - depth, exec);
            depth += 1;
        }
        Self {
            launch: LaunchMode::Synchronous,
            loops,
        }
    }

    #[cfg(any(test, feature = "accelerator"))]
    pub(crate) const fn accelerator(threads: NonZeroU32, loops: [LoopDim; N]) -> Self {
        Self {
            launch: LaunchMode::Asynchronous { threads },
            loops,
        }
    }

    #[inline]
    pub const fn launch(&self) -> LaunchMode {
        self.launch
    }

    #[inline]
    pub const fn loops(&self) -> &[LoopDim; N] {
        &self.loops
    }

    #[inline]
    pub const fn is_async(&self) -> bool {
        matches!(self.launch, LaunchMode::Asynchronous { .. })
    }

    #[inline]
    pub fn is_tiled(&self) -> bool {
        self.loops.iter().any(|l| l.tile.is_some())
    }

    #[inline]
    pub fn threads_per_block(&self) -> Option<u32> {
        match self.launch {
            LaunchMode::Synchronous => None,
            LaunchMode::Asynchronous { threads } => Some(threads.get()),
        }
    }

    /// The fastest varying loop.
    #[inline]
    pub fn innermost(&self) -> LoopDim {
        self.loops[N - 1]
    }

    /// Dimensions in nesting order, outermost first.
    #[inline]
    pub fn loop_order(&self) -> [usize; N] {
        self.loops.map(|l| l.dim)
    }

    /// Tile size of each dimension, indexed by dimension.
    pub fn tile_sizes(&self) -> [Option<u32>; N] {
        let mut sizes = [None; N];
        for l in &self.loops {
            sizes[l.dim] = l.tile.map(|tile| tile.size);
        }
        sizes
    }

    /// Number of tiles (blocks) per dimension covering `extent`. `None` if the nest is not tiled.
    pub fn grid(&self, extent: [usize; N]) -> Option<[usize; N]> {
        let mut grid = [0; N];
        for l in &self.loops {
            let tile = l.tile?;
            grid[l.dim] = extent[l.dim].div_ceil(tile.size as usize);
        }
        Some(grid)
    }
}

#[cfg(feature = "serde")]
impl<const N: usize> Serialize for LoopNest<N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("LoopNest", 2)?;
        state.serialize_field("launch", &self.launch)?;
        state.serialize_field("loops", &self.loops[..])?;
        state.end()
    }
}

/// How per-iteration values are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReductionStrategy {
    /// Left-to-right from the identity; deterministic.
    #[display("seq_reduce")]
    Sequential,
    /// Accelerator-native combine; order unspecified.
    #[display("accel_reduce")]
    Accelerator,
}

impl ReductionStrategy {
    /// Whether the combination order is fixed.
    #[inline]
    pub const fn is_ordered(self) -> bool {
        matches!(self, Self::Sequential)
    }
}

/// Every strategy a call site may need under one policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[display("{scalar}; 1d: {nest_1d}; 2d: {nest_2d}; 3d: {nest_3d}; {reduction}")]
pub struct StrategyBundle {
    pub scalar: ScalarStrategy,
    pub nest_1d: LoopNest<1>,
    pub nest_2d: LoopNest<2>,
    pub nest_3d: LoopNest<3>,
    pub reduction: ReductionStrategy,
}

impl StrategyBundle {
    /// Selects the loop nest of rank `N`.
    ///
    /// Only ranks 1, 2 and 3 exist:
    /// ```compile_fail
    /// use strand::policy::{resolve, Sequential};
    ///
    /// let nest = resolve::<Sequential>().nest::<4>();
    /// ```
    #[inline]
    pub fn nest<const N: usize>(&self) -> LoopNest<N>
    where
        Rank<N>: SupportedRank<N>,
    {
        <Rank<N> as SupportedRank<N>>::select(self)
    }
}
