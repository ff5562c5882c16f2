//! The ESP-protection transform suite selected per SA during the base
//! exchange, and the static configuration each one implies.

/// Identifies which per-packet authentication scheme, if any, rides on top
/// of the SPI-based ESP SA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EspProtTransform {
    /// No per-packet tokens; plain ESP, SPI/sequence-number protection only.
    Unused,
    /// A single hash chain per direction; each packet discloses the next
    /// element, verified by hashing forward to the last verified one.
    Plain,
    /// `num_hchains` independent hash chains per direction, round-robined
    /// across packets by `seq % num_hchains` so a loss on one chain doesn't
    /// stall the others.
    Parallel,
    /// A ring buffer of recently disclosed elements plus a linear+random
    /// disclosure vector, letting a verifier catch up after bursty loss
    /// without re-deriving every intermediate element.
    Cumulative,
    /// Parallel chains, each itself using cumulative disclosure.
    ParaCumul,
    /// A hash tree (HHL): the anchor is the tree root, each packet discloses
    /// one leaf and its sibling branch.
    Tree,
}

impl EspProtTransform {
    pub fn suite_id(self) -> u8 {
        match self {
            EspProtTransform::Unused => 0,
            EspProtTransform::Plain => 1,
            EspProtTransform::Parallel => 2,
            EspProtTransform::Cumulative => 3,
            EspProtTransform::ParaCumul => 4,
            EspProtTransform::Tree => 5,
        }
    }

    pub fn from_suite_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(EspProtTransform::Unused),
            1 => Some(EspProtTransform::Plain),
            2 => Some(EspProtTransform::Parallel),
            3 => Some(EspProtTransform::Cumulative),
            4 => Some(EspProtTransform::ParaCumul),
            5 => Some(EspProtTransform::Tree),
            _ => None,
        }
    }

    pub fn uses_hash_chains(self) -> bool {
        matches!(
            self,
            EspProtTransform::Plain
                | EspProtTransform::Parallel
                | EspProtTransform::Cumulative
                | EspProtTransform::ParaCumul
        )
    }

    pub fn uses_ring_buffer(self) -> bool {
        matches!(self, EspProtTransform::Cumulative | EspProtTransform::ParaCumul)
    }

    pub fn uses_tree(self) -> bool {
        matches!(self, EspProtTransform::Tree)
    }

    pub fn is_parallel(self) -> bool {
        matches!(self, EspProtTransform::Parallel | EspProtTransform::ParaCumul)
    }
}

/// Static knobs governing chain/tree size and window tolerance, negotiated
/// alongside the transform itself.
#[derive(Debug, Clone, Copy)]
pub struct TransformConfig {
    pub transform: EspProtTransform,
    pub hash_length: usize,
    pub num_hchains: u32,
    pub ring_buffer_size: u32,
    pub window_size: u32,
    pub tree_leaf_count: usize,
}

impl TransformConfig {
    pub fn unused() -> Self {
        TransformConfig {
            transform: EspProtTransform::Unused,
            hash_length: 20,
            num_hchains: 1,
            ring_buffer_size: 0,
            window_size: 0,
            tree_leaf_count: 0,
        }
    }

    pub fn plain(window_size: u32) -> Self {
        TransformConfig { transform: EspProtTransform::Plain, num_hchains: 1, window_size, ..Self::unused() }
    }

    pub fn parallel(num_hchains: u32, window_size: u32) -> Self {
        TransformConfig { transform: EspProtTransform::Parallel, num_hchains, window_size, ..Self::unused() }
    }

    pub fn cumulative(ring_buffer_size: u32, window_size: u32) -> Self {
        TransformConfig {
            transform: EspProtTransform::Cumulative,
            ring_buffer_size,
            window_size,
            ..Self::unused()
        }
    }

    pub fn tree(tree_leaf_count: usize) -> Self {
        TransformConfig { transform: EspProtTransform::Tree, tree_leaf_count, ..Self::unused() }
    }
}
