use crate::bitmask_flags::{BitmaskFlags, FlagBitmask};

pub const LAYER_COUNT: usize = 5;

/// Animation layers, in resolution order.
///
/// `LowerBody` and `UpperBody` are privileged: they accept item overrides and pick between
/// idle and movement defaults. The arm and additive layers take ability overrides and a
/// single fixed default.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnimationLayer {
    LowerBody = 0,
    UpperBody = 1,
    LeftArm = 2,
    RightArm = 3,
    Additive = 4,
}

impl AnimationLayer {
    pub const ALL: [AnimationLayer; LAYER_COUNT] = [
        AnimationLayer::LowerBody,
        AnimationLayer::UpperBody,
        AnimationLayer::LeftArm,
        AnimationLayer::RightArm,
        AnimationLayer::Additive,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_privileged(self) -> bool {
        matches!(self, AnimationLayer::LowerBody | AnimationLayer::UpperBody)
    }
}

impl FlagBitmask for AnimationLayer {
    type Storage = u8;

    fn bit_index(self) -> u8 {
        self as u8
    }
}

/// Set of layers, e.g. the layers an ability takes animator control of.
pub type LayerMask = BitmaskFlags<u8>;
