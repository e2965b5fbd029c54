use core::fmt;
use core::num::NonZeroU32;

/// Identifier of a tabulated material (e.g. 400 for ANEOS forsterite).
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<MaterialId>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaterialId(NonZeroU32);

impl MaterialId {
    /// Create an id from its numeric material code. Zero is not a valid code.
    pub fn new(code: u32) -> Option<Self> {
        NonZeroU32::new(code).map(Self)
    }

    /// Recover the numeric material code.
    pub fn code(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Debug for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaterialId({})", self.code())
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
