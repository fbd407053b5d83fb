use flagset::{flags, FlagSet};

flags! {
    /// Set on a vtx mesh that is drawn with a special shader path.
    pub enum MeshFlags: u8 {
        IsTeeth = 0x01,
        IsEyes = 0x02,
    }

    pub enum StripGroupFlags: u8 {
        IsFlexed = 0x01,
        IsHwSkinned = 0x02,
        IsDeltaFlexed = 0x04,
        // Use the software morph path even when hardware morphing is available.
        SuppressHwMorph = 0x08,
    }

    /// Primitive topology of a strip.
    pub enum StripFlags: u8 {
        IsTriList = 0x01,
        IsTriStrip = 0x02,
    }
}

/// Known bits of a flag byte. Unknown bits are dropped here; callers that
/// care keep the raw byte alongside.
pub fn known<F: flagset::Flags<Type = u8>>(bits: u8) -> FlagSet<F> {
    FlagSet::new_truncated(bits)
}
