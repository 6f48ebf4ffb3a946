
//! Color correction settings and the lookup tables computed from them.
//! Every pixel of an rgb or bayer frame passes through these tables before it is stored.

use bit_field::BitField;
use crate::math::clip;


/// Number of selectable gamma curves.
pub const GAMMA_CURVE_COUNT: usize = 16;

/// The gamma index of the identity curve.
pub const IDENTITY_GAMMA: u8 = 3;

/// The exponent of each gamma curve. Values above one brighten the dark tones.
/// These are reconstructed power curves, not the driver's measured tables:
/// index 3 is the identity and the others step through common display gammas.
const GAMMA_EXPONENTS: [f64; GAMMA_CURVE_COUNT] = [
    2.2, 1.7, 1.45, 1.0, 0.6896, 0.5882, 0.4545, 0.4,
    0.3571, 0.3226, 0.2941, 0.2703, 0.25, 0.2326, 0.2174, 0.2041,
];


/// Color correction parameters shared by all frames of one camera session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PictureSettings {

    /// Selects one of sixteen gamma curves. `3` is the identity curve.
    /// Larger values are treated as `15`.
    pub gamma: u8,

    /// Offset and gain for the red channel.
    pub red: ChannelCorrection,

    /// Offset and gain for the green channel.
    pub green: ChannelCorrection,

    /// Offset and gain for the blue channel.
    pub blue: ChannelCorrection,

    /// Swap the red and blue store positions of packed rgb output,
    /// and the chroma plane order of planar output.
    pub force_rgb: bool,
}

/// Applied to every entry of a gamma curve:
/// `clip(((curve + offset) * gain) >> 8)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelCorrection {

    /// Added before the gain. Usually within `-128 ..= 128`.
    pub offset: i32,

    /// Multiplier in 8.8 fixed point, so that `256` means `1.0`. Usually within `0 ..= 512`.
    pub gain: i32,
}

/// Remembers which parts of the settings changed since the tables were last computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChangeMask(u8);

/// One lookup table per color channel,
/// mapping a sample to its corrected value.
#[derive(Clone, PartialEq, Eq)]
pub struct GammaTables {

    /// Corrected red values.
    pub red: [u8; 256],

    /// Corrected green values.
    pub green: [u8; 256],

    /// Corrected blue values.
    pub blue: [u8; 256],
}


impl Default for PictureSettings {
    fn default() -> Self {
        PictureSettings {
            gamma: IDENTITY_GAMMA,
            red: ChannelCorrection::default(),
            green: ChannelCorrection::default(),
            blue: ChannelCorrection::default(),
            force_rgb: false,
        }
    }
}

impl Default for ChannelCorrection {
    fn default() -> Self {
        ChannelCorrection { offset: 0, gain: 256 }
    }
}

impl PictureSettings {

    /// Returns these settings with a different gamma curve.
    pub fn with_gamma(self, gamma: u8) -> Self {
        PictureSettings { gamma, ..self }
    }

    /// Returns these settings with the rgb store order flag set or cleared.
    pub fn with_force_rgb(self, force_rgb: bool) -> Self {
        PictureSettings { force_rgb, ..self }
    }

    /// Compare two settings and mark everything that differs.
    pub fn changes_since(&self, previous: &PictureSettings) -> ChangeMask {
        let mut changes = ChangeMask::default();

        if self.gamma != previous.gamma { changes.mark(ChangeMask::ALL); }
        if self.red != previous.red { changes.mark(ChangeMask::RED); }
        if self.green != previous.green { changes.mark(ChangeMask::GREEN); }
        if self.blue != previous.blue { changes.mark(ChangeMask::BLUE); }
        if self.force_rgb != previous.force_rgb { changes.mark(ChangeMask::FORCE_RGB); }

        changes
    }
}

impl ChannelCorrection {

    /// Apply this correction to a whole curve.
    pub fn apply(self, curve: &[u8; 256]) -> [u8; 256] {
        let mut table = [0_u8; 256];

        for (corrected, &value) in table.iter_mut().zip(curve.iter()) {
            let scaled = ((i64::from(value) + i64::from(self.offset)) * i64::from(self.gain)) >> 8;
            *corrected = clip(scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32);
        }

        table
    }
}

impl ChangeMask {

    /// The gamma curve changed, which affects every channel.
    pub const ALL: usize = 0;

    /// The red offset or gain changed.
    pub const RED: usize = 1;

    /// The green offset or gain changed.
    pub const GREEN: usize = 2;

    /// The blue offset or gain changed.
    pub const BLUE: usize = 3;

    /// The store order flag changed.
    pub const FORCE_RGB: usize = 4;

    /// Everything needs to be computed, as no tables exist yet.
    pub fn everything() -> Self {
        let mut mask = ChangeMask::default();
        mask.mark(ChangeMask::ALL);
        mask
    }

    /// Set one of the change flags.
    pub fn mark(&mut self, flag: usize) {
        self.0.set_bit(flag, true);
    }

    /// Whether a change flag is set.
    pub fn contains(self, flag: usize) -> bool {
        self.0.get_bit(flag)
    }

    /// Add all flags of the other mask.
    pub fn merge(&mut self, other: ChangeMask) {
        self.0 |= other.0;
    }

    /// Whether the tables must be recomputed before the next frame.
    /// A change of the store order alone does not require new tables.
    pub fn requires_rebuild(self) -> bool {
        self.contains(ChangeMask::ALL) || self.contains(ChangeMask::RED)
            || self.contains(ChangeMask::GREEN) || self.contains(ChangeMask::BLUE)
    }

    /// Whether nothing changed.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl GammaTables {

    /// Compute all three tables from scratch.
    pub fn new(settings: &PictureSettings) -> Self {
        let curve = gamma_curve(settings.gamma);

        GammaTables {
            red: settings.red.apply(&curve),
            green: settings.green.apply(&curve),
            blue: settings.blue.apply(&curve),
        }
    }

    /// Tables that leave every sample unchanged.
    pub fn identity() -> Self {
        Self::new(&PictureSettings::default())
    }
}

impl std::fmt::Debug for GammaTables {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("GammaTables")
            .field("red", &&self.red[..])
            .field("green", &&self.green[..])
            .field("blue", &&self.blue[..])
            .finish()
    }
}


/// Compute one of the gamma curves. Indices above the last curve select the last curve.
pub fn gamma_curve(index: u8) -> [u8; 256] {
    let exponent = GAMMA_EXPONENTS[usize::from(index).min(GAMMA_CURVE_COUNT - 1)];
    let mut curve = [0_u8; 256];

    for (value, entry) in curve.iter_mut().enumerate() {
        let normalized = value as f64 / 255.0;
        *entry = (normalized.powf(1.0 / exponent) * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    curve
}
