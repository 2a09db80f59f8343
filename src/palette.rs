//! Series color palette with a rotating cursor.
//!
//! The default palette concatenates several well-known qualitative palettes so that
//! charts with many series still get distinct colors:
//! Plotly `Dark24` + `Set3`, Plotly's default qualitative palette (reversed),
//! Matplotlib `tab10` and `Set1`.

use crate::style::Rgba;
use rand::Rng;
use rand::seq::SliceRandom;

const DARK24: [u32; 24] = [
    0x2E91E5, 0xE15F99, 0x1CA71C, 0xFB0D0D, 0xDA16FF, 0x222A2A, 0xB68100, 0x750D86,
    0xEB663B, 0x511CFB, 0x00A08B, 0xFB00D1, 0xFC0080, 0xB2828D, 0x6C7C32, 0x778AAE,
    0x862A16, 0xA777F1, 0x620042, 0x1616A7, 0xDA60CA, 0x6C4516, 0x0D2A63, 0xAF0038,
];

const SET3: [u32; 12] = [
    0x8DD3C7, 0xFFFFB3, 0xBEBADA, 0xFB8072, 0x80B1D3, 0xFDB462, 0xB3DE69, 0xFCCDE5,
    0xD9D9D9, 0xBC80BD, 0xCCEBC5, 0xFFED6F,
];

const PLOTLY: [u32; 10] = [
    0x636EFA, 0xEF553B, 0x00CC96, 0xAB63FA, 0xFFA15A, 0x19D3F3, 0xFF6692, 0xB6E880,
    0xFF97FF, 0xFECB52,
];

const TAB10: [u32; 10] = [
    0x1F77B4, 0xFF7F0E, 0x2CA02C, 0xD62728, 0x9467BD, 0x8C564B, 0xE377C2, 0x7F7F7F,
    0xBCBD22, 0x17BECF,
];

const SET1: [u32; 9] = [
    0xE41A1C, 0x377EB8, 0x4DAF4A, 0x984EA3, 0xFF7F00, 0xFFFF33, 0xA65628, 0xF781BF,
    0x999999,
];

/// The combined default palette, in rotation order.
pub fn default_colors() -> Vec<Rgba> {
    DARK24
        .iter()
        .chain(SET3.iter())
        .chain(PLOTLY.iter().rev())
        .chain(TAB10.iter())
        .chain(SET1.iter())
        .map(|hex| Rgba::from_hex6(*hex))
        .collect()
}

/// Ordered colors plus the index of the next color to hand out.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgba>,
    index: usize,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(default_colors())
    }
}

impl Palette {
    /// Falls back to the default palette when `colors` is empty.
    pub fn new(colors: Vec<Rgba>) -> Self {
        let colors = if colors.is_empty() {
            default_colors()
        } else {
            colors
        };
        Self { colors, index: 0 }
    }

    /// Default palette shuffled once with the thread RNG.
    pub fn shuffled() -> Self {
        Self::shuffled_with(&mut rand::thread_rng())
    }

    /// Default palette shuffled once with a caller-provided RNG (seed it for
    /// reproducible charts).
    pub fn shuffled_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut colors = default_colors();
        colors.shuffle(rng);
        Self::new(colors)
    }

    /// Current color, then advance the cursor (wrapping).
    pub fn next_color(&mut self) -> Rgba {
        let c = self.colors[self.index];
        self.index = (self.index + 1) % self.colors.len();
        c
    }

    /// Color at a fixed position, independent of the cursor.
    pub fn get(&self, i: usize) -> Rgba {
        self.colors[i % self.colors.len()]
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_has_no_duplicates() {
        let colors = default_colors();
        let unique: std::collections::HashSet<_> = colors.iter().collect();
        assert_eq!(unique.len(), colors.len());
        assert_eq!(colors[0], Rgba::from_hex6(0x2E91E5));
        assert_eq!(colors[1], Rgba::from_hex6(0xE15F99));
    }

    #[test]
    fn empty_palette_falls_back() {
        assert_eq!(Palette::new(Vec::new()).len(), default_colors().len());
    }

    #[test]
    fn shuffle_keeps_the_same_colors() {
        let mut rng = rand::thread_rng();
        let p = Palette::shuffled_with(&mut rng);
        let mut a: Vec<_> = p.colors().iter().map(|c| c.to_string()).collect();
        let mut b: Vec<_> = default_colors().iter().map(|c| c.to_string()).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }
}
