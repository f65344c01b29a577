use image::imageops::ColorMap;
use image::Rgb;

/// Largest palette a GIF colour table can hold.
pub const MAX_COLORS: usize = 256;

/// Fixed colour table shared by every frame of a recording.
///
/// Built once before conversion starts and only ever read afterwards, so
/// it is handed to conversion tasks behind an `Arc` without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
}

impl Palette {
    pub fn from_colors(colors: Vec<Rgb<u8>>) -> Result<Self, PaletteError> {
        if colors.is_empty() || colors.len() > MAX_COLORS {
            return Err(PaletteError::Size(colors.len()));
        }
        Ok(Self { colors })
    }

    /// The 256-colour Plan 9 palette.
    ///
    /// A 4x4x4 RGB cube rendered at four value levels: each block of 16
    /// entries shares a red level and a value. Index 0 is black and
    /// index 255 is white.
    pub fn plan9() -> Self {
        let mut colors = vec![Rgb([0u8, 0, 0]); MAX_COLORS];
        for r in 0..4i32 {
            for v in 0..4i32 {
                let block = ((r * 4 + v) * 16) as usize;
                for g in 0..4i32 {
                    for b in 0..4i32 {
                        let slot = (v - r + g * 4 + b) & 0x0f;
                        let den = r.max(g).max(b);
                        let rgb = if den == 0 {
                            let grey = (0x11 * v) as u8;
                            [grey, grey, grey]
                        } else {
                            let num = 17 * (4 * den + v);
                            [
                                (r * num / den) as u8,
                                (g * num / den) as u8,
                                (b * num / den) as u8,
                            ]
                        };
                        colors[block + slot as usize] = Rgb(rgb);
                    }
                }
            }
        }
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Rgb<u8>> {
        self.colors.get(index).copied()
    }

    /// Index of the closest colour by squared RGB distance. Ties go to the
    /// lowest index.
    pub fn nearest(&self, color: &Rgb<u8>) -> usize {
        let mut best = 0;
        let mut best_distance = u32::MAX;
        for (index, candidate) in self.colors.iter().enumerate() {
            let distance = squared_distance(candidate, color);
            if distance < best_distance {
                best = index;
                best_distance = distance;
                if distance == 0 {
                    break;
                }
            }
        }
        best
    }

    /// Flat `[r, g, b, r, g, b, ...]` table as stored in a GIF colour table.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.0).collect()
    }
}

impl ColorMap for Palette {
    type Color = Rgb<u8>;

    fn index_of(&self, color: &Rgb<u8>) -> usize {
        self.nearest(color)
    }

    fn lookup(&self, index: usize) -> Option<Rgb<u8>> {
        self.get(index)
    }

    fn has_lookup(&self) -> bool {
        true
    }

    fn map_color(&self, color: &mut Rgb<u8>) {
        *color = self.colors[self.nearest(color)];
    }
}

fn squared_distance(a: &Rgb<u8>, b: &Rgb<u8>) -> u32 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error("palette must hold 1..={MAX_COLORS} colors, got {0}")]
    Size(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn plan9_layout() {
        let palette = Palette::plan9();
        assert_eq!(palette.len(), 256);
        assert_eq!(palette.get(0), Some(Rgb([0, 0, 0])));
        assert_eq!(palette.get(1), Some(Rgb([0x00, 0x00, 0x44])));
        assert_eq!(palette.get(16), Some(Rgb([0x00, 0xdd, 0xdd])));
        assert_eq!(palette.get(17), Some(Rgb([0x11, 0x11, 0x11])));
        assert_eq!(palette.get(255), Some(Rgb([0xff, 0xff, 0xff])));

        let distinct: HashSet<[u8; 3]> = (0..256).filter_map(|i| palette.get(i)).map(|c| c.0).collect();
        assert_eq!(distinct.len(), 256, "plan9 colours are all distinct");
    }

    #[test]
    fn nearest_exact_and_approximate() {
        let palette = Palette::plan9();
        assert_eq!(palette.nearest(&Rgb([255, 255, 255])), 255);
        assert_eq!(palette.nearest(&Rgb([0, 0, 0])), 0);
        assert_eq!(palette.nearest(&Rgb([1, 1, 70])), 1);
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let palette =
            Palette::from_colors(vec![Rgb([0, 0, 0]), Rgb([10, 0, 0]), Rgb([0, 0, 0])]).unwrap();
        assert_eq!(palette.nearest(&Rgb([5, 0, 0])), 0);
        assert_eq!(palette.nearest(&Rgb([0, 0, 0])), 0);
    }

    #[test]
    fn map_color_snaps_to_palette() {
        let palette = Palette::from_colors(vec![Rgb([0, 0, 0]), Rgb([255, 255, 255])]).unwrap();
        let mut color = Rgb([200, 190, 220]);
        palette.map_color(&mut color);
        assert_eq!(color, Rgb([255, 255, 255]));
        assert_eq!(palette.index_of(&Rgb([20, 20, 20])), 0);
    }

    #[test]
    fn rgb_bytes_are_flat_triplets() {
        let palette = Palette::from_colors(vec![Rgb([1, 2, 3]), Rgb([4, 5, 6])]).unwrap();
        assert_eq!(palette.to_rgb_bytes(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(Palette::plan9().to_rgb_bytes().len(), 768);
    }

    #[test]
    fn palette_size_limits() {
        assert!(Palette::from_colors(vec![]).is_err());
        assert!(Palette::from_colors(vec![Rgb([0, 0, 0]); 257]).is_err());
        assert!(Palette::from_colors(vec![Rgb([0, 0, 0]); 256]).is_ok());
    }
}
