use ratatui::style::Color;

use super::Surface;

/// Text placed over the braille layer, in character cells
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub col: u16,
    pub row: u16,
    pub text: String,
    pub color: Color,
}

/// Braille Unicode surface for high-resolution terminal graphics.
/// Each character cell represents a 2x4 pixel grid (8 dots) and carries one
/// foreground color: the color of the last dot plotted into it.
/// Unicode Braille patterns: U+2800 to U+28FF
#[derive(Clone, Debug, Default)]
pub struct BrailleSurface {
    width: usize,  // Characters
    height: usize, // Characters
    dots: Vec<u8>, // Bit patterns per char, row-major
    colors: Vec<Option<Color>>,
    labels: Vec<Label>,
}

impl BrailleSurface {
    /// Create a surface with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dots: vec![0; width * height],
            colors: vec![None; width * height],
            labels: Vec::new(),
        }
    }

    /// Character dimensions (columns, rows)
    pub fn char_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    #[inline(always)]
    fn dot_bit(x: usize, y: usize) -> u8 {
        match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        }
    }

    /// Glyph and color of a character cell, `None` when the cell is blank
    pub fn cell(&self, col: usize, row: usize) -> Option<(char, Color)> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let idx = row * self.width + col;
        let bits = self.dots[idx];
        if bits == 0 {
            return None;
        }
        let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
        Some((ch, self.colors[idx].unwrap_or(Color::Reset)))
    }

    /// Non-blank cells as (col, row, glyph, color)
    pub fn cells(&self) -> impl Iterator<Item = (u16, u16, char, Color)> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width).filter_map(move |col| {
                self.cell(col, row)
                    .map(|(ch, color)| (col as u16, row as u16, ch, color))
            })
        })
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Convert the surface to a string of Braille characters
    #[cfg(test)]
    pub fn to_string(&self) -> String {
        self.dots
            .chunks(self.width.max(1))
            .map(|row| {
                row.iter()
                    .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Surface for BrailleSurface {
    fn pixel_size(&self) -> (usize, usize) {
        (self.width * 2, self.height * 4)
    }

    fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width.div_ceil(2), height.div_ceil(4));
    }

    fn clear(&mut self) {
        self.dots.fill(0);
        self.colors.fill(None);
        self.labels.clear();
    }

    fn plot(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return;
        }

        let idx = cy * self.width + cx;
        self.dots[idx] |= Self::dot_bit(x, y);
        self.colors[idx] = Some(color);
    }

    fn text(&mut self, x: i32, y: i32, text: &str, color: Color) {
        let anchor = x.div_euclid(2);
        let row = y.div_euclid(4);
        if row < 0 || row >= self.height as i32 || anchor < 0 || anchor >= self.width as i32 {
            return;
        }
        // Labels near the left edge start at column 0 instead of vanishing
        let len = text.chars().count() as i32;
        let col = (anchor - len / 2).max(0);
        self.labels.push(Label {
            col: col as u16,
            row: row as u16,
            text: text.to_string(),
            color,
        });
    }
}
