//! Drawing surfaces the overlay paints into.
//!
//! The overlay never talks to a terminal or GPU directly; it plots colored
//! pixels and short text labels through [`Surface`]. The host decides how a
//! surface reaches the screen.

mod braille;
pub mod geometry;

pub use braille::BrailleSurface;

use ratatui::style::Color;

/// A pixel-addressed drawing target owned by the frame renderer
pub trait Surface {
    /// Current size in pixels (width, height)
    fn pixel_size(&self) -> (usize, usize);

    /// Reallocate the backing buffer; contents are discarded
    fn resize(&mut self, width: usize, height: usize);

    /// Erase every pixel and label
    fn clear(&mut self);

    /// Set one pixel. Out-of-range coordinates are ignored.
    fn plot(&mut self, x: i32, y: i32, color: Color);

    /// Draw `text` centered on pixel (x, y)
    fn text(&mut self, x: i32, y: i32, text: &str, color: Color);
}
