use std::fmt;

use itertools::Itertools;
use ndarray::prelude::*;

pub const DISPLAY_COLUMNS: usize = 64;
pub const DISPLAY_ROWS: usize = 32;

/// The two tones of a monochrome surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shade {
    /// The idle colour the surface is blanked to before a program runs.
    #[default]
    Foreground,
    Background,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    /// The rectangle covering a whole `columns` x `rows` surface.
    pub fn full(columns: usize, rows: usize) -> Self {
        Self {
            x: 0,
            y: 0,
            width: columns,
            height: rows,
        }
    }
}

/// Anything the bootstrap can paint before handing the surface to the engine.
pub trait PixelSurface {
    /// Logical size as `(columns, rows)`.
    fn dimensions(&self) -> (usize, usize);
    fn fill_rect(&mut self, rect: Rect, shade: Shade);
}

/// Blank the whole surface to the foreground shade.
pub fn initialize_display<P: PixelSurface + ?Sized>(surface: &mut P) {
    let (columns, rows) = surface.dimensions();
    log::debug!("blanking {}x{} surface", columns, rows);
    surface.fill_rect(Rect::full(columns, rows), Shade::Foreground);
}

/// In-memory surface, indexed `[[x, y]]`.
///
/// A fresh framebuffer is all `Background`, like an unpainted canvas, so
/// blanking is observable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Array2<Shade>,
}

impl Framebuffer {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            pixels: Array2::from_elem((columns, rows), Shade::Background),
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Shade> {
        self.pixels.get([x, y]).copied()
    }

    /// True when every pixel carries the foreground shade.
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|shade| *shade == Shade::Foreground)
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new(DISPLAY_COLUMNS, DISPLAY_ROWS)
    }
}

impl PixelSurface for Framebuffer {
    fn dimensions(&self) -> (usize, usize) {
        self.pixels.dim()
    }

    fn fill_rect(&mut self, rect: Rect, shade: Shade) {
        let (columns, rows) = self.dimensions();
        let x_end = rect.x.saturating_add(rect.width).min(columns);
        let y_end = rect.y.saturating_add(rect.height).min(rows);
        if rect.x >= x_end || rect.y >= y_end {
            return;
        }
        self.pixels
            .slice_mut(s![rect.x..x_end, rect.y..y_end])
            .fill(shade);
    }
}

impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .pixels
            .columns()
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|shade| match shade {
                        Shade::Foreground => '#',
                        Shade::Background => '.',
                    })
                    .collect::<String>()
            })
            .join("\n");
        f.write_str(&text)
    }
}

#[test]
fn test_initialize_blanks_everything() {
    let mut fb = Framebuffer::default();
    assert!(!fb.is_blank());
    initialize_display(&mut fb);
    assert!(fb.is_blank());
    for x in 0..DISPLAY_COLUMNS {
        for y in 0..DISPLAY_ROWS {
            assert_eq!(fb.pixel(x, y), Some(Shade::Foreground));
        }
    }
    assert_eq!(fb.pixel(DISPLAY_COLUMNS, 0), None);
}

#[test]
fn test_fill_rect_clamps() {
    let mut fb = Framebuffer::new(4, 2);
    fb.fill_rect(Rect { x: 2, y: 1, width: 10, height: 10 }, Shade::Foreground);
    assert_eq!(fb.to_string(), "....\n..##");
    fb.fill_rect(Rect { x: 9, y: 0, width: 1, height: 1 }, Shade::Foreground);
    fb.fill_rect(Rect { x: 0, y: 0, width: 0, height: 2 }, Shade::Foreground);
    assert_eq!(fb.to_string(), "....\n..##");
}

#[test]
fn test_display_rows() {
    let mut fb = Framebuffer::new(3, 2);
    fb.fill_rect(Rect { x: 0, y: 0, width: 1, height: 2 }, Shade::Foreground);
    assert_eq!(fb.to_string(), "#..\n#..");
    assert_eq!(fb.dimensions(), (3, 2));
}
