//! Synthetic page captures for sessions without a real renderer.
//!
//! The in-memory storefront draws a page card (title bar, URL, one line per
//! visible element) with font8x8 glyphs straight onto an `RgbImage`.

use std::io::Cursor;

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{ImageFormat, ImageResult, Rgb, RgbImage};

const GLYPH: u32 = 8;
const LINE_HEIGHT: u32 = 12;
const MARGIN: u32 = 8;
const PAGE_WIDTH: u32 = 640;

const BACKGROUND: Rgb<u8> = Rgb([245, 242, 236]);
const TITLE_BAR: Rgb<u8> = Rgb([64, 86, 72]);
const TITLE_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const BODY_TEXT: Rgb<u8> = Rgb([30, 30, 30]);
const URL_TEXT: Rgb<u8> = Rgb([90, 90, 140]);

/// Draw `text` starting at (`x`, `y`); glyphs past the right edge are dropped
fn draw_text(img: &mut RgbImage, x: u32, y: u32, text: &str, fg: Rgb<u8>) {
    let glyphs = text.chars().map(|ch| BASIC_FONTS.get(ch).unwrap_or([0u8; 8]));
    for (i, glyph) in glyphs.enumerate() {
        let left = x + i as u32 * GLYPH;
        if left + GLYPH > img.width() {
            break;
        }
        for (dy, bits) in glyph.iter().enumerate() {
            let py = y + dy as u32;
            if py >= img.height() {
                break;
            }
            // font8x8 stores the leftmost pixel in the lowest bit
            for dx in (0..GLYPH).filter(|dx| (*bits >> *dx) & 1 == 1) {
                img.put_pixel(left + dx, py, fg);
            }
        }
    }
}

/// Render a page card: title bar, URL line, then one line per entry
pub fn render_page(title: &str, url: &str, lines: &[String]) -> RgbImage {
    let height = MARGIN * 2 + LINE_HEIGHT * (3 + lines.len() as u32);
    let bar_height = LINE_HEIGHT + MARGIN;
    let mut img = RgbImage::from_fn(PAGE_WIDTH, height, |_, y| {
        if y < bar_height { TITLE_BAR } else { BACKGROUND }
    });

    draw_text(&mut img, MARGIN, MARGIN / 2 + 2, title, TITLE_TEXT);
    draw_text(&mut img, MARGIN, MARGIN + LINE_HEIGHT + 4, url, URL_TEXT);
    for (i, line) in lines.iter().enumerate() {
        let y = MARGIN + LINE_HEIGHT * (3 + i as u32);
        draw_text(&mut img, MARGIN, y, line, BODY_TEXT);
    }
    img
}

/// PNG bytes of an image
pub fn encode_png(img: &RgbImage) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
