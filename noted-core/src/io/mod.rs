//! # Canvas files
//!
//! Binary format, every integer and float big-endian:
//!
//! ```text
//! magic:u32 = 0x819a70ce, npages:u16, nundo:u16
//! per page:   nstrokes:u32, pattern:u16, density:u16, bounds:[f32; 4] (x1, y1, x2, y2)
//! per stroke: npoints:u32, r:u8, g:u8, b:u8, a:u8, thickness:f32,
//!             then npoints x values, then npoints y values, all f32
//! ```
//!
//! Floats go through [`float`] rather than being written as raw host bits. `nundo` is reserved and
//! always zero.

pub mod float;

use az::CheckedAs;
use std::io::{Read, Write};

use crate::settings::Settings;
use crate::state::{Canvas, Page, PagePattern};
use crate::stroke::{Stroke, StrokeID, StrokeStyle};
use crate::util::Rect;

pub const MAGIC: u32 = 0x819a_70ce;

/// Floats are converted this many at a time.
const CHUNK: usize = 256;

// Repr (C) for matching layout in file. Fields hold big-endian values!
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug)]
#[repr(C)]
struct FileHeader {
    magic: u32,
    npages: u16,
    nundo: u16,
}
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug)]
#[repr(C)]
struct FilePage {
    nstrokes: u32,
    pattern: u16,
    density: u16,
    /// Encoded floats.
    bounds: [u32; 4],
}
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug)]
#[repr(C)]
struct FileStroke {
    npoints: u32,
    color: [u8; 4],
    /// Encoded float.
    thickness: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error("not a canvas file (magic {:#010x})", .0)]
    BadMagic(u32),
    #[error("file has no pages")]
    NoPages,
    #[error("stroke {stroke} on page {page} has no points")]
    EmptyStroke { page: usize, stroke: u32 },
    #[error("count too large for this platform")]
    TooLarge,
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    #[error("too many pages")]
    TooManyPages,
    #[error("too many strokes on one page")]
    TooManyStrokes,
    #[error("too many points in one stroke")]
    TooManyPoints,
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

/// Read a whole canvas. Stroke bounds and segment lengths are derived from the points.
///
/// # Errors
/// Forwards errors from `r`, notably `UnexpectedEof` for a truncated file. Otherwise, see
/// [`ReadError`]. Nothing partial is ever returned.
pub fn read<R: Read>(mut r: R, settings: Settings) -> Result<Canvas, ReadError> {
    let mut header = <FileHeader as bytemuck::Zeroable>::zeroed();
    r.read_exact(bytemuck::bytes_of_mut(&mut header))?;
    let magic = u32::from_be(header.magic);
    if magic != MAGIC {
        return Err(ReadError::BadMagic(magic));
    }
    let npages = usize::from(u16::from_be(header.npages));
    if npages == 0 {
        return Err(ReadError::NoPages);
    }

    let mut pages = Vec::with_capacity(npages);
    let mut next_id = 0u64;
    for page_idx in 0..npages {
        let mut file_page = <FilePage as bytemuck::Zeroable>::zeroed();
        r.read_exact(bytemuck::bytes_of_mut(&mut file_page))?;

        let raw_pattern = u16::from_be(file_page.pattern);
        let pattern = PagePattern::from_repr(raw_pattern).unwrap_or_else(|| {
            log::warn!("page {page_idx} has unknown pattern {raw_pattern}, using blank");
            PagePattern::Blank
        });
        let bounds = Rect::from(
            file_page
                .bounds
                .map(|bits| float::decode(u32::from_be(bits))),
        );
        let mut page = Page::new(bounds, pattern, u16::from_be(file_page.density));

        let nstrokes = u32::from_be(file_page.nstrokes);
        for stroke_idx in 0..nstrokes {
            let mut file_stroke = <FileStroke as bytemuck::Zeroable>::zeroed();
            r.read_exact(bytemuck::bytes_of_mut(&mut file_stroke))?;

            let npoints: usize = u32::from_be(file_stroke.npoints)
                .checked_as()
                .ok_or(ReadError::TooLarge)?;
            let empty = ReadError::EmptyStroke {
                page: page_idx,
                stroke: stroke_idx,
            };
            if npoints == 0 {
                return Err(empty);
            }
            let xs = read_floats(&mut r, npoints)?;
            let ys = read_floats(&mut r, npoints)?;
            let style = StrokeStyle {
                color: bytemuck::cast(file_stroke.color),
                thickness: float::decode(u32::from_be(file_stroke.thickness)),
            };
            let stroke = Stroke::from_points(StrokeID(next_id), page_idx, xs, ys, style)
                .ok_or(empty)?;
            next_id += 1;
            page.push_stroke(stroke);
        }
        pages.push(page);
    }
    log::debug!("read {npages} pages, {next_id} strokes");
    Ok(Canvas::from_pages(pages, settings))
}

/// Write a whole canvas.
///
/// # Errors
/// Forwards errors from `w`, or reports counts too large for their fields. The writer may have
/// received part of the file by then.
pub fn write<W: Write>(canvas: &Canvas, mut w: W) -> Result<(), WriteError> {
    let npages: u16 = canvas
        .page_count()
        .checked_as()
        .ok_or(WriteError::TooManyPages)?;
    let header = FileHeader {
        magic: MAGIC.to_be(),
        npages: npages.to_be(),
        nundo: 0,
    };
    w.write_all(bytemuck::bytes_of(&header))?;

    for page in canvas.pages() {
        let nstrokes: u32 = page
            .strokes()
            .len()
            .checked_as()
            .ok_or(WriteError::TooManyStrokes)?;
        let file_page = FilePage {
            nstrokes: nstrokes.to_be(),
            pattern: (page.pattern as u16).to_be(),
            density: page.density.to_be(),
            bounds: page.bounds().as_array().map(|v| float::encode(v).to_be()),
        };
        w.write_all(bytemuck::bytes_of(&file_page))?;

        for stroke in page.strokes() {
            let npoints: u32 = stroke
                .len()
                .checked_as()
                .ok_or(WriteError::TooManyPoints)?;
            let style = stroke.style();
            let file_stroke = FileStroke {
                npoints: npoints.to_be(),
                color: style.color.as_array(),
                thickness: float::encode(style.thickness).to_be(),
            };
            w.write_all(bytemuck::bytes_of(&file_stroke))?;
            write_floats(&mut w, stroke.xs())?;
            write_floats(&mut w, stroke.ys())?;
        }
    }
    Ok(())
}

fn read_floats<R: Read>(r: &mut R, count: usize) -> std::io::Result<Vec<f32>> {
    // Count is from the outside world, let the reader run dry before trusting it with memory.
    let mut values = Vec::with_capacity(count.min(CHUNK));
    let mut buffer = [0u32; CHUNK];
    let mut remaining = count;
    while remaining > 0 {
        let chunk = &mut buffer[..remaining.min(CHUNK)];
        r.read_exact(bytemuck::cast_slice_mut(chunk))?;
        values.extend(chunk.iter().map(|&bits| float::decode(u32::from_be(bits))));
        remaining -= chunk.len();
    }
    Ok(values)
}

fn write_floats<W: Write>(w: &mut W, values: &[f32]) -> std::io::Result<()> {
    let mut buffer = [0u32; CHUNK];
    for values in values.chunks(CHUNK) {
        let chunk = &mut buffer[..values.len()];
        for (bits, &value) in chunk.iter_mut().zip(values) {
            *bits = float::encode(value).to_be();
        }
        w.write_all(bytemuck::cast_slice(chunk))?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{read, write, ReadError, MAGIC};
    use crate::color::Color;
    use crate::input::{Tool, ToolState};
    use crate::settings::Settings;
    use crate::state::{Canvas, PagePattern};
    use crate::stroke::StrokeStyle;

    /// A couple of pages of assorted ink.
    fn sample_canvas() -> Canvas {
        let mut canvas = Canvas::new();
        let gestures: [&[(f32, f32)]; 3] = [
            &[(0.1, 0.1), (0.2, 0.15), (0.3, 0.3), (0.35, 0.5)],
            &[(0.5, 0.5)],
            &[(0.6, 1.4), (0.7, 1.45), (0.9, 1.6)],
        ];
        for (i, gesture) in gestures.into_iter().enumerate() {
            canvas.set_stroke_style(StrokeStyle {
                color: Color::from_rgb_hex(0x20_40_80 * (i as u32 + 1)),
                thickness: 0.002 * (i + 1) as f32,
            });
            let (&(x, y), rest) = gesture.split_first().unwrap();
            canvas.input(ToolState::Down, Tool::Pen, x, y, 1.0);
            for &(x, y) in rest {
                canvas.input(ToolState::Drag, Tool::Pen, x, y, 1.0);
            }
            canvas.input(ToolState::Up, Tool::Pen, x, y, 1.0);
        }
        canvas.set_page_pattern(1, PagePattern::Ruled, 25);
        canvas
    }
    fn to_bytes(canvas: &Canvas) -> Vec<u8> {
        let mut bytes = Vec::new();
        write(canvas, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn layout() {
        let bytes = to_bytes(&Canvas::new());
        // Header, then one page with no strokes.
        assert_eq!(bytes.len(), 8 + 24);
        assert_eq!(bytes[..4], [0x81, 0x9a, 0x70, 0xce]);
        assert_eq!(bytes[4..8], [0, 1, 0, 0]);
        // No strokes, grided, density 40.
        assert_eq!(bytes[8..16], [0, 0, 0, 0, 0, 2, 0, 40]);
        // x1, y1 zero. x2 is 1.0.
        assert_eq!(bytes[16..24], [0; 8]);
        assert_eq!(bytes[24..28], [0x3f, 0x80, 0, 0]);
    }
    #[test]
    fn save_load_save_identical() {
        let canvas = sample_canvas();
        let first = to_bytes(&canvas);
        let loaded = read(first.as_slice(), Settings::default()).unwrap();
        let second = to_bytes(&loaded);
        assert_eq!(first, second);

        assert_eq!(loaded.page_count(), canvas.page_count());
        for (a, b) in loaded.pages().iter().zip(canvas.pages()) {
            assert_eq!(a.bounds(), b.bounds());
            assert_eq!((a.pattern, a.density), (b.pattern, b.density));
            assert_eq!(a.strokes().len(), b.strokes().len());
            for (sa, sb) in a.strokes().iter().zip(b.strokes()) {
                assert_eq!(sa.xs(), sb.xs());
                assert_eq!(sa.ys(), sb.ys());
                assert_eq!(sa.style(), sb.style());
                // Derived on load.
                assert_eq!(sa.bounds(), sb.bounds());
                assert_eq!(sa.max_dist_sq(), sb.max_dist_sq());
            }
        }
    }
    #[test]
    fn bad_magic() {
        let mut bytes = to_bytes(&Canvas::new());
        bytes[0] = 0x18;
        let err = read(bytes.as_slice(), Settings::default()).unwrap_err();
        assert!(matches!(err, ReadError::BadMagic(m) if m != MAGIC));
    }
    #[test]
    fn truncated() {
        let bytes = to_bytes(&sample_canvas());
        for len in [0, 3, 7, 20, bytes.len() / 2, bytes.len() - 1] {
            let err = read(&bytes[..len], Settings::default()).unwrap_err();
            assert!(
                matches!(&err, ReadError::IOError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof),
                "{len}: {err}"
            );
        }
    }
    /// Header and a single page holding `nstrokes`, with the given pattern value.
    fn handmade(pattern: u16, nstrokes: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(MAGIC.to_be_bytes());
        bytes.extend([0, 1, 0, 0]);
        bytes.extend(nstrokes.to_be_bytes());
        bytes.extend(pattern.to_be_bytes());
        bytes.extend(10u16.to_be_bytes());
        for v in [0.0f32, 0.0, 1.0, 1.5] {
            bytes.extend(v.to_bits().to_be_bytes());
        }
        bytes
    }
    #[test]
    fn empty_stroke_rejected() {
        let mut bytes = handmade(0, 1);
        bytes.extend(0u32.to_be_bytes());
        bytes.extend([0, 0, 0, 255]);
        bytes.extend(0.01f32.to_bits().to_be_bytes());
        let err = read(bytes.as_slice(), Settings::default()).unwrap_err();
        assert!(matches!(err, ReadError::EmptyStroke { page: 0, stroke: 0 }));
    }
    #[test]
    fn unknown_pattern_is_blank() {
        let canvas = read(handmade(77, 0).as_slice(), Settings::default()).unwrap();
        let page = canvas.page(0).unwrap();
        assert_eq!(page.pattern, PagePattern::Blank);
        assert_eq!(page.density, 10);
        assert_eq!(canvas.height(), 1.5);
    }
    #[test]
    fn no_pages() {
        let mut bytes = Vec::new();
        bytes.extend(MAGIC.to_be_bytes());
        bytes.extend([0, 0, 0, 0]);
        let err = read(bytes.as_slice(), Settings::default()).unwrap_err();
        assert!(matches!(err, ReadError::NoPages));
    }
    #[test]
    fn open_and_save_files() {
        let path = std::env::temp_dir().join(format!("noted-io-test-{}.noted", std::process::id()));
        let canvas = sample_canvas();
        canvas.save(&path).unwrap();
        let opened = Canvas::open(&path).unwrap();
        assert_eq!(opened.path(), Some(path.as_path()));
        assert_eq!(to_bytes(&opened), to_bytes(&canvas));
        std::fs::remove_file(&path).unwrap();

        assert!(Canvas::open(&path).is_err());
    }
}
