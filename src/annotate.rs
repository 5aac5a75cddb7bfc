//! Caption bar burnt into the top of each frame.

use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_text_mut},
    rect::Rect,
};
use tracing::debug;

use crate::{
    error::{Error, Result},
    params::{ParamKey, ParameterRecord},
    sidecar,
};

pub const TOP_BAR: u32 = 30;
pub const TEXT_OFFSET_X: i32 = 10;
pub const TEXT_OFFSET_Y: i32 = 8;
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

const BAR_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Caption fields after the file stem, in display order
const CAPTION_FIELDS: [(ParamKey, &str); 6] = [
    (ParamKey::Steps, "Steps"),
    (ParamKey::CfgScale, "CFG"),
    (ParamKey::Seed, "Seed"),
    (ParamKey::DenoisingStrength, "Denoise"),
    (ParamKey::Sampler, "Sampler"),
    (ParamKey::Model, "Model"),
];

const FONT_FILES: [&str; 4] = [
    "DejaVuSans.ttf",
    "NotoSans-Regular.ttf",
    "LiberationSans-Regular.ttf",
    "Arial.ttf",
];

const SYSTEM_FONTS: [&str; 9] = [
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Clone)]
pub struct CaptionStyle {
    /// Without a font only the bar is drawn
    pub font: Option<FontArc>,
    pub font_size: f32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font: None,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl CaptionStyle {
    /// Explicit font file, or the first usable system font
    pub fn resolve(font: Option<&Path>, font_size: f32) -> Result<Self> {
        let font = match font {
            Some(path) => Some(load_font(path)?),
            None => find_system_font().map(|(path, font)| {
                debug!("caption font: {}", path.display());
                font
            }),
        };
        Ok(Self { font, font_size })
    }
}

pub fn load_font(path: &Path) -> Result<FontArc> {
    let data = std::fs::read(path).map_err(|_| Error::Font(path.to_path_buf()))?;
    FontArc::try_from_vec(data).map_err(|_| Error::Font(path.to_path_buf()))
}

fn font_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = dirs::font_dir() {
        candidates.extend(FONT_FILES.iter().map(|f| dir.join(f)));
    }
    candidates.extend(SYSTEM_FONTS.iter().map(PathBuf::from));
    candidates
}

pub fn find_system_font() -> Option<(PathBuf, FontArc)> {
    font_candidates()
        .into_iter()
        .filter(|p| p.is_file())
        .find_map(|p| load_font(&p).ok().map(|f| (p, f)))
}

/// `<stem> | Steps 20 | CFG 7 | ...`, fields missing from the record are skipped.
/// Images without parameters get no caption.
pub fn caption(stem: &str, record: &ParameterRecord) -> String {
    if record.is_absent() {
        return String::new();
    }
    let mut parts = vec![stem.to_string()];
    for (key, label) in CAPTION_FIELDS {
        if let Some(value) = record.get(key) {
            parts.push(format!("{label} {value}"));
        }
    }
    parts.join(" | ")
}

pub fn annotate(mut img: RgbImage, caption: &str, style: &CaptionStyle) -> RgbImage {
    let (width, height) = img.dimensions();
    let bar = TOP_BAR.min(height);
    if width > 0 && bar > 0 {
        draw_filled_rect_mut(&mut img, Rect::at(0, 0).of_size(width, bar), BAR_COLOR);
    }
    if let Some(font) = &style.font {
        if !caption.is_empty() {
            draw_text_mut(
                &mut img,
                TEXT_COLOR,
                TEXT_OFFSET_X,
                TEXT_OFFSET_Y,
                PxScale::from(style.font_size),
                font,
                caption,
            );
        }
    }
    img
}

/// Annotate with the caption from `stem`'s sidecar, which must exist
pub fn annotate_frame(
    img: RgbImage,
    sidecar_dir: &Path,
    stem: &str,
    style: &CaptionStyle,
) -> Result<RgbImage> {
    let record = sidecar::read(sidecar_dir, stem)?;
    let text = caption(stem, &record);
    debug!("annotating {} with '{}'", stem, &text);
    Ok(annotate(img, &text, style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    const GRAY: Rgb<u8> = Rgb([128, 128, 128]);

    #[test]
    fn caption_in_fixed_order() {
        let record = params::parse(Some(
            "Model: xl, Seed: 42, Steps: 20, CFG scale: 7, Sampler: Euler, Denoising strength: 0.5",
        ));
        assert_eq!(
            caption("230506070809", &record),
            "230506070809 | Steps 20 | CFG 7 | Seed 42 | Denoise 0.5 | Sampler Euler | Model xl"
        );
    }

    #[test]
    fn caption_skips_missing_fields() {
        let record = params::parse(Some("Seed: 1, Steps: 2"));
        assert_eq!(caption("a", &record), "a | Steps 2 | Seed 1");
        assert_eq!(caption("a", &params::parse(Some(""))), "a");
    }

    #[test]
    fn absent_record_has_empty_caption() {
        assert_eq!(caption("a", &ParameterRecord::Absent), "");
    }

    #[test]
    fn bar_covers_top_rows_only() {
        let img = RgbImage::from_pixel(64, 48, GRAY);
        let out = annotate(img, "ignored without font", &CaptionStyle::default());
        assert_eq!(out.dimensions(), (64, 48));
        for x in [0, 31, 63] {
            assert_eq!(*out.get_pixel(x, 0), BAR_COLOR);
            assert_eq!(*out.get_pixel(x, TOP_BAR - 1), BAR_COLOR);
            assert_eq!(*out.get_pixel(x, TOP_BAR), GRAY);
        }
    }

    #[test]
    fn bar_is_clamped_to_short_frames() {
        let out = annotate(RgbImage::from_pixel(8, 4, GRAY), "", &CaptionStyle::default());
        assert!(out.pixels().all(|p| *p == BAR_COLOR));
    }

    fn fixture_font() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSansMono.ttf")
    }

    #[test]
    fn draws_caption_text() {
        let style = CaptionStyle::resolve(Some(&fixture_font()), DEFAULT_FONT_SIZE).unwrap();
        let out = annotate(RgbImage::from_pixel(200, 40, GRAY), "Steps 20", &style);
        let lit = (0..200)
            .flat_map(|x| (0..TOP_BAR).map(move |y| (x, y)))
            .filter(|&(x, y)| out.get_pixel(x, y).0[0] > 128)
            .count();
        assert!(lit > 10, "only {lit} caption pixels drawn");
        // text stays inside the bar
        assert!((TOP_BAR..40).all(|y| *out.get_pixel(100, y) == GRAY));
    }

    #[test]
    fn empty_caption_draws_no_text() {
        let style = CaptionStyle::resolve(Some(&fixture_font()), DEFAULT_FONT_SIZE).unwrap();
        let out = annotate(RgbImage::from_pixel(64, 40, GRAY), "", &style);
        assert!((0..64).all(|x| (0..TOP_BAR).all(|y| *out.get_pixel(x, y) == BAR_COLOR)));
    }

    #[test]
    fn invalid_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.ttf");
        std::fs::write(&path, b"nope").unwrap();
        assert!(matches!(load_font(&path), Err(Error::Font(_))));
        assert!(matches!(
            CaptionStyle::resolve(Some(&dir.path().join("missing.ttf")), 12.0),
            Err(Error::Font(_))
        ));
    }

    #[test]
    fn frame_needs_its_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::from_pixel(8, 8, GRAY);
        let err = annotate_frame(img.clone(), dir.path(), "a", &CaptionStyle::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingSidecar(_)));

        sidecar::write(dir.path(), "a", &ParameterRecord::Absent).unwrap();
        let out = annotate_frame(img, dir.path(), "a", &CaptionStyle::default()).unwrap();
        assert_eq!(*out.get_pixel(0, 0), BAR_COLOR);
    }
}
