use dataset::QcFlag;
use viewport::{MarkerStyle, Rgb};

pub const ACCENT: Rgb = Rgb(0x00, 0xd4, 0xff);
pub const WARNING: Rgb = Rgb(0xff, 0x6b, 0x6b);
pub const STROKE: Rgb = Rgb(0xff, 0xff, 0xff);

pub const GOOD_STYLE: MarkerStyle = MarkerStyle {
    radius_px: 6.0,
    fill: ACCENT,
    fill_opacity: 0.8,
    stroke: STROKE,
    stroke_weight: 2.0,
};

pub const BAD_STYLE: MarkerStyle = MarkerStyle {
    radius_px: 4.0,
    fill: WARNING,
    fill_opacity: 0.6,
    stroke: STROKE,
    stroke_weight: 1.0,
};

/// Marker paint bound to the record's QC flag.
pub fn style_for(flag: QcFlag) -> MarkerStyle {
    match flag {
        QcFlag::Good => GOOD_STYLE,
        QcFlag::Bad => BAD_STYLE,
    }
}
