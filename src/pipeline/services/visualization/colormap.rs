use image::Rgb;

const PLASMA: [(f32, [u8; 3]); 5] = [
    (0.0, [13, 8, 135]),
    (0.25, [126, 3, 168]),
    (0.5, [204, 71, 120]),
    (0.75, [248, 149, 64]),
    (1.0, [240, 249, 33]),
];

const GREENS: [(f32, [u8; 3]); 5] = [
    (0.0, [247, 252, 245]),
    (0.25, [199, 233, 192]),
    (0.5, [116, 196, 118]),
    (0.75, [35, 139, 69]),
    (1.0, [0, 68, 27]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Cyclic: both ends are red.
    Hsv,
    Plasma,
    Gray,
    /// White to dark green.
    Greens,
}

impl Colormap {
    /// Maps `t` in [0, 1] (clamped) to a color.
    pub fn sample(&self, t: f32) -> Rgb<u8> {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            Colormap::Hsv => hue_to_rgb(t * 360.0),
            Colormap::Plasma => interpolate(&PLASMA, t),
            Colormap::Gray => {
                let v = (t * 255.0).round() as u8;
                Rgb([v, v, v])
            }
            Colormap::Greens => interpolate(&GREENS, t),
        }
    }
}

/// Fully saturated, full-value color for a hue in degrees.
fn hue_to_rgb(degrees: f32) -> Rgb<u8> {
    let h = (degrees % 360.0) / 60.0;
    let x = 1.0 - ((h % 2.0) - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    Rgb([to_u8(r), to_u8(g), to_u8(b)])
}

fn interpolate(stops: &[(f32, [u8; 3])], t: f32) -> Rgb<u8> {
    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let f = (t - t0) / (t1 - t0);
            let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * f).round() as u8;
            return Rgb([lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2])]);
        }
    }
    Rgb(stops[stops.len() - 1].1)
}

fn to_u8(channel: f32) -> u8 {
    (channel * 255.0).round() as u8
}
