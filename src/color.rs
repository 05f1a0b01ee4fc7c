use palette::FromColor;

/// An RGB color with an extra brightness factor that is applied when the
/// color is turned into raw strip channels. Channels stay within 0-255 and
/// brightness within 0.0-1.0 after every operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub brightness: f32,
}

pub const BLACK: Color = Color {
    r: 0,
    g: 0,
    b: 0,
    brightness: 1.0,
};

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Color {
        Color {
            r,
            g,
            b,
            brightness: 1.0,
        }
    }

    pub fn with_brightness(self, brightness: f32) -> Color {
        Color {
            brightness: brightness.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Fully saturated, full-value color from a hue angle in degrees.
    pub fn from_hue(degrees: f32) -> Color {
        let hsv = palette::Hsv::new(degrees, 1.0, 1.0);
        let rgb = palette::Srgb::from_color(hsv).into_format::<u8>();
        Color::new(rgb.red, rgb.green, rgb.blue)
    }

    /// Linear blend between two colors: y = (1 - t) * self + t * other.
    /// The fraction is clamped into [0, 1], channels are floor-truncated
    /// and clamped after blending.
    pub fn interpolate(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: blend_channel(self.r, other.r, t),
            g: blend_channel(self.g, other.g, t),
            b: blend_channel(self.b, other.b, t),
            brightness: ((1.0 - t) * self.brightness + t * other.brightness).clamp(0.0, 1.0),
        }
    }

    /// Raw channel values with brightness baked in, in strip order.
    pub fn channels(&self) -> [u8; 3] {
        [
            scale_channel(self.r, self.brightness),
            scale_channel(self.g, self.brightness),
            scale_channel(self.b, self.brightness),
        ]
    }
}

fn blend_channel(a: u8, b: u8, t: f32) -> u8 {
    let value = (1.0 - t) * f32::from(a) + t * f32::from(b);
    value.floor().clamp(0.0, 255.0) as u8
}

fn scale_channel(value: u8, brightness: f32) -> u8 {
    (f32::from(value) * brightness.clamp(0.0, 1.0)).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_endpoints() {
        let a = Color::new(10, 200, 255);
        let b = Color::new(250, 0, 32);

        assert_eq!(a.interpolate(b, 0.0), a);
        assert_eq!(a.interpolate(b, 1.0), b);
    }

    #[test]
    fn interpolate_stays_between_endpoints() {
        let a = Color::new(10, 200, 255).with_brightness(0.25);
        let b = Color::new(250, 0, 32);

        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let mid = a.interpolate(b, t);
            assert!(mid.r >= a.r && mid.r <= b.r);
            assert!(mid.g <= a.g && mid.g >= b.g);
            assert!(mid.b <= a.b && mid.b >= b.b);
            assert!(mid.brightness >= a.brightness && mid.brightness <= b.brightness);
        }
    }

    #[test]
    fn interpolate_midpoint_floors() {
        let a = Color::new(0, 0, 0);
        let b = Color::new(255, 255, 255);

        let mid = a.interpolate(b, 0.5);
        assert_eq!(mid, Color::new(127, 127, 127));
    }

    #[test]
    fn interpolate_clamps_fraction() {
        let a = Color::new(10, 20, 30).with_brightness(0.5);
        let b = Color::new(200, 100, 50);

        assert_eq!(a.interpolate(b, -3.0), a.interpolate(b, 0.0));
        assert_eq!(a.interpolate(b, 7.5), a.interpolate(b, 1.0));
    }

    #[test]
    fn brightness_is_clamped() {
        assert_eq!(Color::new(0, 0, 0).with_brightness(4.2).brightness, 1.0);
        assert_eq!(Color::new(0, 0, 0).with_brightness(-0.1).brightness, 0.0);
    }

    #[test]
    fn channels_apply_brightness() {
        let color = Color::new(255, 0, 128).with_brightness(0.5);
        assert_eq!(color.channels(), [127, 0, 64]);

        let opaque = Color::new(12, 34, 56);
        assert_eq!(opaque.channels(), [12, 34, 56]);
    }

    #[test]
    fn hue_hits_the_primaries() {
        assert_eq!(Color::from_hue(0.0), Color::new(255, 0, 0));
        assert_eq!(Color::from_hue(120.0), Color::new(0, 255, 0));
        assert_eq!(Color::from_hue(240.0), Color::new(0, 0, 255));
    }
}
