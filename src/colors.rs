use egui::{Color32, Visuals};

// Clamp ranges for the logprob gradient. Primary tokens rarely fall below -1
// on in-distribution text; rejected alternatives can be arbitrarily unlikely,
// so they get a much wider range to keep their ranking visible.
pub const PRIMARY_CLAMP: f64 = 1.0;
pub const ALTERNATIVE_CLAMP: f64 = 10.0;

pub const ACCENT_PRIMARY: Color32 = Color32::from_rgb(164, 145, 194);
pub const SUCCESS: Color32 = Color32::from_rgb(100, 161, 115);
pub const WARNING: Color32 = Color32::from_rgb(204, 152, 88);
pub const ERROR: Color32 = Color32::from_rgb(205, 115, 115);
pub const INFO: Color32 = Color32::from_rgb(124, 156, 191);

pub const TEXT_DARK: Color32 = Color32::from_rgb(38, 40, 45);
pub const TEXT_WHITE: Color32 = Color32::from_rgb(240, 242, 246);

fn themed(visuals: &Visuals, dark: Color32, light: Color32) -> Color32 {
    if visuals.dark_mode {
        dark
    } else {
        light
    }
}

pub fn secondary_bg(visuals: &Visuals) -> Color32 {
    themed(
        visuals,
        Color32::from_rgb(50, 50, 50),
        Color32::from_rgb(210, 210, 210),
    )
}

pub fn text_primary(visuals: &Visuals) -> Color32 {
    themed(
        visuals,
        Color32::from_rgb(225, 227, 232),
        Color32::from_rgb(38, 40, 45),
    )
}

pub fn text_muted(visuals: &Visuals) -> Color32 {
    themed(
        visuals,
        Color32::from_rgb(148, 152, 162),
        Color32::from_rgb(100, 104, 114),
    )
}

pub fn text_very_muted(visuals: &Visuals) -> Color32 {
    themed(
        visuals,
        Color32::from_rgb(108, 112, 122),
        Color32::from_rgb(130, 134, 144),
    )
}

pub fn error_bg(visuals: &Visuals) -> Color32 {
    themed(
        visuals,
        Color32::from_rgb(48, 32, 36),
        Color32::from_rgb(255, 235, 238),
    )
}

// Maps a log-probability onto a yellow-to-blue gradient (deuteranopia
// friendly). logprob = 0 is pure blue, logprob <= -clamp is pure yellow.
// Requires clamp > 0.
pub fn logprob_color(logprob: f64, clamp: f64) -> Color32 {
    let clamped = logprob.clamp(-clamp, 0.0);

    let normalized = (clamped + clamp) / clamp;

    let red = (255.0 * (1.0 - normalized)).round() as u8;
    let green = (255.0 * (1.0 - normalized)).round() as u8;
    let blue = (255.0 * normalized).round() as u8;

    Color32::from_rgb(red, green, blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_likely_endpoint_is_blue() {
        assert_eq!(logprob_color(0.0, 1.0), Color32::from_rgb(0, 0, 255));
        assert_eq!(logprob_color(0.0, 10.0), Color32::from_rgb(0, 0, 255));
    }

    #[test]
    fn test_unlikely_endpoint_is_yellow() {
        assert_eq!(logprob_color(-1.0, 1.0), Color32::from_rgb(255, 255, 0));
        assert_eq!(logprob_color(-10.0, 10.0), Color32::from_rgb(255, 255, 0));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        assert_eq!(logprob_color(-1000.0, 1.0), logprob_color(-1.0, 1.0));
        assert_eq!(
            logprob_color(f64::NEG_INFINITY, 1.0),
            logprob_color(-1.0, 1.0)
        );
        assert_eq!(logprob_color(0.5, 1.0), logprob_color(0.0, 1.0));
    }

    #[test]
    fn test_gradient_is_monotonic() {
        let mut prev = logprob_color(0.0, 1.0);
        for i in 1..=100 {
            let color = logprob_color(-(i as f64) / 100.0, 1.0);
            assert!(color.b() <= prev.b());
            assert!(color.r() >= prev.r());
            assert!(color.g() >= prev.g());
            prev = color;
        }
    }

    #[test]
    fn test_midpoint_mixes_both_hues() {
        let color = logprob_color(-0.5, 1.0);
        assert_eq!(color.r(), color.g());
        assert_eq!(color.r(), 128);
        assert_eq!(color.b(), 128);
    }
}
