use super::type_lib::NumericData;

/// Tick formatter that factors a common power of ten out of the axis once the
/// axis magnitude leaves `10^lo .. 10^hi`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SciFormatter {
    pub power_limits: (i32, i32),
}

impl Default for SciFormatter {
    fn default() -> Self {
        SciFormatter { power_limits: (-3, 3) }
    }
}

impl SciFormatter {
    pub fn new(power_limits: (i32, i32)) -> Self {
        SciFormatter { power_limits }
    }

    pub fn exponent(&self, lower: NumericData, upper: NumericData) -> i32 {
        let magnitude = lower.abs().max(upper.abs());
        if magnitude == 0.0 || !magnitude.is_finite() {
            return 0;
        }
        let oom = magnitude.log10().floor() as i32;
        if oom <= self.power_limits.0 || oom >= self.power_limits.1 {
            oom
        } else {
            0
        }
    }

    pub fn format_tick(&self, value: NumericData, exponent: i32) -> String {
        let scaled = value / 10f64.powi(exponent);
        let text = format!("{:.4}", scaled);
        let text: &str = if text.contains('.') { text.trim_end_matches('0').trim_end_matches('.') } else { text.as_str() };
        if text == "-0" {
            "0".to_string()
        } else {
            text.to_string()
        }
    }

    pub fn axis_label(&self, label: &str, exponent: i32) -> String {
        if exponent == 0 {
            label.to_string()
        } else {
            format!("{} (×10^{})", label, exponent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponent_outside_limits() {
        let fmt = SciFormatter::default();
        assert_eq!(fmt.exponent(0.0, 1.0e6), 6);
        assert_eq!(fmt.exponent(0.0, 2.0e5), 5);
        assert_eq!(fmt.exponent(0.0, 1.0e-4), -4);
    }

    #[test]
    fn test_exponent_inside_limits() {
        let fmt = SciFormatter::default();
        assert_eq!(fmt.exponent(0.0, 1.0), 0);
        assert_eq!(fmt.exponent(-50.0, 999.0), 0);
        assert_eq!(fmt.exponent(0.0, 0.0), 0);
    }

    #[test]
    fn test_format_tick() {
        let fmt = SciFormatter::default();
        assert_eq!(fmt.format_tick(2.0e5, 6), "0.2");
        assert_eq!(fmt.format_tick(1.0e6, 6), "1");
        assert_eq!(fmt.format_tick(0.0, 6), "0");
        assert_eq!(fmt.format_tick(-1.0e-9, 6), "0");
        assert_eq!(fmt.format_tick(12.5, 0), "12.5");
    }

    #[test]
    fn test_axis_label() {
        let fmt = SciFormatter::default();
        assert_eq!(fmt.axis_label("x", 0), "x");
        assert_eq!(fmt.axis_label("x", 6), "x (×10^6)");
    }
}
