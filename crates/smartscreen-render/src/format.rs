//! Sensor value formatting.

use smartscreen_core::{Align, Decimals, NumberFormat};

/// Binary prefixes, each 1024 times the previous one
const BYTE_PREFIXES: [&str; 8] = ["K", "M", "G", "T", "P", "E", "Z", "Y"];

fn prefix_factor(index: usize) -> f64 {
    // 1024^(index + 1)
    f64::powi(1024.0, index as i32 + 1)
}

/// Scale a byte count to the largest prefix it reaches, or to the forced one
fn scale_bytes(value: f64, forced: Option<&str>) -> (f64, &'static str) {
    if let Some(unit) = forced {
        match BYTE_PREFIXES.iter().position(|p| p.eq_ignore_ascii_case(unit)) {
            Some(index) => return (value / prefix_factor(index), BYTE_PREFIXES[index]),
            None => tracing::warn!("Unknown byte prefix '{}', picking one automatically", unit),
        }
    }

    for (index, prefix) in BYTE_PREFIXES.iter().enumerate().rev() {
        let factor = prefix_factor(index);
        if value >= factor {
            return (value / factor, *prefix);
        }
    }
    (value, "")
}

fn format_digits(value: f64, decimals: Decimals, length: usize) -> String {
    match decimals {
        Decimals::Fixed(precision) => format!("{:.*}", usize::from(precision), value),
        Decimals::Auto(_) => {
            if value == 0.0 {
                return "0".to_string();
            }
            // sign counts as a digit, so -5.25 gets one decimal less than 5.25
            let digits = (value.trunc() as i64).to_string().len();
            let precision = length.saturating_sub(1).saturating_sub(digits);
            format!("{:.*}", precision, value)
        }
    }
}

fn pad_start(text: String, width: usize) -> String {
    format!("{:>width$}", text, width = width)
}

/// Center `text` in `width`; an odd leftover goes to the left when `width`
/// is odd, to the right otherwise
fn center(text: String, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text;
    }
    let missing = width - len;
    let left = missing / 2 + (missing & width & 1);
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(missing - left))
}

/// Format a sensor value for a text widget
///
/// The number is printed with the configured decimals (or as many as fit in
/// `length` for `"auto"`), followed by the unit when `show_unit` is set. With
/// `bytes` the value is scaled to a binary prefix (`K` = 1024, `M` = 1024²,
/// ...) that is printed in front of the unit.
///
/// `Left` and `Center` pad the whole text to `length` plus the unit width,
/// `Right` pads it to `length` only, so the unit sticks out past the field.
pub fn format_number(value: f64, format: &NumberFormat, unit: &str, bytes: bool) -> String {
    let (value, symbol) = if bytes {
        scale_bytes(value, format.unit.as_deref())
    } else {
        (value, "")
    };

    let mut text = format_digits(value, format.decimals, format.length);
    let mut unit_len = 0;

    if format.show_unit {
        if format.unit_space {
            text.push(' ');
            unit_len += 1;
        }
        text.push_str(symbol);
        text.push_str(unit);
        unit_len += symbol.chars().count() + unit.chars().count();
    }

    match format.align {
        Align::Left => pad_start(text, format.length + unit_len),
        Align::Center => center(text, format.length + unit_len),
        Align::Right => pad_start(text, format.length),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartscreen_core::AutoDecimals;

    fn fmt(decimals: Decimals, align: Align, length: usize) -> NumberFormat {
        NumberFormat {
            decimals,
            align,
            length,
            ..Default::default()
        }
    }

    #[test]
    fn test_fixed_decimals_right_aligned() {
        let format = fmt(Decimals::Fixed(0), Align::Right, 3);
        assert_eq!(format_number(7.0, &format, "%", false), "  7");
        assert_eq!(format_number(100.0, &format, "%", false), "100");
        // longer than length: never truncated
        assert_eq!(format_number(1234.0, &format, "%", false), "1234");

        let format = fmt(Decimals::Fixed(2), Align::Right, 6);
        assert_eq!(format_number(3.14159, &format, "", false), "  3.14");
    }

    #[test]
    fn test_auto_decimals_fill_length() {
        let format = fmt(Decimals::Auto(AutoDecimals::Auto), Align::Right, 4);
        assert_eq!(format_number(0.123, &format, "", false), "0.12");
        assert_eq!(format_number(9.876, &format, "", false), "9.88");
        assert_eq!(format_number(12.34, &format, "", false), "12.3");
        assert_eq!(format_number(100.0, &format, "", false), " 100");
        assert_eq!(format_number(12345.0, &format, "", false), "12345");
        assert_eq!(format_number(0.0, &format, "", false), "   0");
    }

    #[test]
    fn test_alignment() {
        let left = fmt(Decimals::Fixed(0), Align::Left, 4);
        assert_eq!(format_number(42.0, &left, "", false), "  42");

        let center = fmt(Decimals::Fixed(0), Align::Center, 5);
        assert_eq!(format_number(42.0, &center, "", false), "  42 ");
        assert_eq!(format_number(7.0, &center, "", false), "  7  ");
        let center = fmt(Decimals::Fixed(0), Align::Center, 4);
        assert_eq!(format_number(7.0, &center, "", false), " 7  ");
    }

    #[test]
    fn test_alignment_with_unit() {
        let mut format = fmt(Decimals::Fixed(0), Align::Right, 3);
        format.show_unit = true;
        // right pads the number field only, the unit hangs past it
        assert_eq!(format_number(45.0, &format, "°C", false), "45 °C");
        assert_eq!(format_number(5.0, &format, "%", false), "5 %");

        format.align = Align::Left;
        assert_eq!(format_number(5.0, &format, "%", false), "  5 %");

        format.align = Align::Center;
        assert_eq!(format_number(5.0, &format, "%", false), " 5 % ");
    }

    #[test]
    fn test_unit_with_and_without_space() {
        let mut format = fmt(Decimals::Fixed(0), Align::Right, 3);
        format.show_unit = true;
        assert_eq!(format_number(45.0, &format, "°C", false), "45 °C");

        format.unit_space = false;
        assert_eq!(format_number(45.0, &format, "°C", false), "45°C");

        format.align = Align::Left;
        assert_eq!(format_number(45.0, &format, "°C", false), " 45°C");
    }

    #[test]
    fn test_byte_prefixes() {
        let mut format = fmt(Decimals::Fixed(1), Align::Right, 5);
        format.show_unit = true;
        assert_eq!(format_number(1536.0, &format, "B", true), "1.5 KB");
        assert_eq!(
            format_number(3.0 * 1024.0 * 1024.0 * 1024.0, &format, "B", true),
            "3.0 GB"
        );
        // below 1K there is no prefix
        assert_eq!(format_number(512.0, &format, "B", true), "512.0 B");
    }

    #[test]
    fn test_forced_byte_prefix() {
        let mut format = fmt(Decimals::Fixed(0), Align::Left, 5);
        format.show_unit = true;
        format.unit = Some("M".to_string());
        assert_eq!(
            format_number(8.0 * 1024.0 * 1024.0 * 1024.0, &format, "B", true),
            " 8192 MB"
        );
    }
}
