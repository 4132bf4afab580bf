//! Numeric and label formatting for the solver input language.

use nalgebra::{Matrix3, Vector3};

/// Round to `precision` decimals, folding negative zero into zero.
pub fn round(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    let scaled = (value * scale).round();
    let rounded = if scaled.is_finite() {
        scaled / scale
    } else {
        value
    };
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Rounded value in plain decimal notation.
pub fn num(value: f64, precision: u32) -> String {
    round(value, precision).to_string()
}

/// Rounded value in exponent notation (tolerances).
pub fn exp(value: f64, precision: u32) -> String {
    let normalized = if value == 0.0 { 0.0 } else { value };
    let digits = format!("{normalized:e}");
    let Some((mantissa, exponent)) = digits.split_once('e') else {
        return digits;
    };
    let (Ok(mantissa), Ok(mut exponent)) = (mantissa.parse::<f64>(), exponent.parse::<i32>())
    else {
        return digits;
    };
    let mut mantissa = round(mantissa, precision);
    if mantissa.abs() >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    }
    format!("{}e{exponent}", num(mantissa, precision))
}

/// Comma-separated rounded components.
pub fn vec3(v: &Vector3<f64>, precision: u32) -> String {
    format!(
        "{}, {}, {}",
        num(v.x, precision),
        num(v.y, precision),
        num(v.z, precision)
    )
}

/// Row-major rows of any square matrix, rows joined by `",\n" + indent`.
pub fn rows<const N: usize>(m: &[[f64; N]; N], precision: u32, indent: &str) -> String {
    m.iter()
        .map(|row| {
            row.iter()
                .map(|v| num(*v, precision))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect::<Vec<_>>()
        .join(&format!(",\n{indent}"))
}

/// Row-major 3x3 matrix.
pub fn mat3(m: &Matrix3<f64>, precision: u32, indent: &str) -> String {
    let mut r = [[0.0; 3]; 3];
    for (i, row) in r.iter_mut().enumerate() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = m[(i, j)];
        }
    }
    rows(&r, precision, indent)
}

/// Solver label: `prefix` followed by the name with every character
/// outside `[A-Za-z0-9]` replaced by `_`.
pub fn label(prefix: &str, name: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + name.len());
    out.push_str(prefix);
    out.extend(
        name.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }),
    );
    out
}

/// Double-quoted string literal.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_negative_rounds_to_plain_zero() {
        assert_eq!(num(-0.0000001, 6), "0");
        assert_eq!(num(-0.0, 6), "0");
        assert!(round(-1e-9, 6).is_sign_positive());
    }

    #[test]
    fn rounding_is_fixed_precision() {
        assert_eq!(num(1.23456789, 6), "1.234568");
        assert_eq!(num(2.0, 6), "2");
        assert_eq!(num(-0.5, 3), "-0.5");
        assert_eq!(num(1.0 / 3.0, 2), "0.33");
    }

    #[test]
    fn exponent_notation() {
        assert_eq!(exp(1e-6, 6), "1e-6");
        assert_eq!(exp(2.5e-9, 6), "2.5e-9");
        assert_eq!(exp(-0.0, 6), "0e0");
        assert_eq!(exp(9.9999999e-7, 6), "1e-6");
        assert_eq!(exp(-9.99999999e3, 6), "-1e4");
    }

    #[test]
    fn vectors_and_matrices() {
        assert_eq!(vec3(&Vector3::new(1.0, -0.0, 0.25), 6), "1, 0, 0.25");
        let m = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        assert_eq!(mat3(&m, 6, "\t\t"), "1, 2, 3,\n\t\t4, 5, 6,\n\t\t7, 8, 9");
    }

    #[test]
    fn labels_are_sanitized() {
        assert_eq!(label("Node_", "Cube.001"), "Node_Cube_001");
        assert_eq!(label("Elem_", "left hinge"), "Elem_left_hinge");
        assert_eq!(quoted(r#"a"b"#), r#""a\"b""#);
    }
}
