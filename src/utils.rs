// Copyright (c) 2018-2020 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

// Utilidades varias

/// Redondea valor a 2 decimales
pub fn fround2(val: f32) -> f32 {
    (val * 100.0).round() / 100.0
}

/// Redondea valor a 3 decimales
pub fn fround3(val: f32) -> f32 {
    (val * 1000.0).round() / 1000.0
}

/// Days in each calendar month, non-leap year — shared across every
/// component that turns a daily/monthly rate into an annual total.
pub const DAYS_IN_MONTH: [f32; 12] = [31.0, 28.0, 31.0, 30.0, 31.0, 30.0, 31.0, 31.0, 30.0, 31.0, 30.0, 31.0];

/// Normaliza número a un intervalo arbitrario (wrapping)
pub fn normalize(value: f32, start: f32, end: f32) -> f32 {
    // ancho del intervalo
    let width = end - start;
    // convertimos el intervalo a [0, ancho] restando el valor inicial
    let offset = value - start;
    // volvemos a sumar el valor inicial para volver al intervalo [start, end]
    (offset - (f32::floor(offset / width) * width)) + start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding() {
        assert_eq!(fround2(1.23456), 1.23);
        assert_eq!(fround3(1.23456), 1.235);
    }

    #[test]
    fn normalize_wraps() {
        assert_eq!(normalize(370.0, 0.0, 360.0), 10.0);
        assert_eq!(normalize(-10.0, 0.0, 360.0), 350.0);
    }
}
