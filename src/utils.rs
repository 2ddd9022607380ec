//! Unit conversion helpers.

use crate::sdk::device::SensorUnit;

/// Convert Celsius to Fahrenheit.
///
/// # Example
///
/// ```
/// use bluetherm_bridge::celsius_to_fahrenheit;
///
/// let fahrenheit = celsius_to_fahrenheit(100.0);
/// assert!((fahrenheit - 212.0).abs() < 0.001);
/// ```
#[inline]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Convert Fahrenheit to Celsius.
///
/// # Example
///
/// ```
/// use bluetherm_bridge::fahrenheit_to_celsius;
///
/// let celsius = fahrenheit_to_celsius(212.0);
/// assert!((celsius - 100.0).abs() < 0.001);
/// ```
#[inline]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Express a Celsius temperature in a sensor's display unit.
///
/// Returns `None` for units that are not temperatures.
pub fn celsius_in_unit(celsius: f64, unit: SensorUnit) -> Option<f64> {
    match unit {
        SensorUnit::Celsius => Some(celsius),
        SensorUnit::Fahrenheit => Some(celsius_to_fahrenheit(celsius)),
        _ => None,
    }
}
