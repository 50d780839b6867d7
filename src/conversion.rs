//! Funciones de conversión para datos del sensor MPU6050
//!
//! Este módulo proporciona las tablas de sensibilidad y las funciones para
//! convertir datos raw del sensor a unidades físicas: aceleración en G,
//! velocidad angular en grados por segundo y temperatura en grados Celsius.

use crate::types::{AccelData, AccelFullScale, GyroData, GyroFullScale, RawTriple};

/// Sensibilidad del acelerómetro (LSB/g), indexada por código de escala
pub const ACCEL_SENSITIVITY: [f32; 4] = [16384.0, 8192.0, 4096.0, 2048.0];

/// Sensibilidad del giroscopio (LSB/(°/s)), indexada por código de escala
pub const GYRO_SENSITIVITY: [f32; 4] = [131.0, 65.5, 32.8, 16.4];

/// LSB por grado Celsius del sensor de temperatura
pub const TEMP_SENSITIVITY: f32 = 340.0;
/// Desplazamiento de la recta de calibración de temperatura (°C)
pub const TEMP_OFFSET: f32 = 36.53;

impl AccelFullScale {
    /// Sensibilidad en LSB/g para esta escala
    pub fn sensitivity(self) -> f32 {
        ACCEL_SENSITIVITY[self.code() as usize]
    }
}

impl GyroFullScale {
    /// Sensibilidad en LSB/(°/s) para esta escala
    pub fn sensitivity(self) -> f32 {
        GYRO_SENSITIVITY[self.code() as usize]
    }
}

/// Busca la sensibilidad del acelerómetro para un código de escala
///
/// Devuelve `None` si el código está fuera de la tabla.
pub fn accel_sensitivity_for_code(code: u8) -> Option<f32> {
    AccelFullScale::from_code(code).map(AccelFullScale::sensitivity)
}

/// Busca la sensibilidad del giroscopio para un código de escala
pub fn gyro_sensitivity_for_code(code: u8) -> Option<f32> {
    GyroFullScale::from_code(code).map(GyroFullScale::sensitivity)
}

/// Convierte datos brutos de acelerómetro a G
///
/// # Arguments
/// * `raw` - Valores brutos del acelerómetro
/// * `sensitivity` - LSB/g de la escala configurada
pub fn accel_raw_to_g(raw: RawTriple, sensitivity: f32) -> AccelData {
    AccelData {
        x: raw.x as f32 / sensitivity,
        y: raw.y as f32 / sensitivity,
        z: raw.z as f32 / sensitivity,
    }
}

/// Convierte datos brutos de giroscopio a grados/segundo
///
/// # Arguments
/// * `raw` - Valores brutos del giroscopio
/// * `sensitivity` - LSB/(°/s) de la escala configurada
pub fn gyro_raw_to_dps(raw: RawTriple, sensitivity: f32) -> GyroData {
    GyroData {
        x: raw.x as f32 / sensitivity,
        y: raw.y as f32 / sensitivity,
        z: raw.z as f32 / sensitivity,
    }
}

/// Convierte datos brutos de temperatura a grados Celsius
///
/// Temp °C = TEMP_OUT / 340 + 36.53 (datasheet del MPU6050)
pub fn temp_raw_to_celsius(raw: i16) -> f32 {
    raw as f32 / TEMP_SENSITIVITY + TEMP_OFFSET
}
