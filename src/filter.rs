//! Filtro complementario para estimar roll y pitch
//!
//! Combina el ángulo de inclinación que da el acelerómetro (sin deriva pero
//! ruidoso) con la integración de la velocidad angular del giroscopio (poco
//! ruido pero con deriva):
//!
//! ```text
//! angle' = ALPHA * (angle + rate * dt) + (1 - ALPHA) * accel_angle
//! ```
//!
//! El roll integra el eje Y del giroscopio y el pitch el eje X.

use crate::types::{AccelData, GyroData};

/// Peso del giroscopio en la fusión
pub const ALPHA: f32 = 0.99;

/// Factor de conversión de radianes a grados
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Ángulos estimados en grados
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComplementaryAngle {
    pub roll: f32,
    pub pitch: f32,
}

/// Estado del filtro complementario
///
/// Sin inicializar mientras `counter == 0`; a partir de la primera muestra
/// sigue la orientación. Un único escritor debe actualizarlo.
#[derive(Debug, Clone, Default)]
pub struct ComplementaryFilter {
    counter: u32,
    dt: f32,
    last_timestamp_us: u64,
    angle: ComplementaryAngle,
}

impl ComplementaryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de muestras fusionadas
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Intervalo entre las dos últimas muestras, en segundos
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Marca de tiempo de la última muestra (µs)
    pub fn last_timestamp_us(&self) -> u64 {
        self.last_timestamp_us
    }

    /// Última estimación
    pub fn angle(&self) -> ComplementaryAngle {
        self.angle
    }

    pub fn is_tracking(&self) -> bool {
        self.counter > 0
    }

    /// Vuelve al estado sin inicializar
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fusiona una muestra tomada en `now_us` (reloj monótono, µs)
    ///
    /// La primera muestra solo fija la referencia de tiempo y toma los
    /// ángulos del acelerómetro. Las entradas no se validan: un NaN se
    /// propaga a la salida.
    pub fn fuse(&mut self, accel: &AccelData, gyro: &GyroData, now_us: u64) -> ComplementaryAngle {
        self.counter = self.counter.saturating_add(1);
        let (accel_roll, accel_pitch) = accel_angles(accel);

        if self.counter == 1 {
            self.angle = ComplementaryAngle {
                roll: accel_roll,
                pitch: accel_pitch,
            };
            self.last_timestamp_us = now_us;
            log::debug!("Filtro inicializado: {:?}", self.angle);
            return self.angle;
        }

        if now_us < self.last_timestamp_us {
            log::warn!(
                "Marca de tiempo no monótona: {} < {}",
                now_us,
                self.last_timestamp_us
            );
        }
        let elapsed_us = now_us.saturating_sub(self.last_timestamp_us);
        self.dt = (elapsed_us / 1_000_000) as f32 + (elapsed_us % 1_000_000) as f32 / 1_000_000.0;
        self.last_timestamp_us = now_us;

        let gyro_roll = gyro.y * self.dt;
        let gyro_pitch = gyro.x * self.dt;

        self.angle.roll = ALPHA * (self.angle.roll + gyro_roll) + (1.0 - ALPHA) * accel_roll;
        self.angle.pitch = ALPHA * (self.angle.pitch + gyro_pitch) + (1.0 - ALPHA) * accel_pitch;

        self.angle
    }
}

/// Ángulos de inclinación (roll, pitch) en grados a partir del acelerómetro
pub fn accel_angles(accel: &AccelData) -> (f32, f32) {
    (
        accel.y.atan2(accel.z) * RAD_TO_DEG,
        accel.x.atan2(accel.z) * RAD_TO_DEG,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: AccelData = AccelData { x: 0.0, y: 0.0, z: 1.0 };

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_first_sample_uses_accelerometer_only() {
        let mut filter = ComplementaryFilter::new();
        let gyro = GyroData { x: 250.0, y: -120.0, z: 3.0 };

        let angle = filter.fuse(&LEVEL, &gyro, 123_456_789);
        assert_eq!(angle, ComplementaryAngle { roll: 0.0, pitch: 0.0 });
        assert_eq!(filter.counter(), 1);
        assert_eq!(filter.dt(), 0.0);
        assert_eq!(filter.last_timestamp_us(), 123_456_789);
    }

    #[test]
    fn test_second_sample_integrates_and_fuses() {
        let mut filter = ComplementaryFilter::new();
        let g = 20.0;
        let gyro = GyroData { x: g, y: g, z: g };

        filter.fuse(&LEVEL, &gyro, 1_000_000);
        let angle = filter.fuse(&LEVEL, &gyro, 2_000_000);

        assert!(approx(filter.dt(), 1.0));
        assert!(approx(angle.roll, 0.99 * g));
        assert!(approx(angle.pitch, 0.99 * g));
    }

    #[test]
    fn test_roll_follows_y_gyro_and_pitch_follows_x_gyro() {
        let mut filter = ComplementaryFilter::new();
        let gyro = GyroData { x: 4.0, y: 8.0, z: 0.0 };

        filter.fuse(&LEVEL, &gyro, 0);
        let angle = filter.fuse(&LEVEL, &gyro, 500_000);

        assert!(approx(filter.dt(), 0.5));
        assert!(approx(angle.roll, 0.99 * 8.0 * 0.5));
        assert!(approx(angle.pitch, 0.99 * 4.0 * 0.5));
    }

    #[test]
    fn test_accelerometer_corrects_drift() {
        let mut filter = ComplementaryFilter::new();
        let still = GyroData::default();
        let tilted = AccelData { x: 0.0, y: 1.0, z: 1.0 };

        filter.fuse(&LEVEL, &still, 0);
        let mut angle = ComplementaryAngle::default();
        for i in 1..=2000u64 {
            angle = filter.fuse(&tilted, &still, i * 10_000);
        }
        // Converge hacia 45° (1 - 0.99^2000 ≈ 1)
        assert!((angle.roll - 45.0).abs() < 0.01);
        assert!(approx(angle.pitch, 0.0));
    }

    #[test]
    fn test_sub_second_dt_precision() {
        let mut filter = ComplementaryFilter::new();
        filter.fuse(&LEVEL, &GyroData::default(), 3_999_999_000);
        filter.fuse(&LEVEL, &GyroData::default(), 4_000_001_500);
        assert!((filter.dt() - 0.0025).abs() < 1e-7);
    }

    #[test]
    fn test_atan2_sign_conventions() {
        let (roll, pitch) = accel_angles(&AccelData { x: 1.0, y: -1.0, z: 0.0 });
        assert!(approx(roll, -90.0));
        assert!(approx(pitch, 90.0));

        let (roll, pitch) = accel_angles(&AccelData { x: 0.0, y: 0.0, z: -1.0 });
        assert!(approx(roll, 180.0));
        assert!(approx(pitch, 180.0));
    }

    #[test]
    fn test_non_monotonic_clock_gives_zero_dt() {
        let mut filter = ComplementaryFilter::new();
        let gyro = GyroData { x: 100.0, y: 100.0, z: 0.0 };
        filter.fuse(&LEVEL, &gyro, 5_000);
        let angle = filter.fuse(&LEVEL, &gyro, 1_000);
        assert_eq!(filter.dt(), 0.0);
        assert_eq!(angle, ComplementaryAngle { roll: 0.0, pitch: 0.0 });
    }

    #[test]
    fn test_nan_propagates() {
        let mut filter = ComplementaryFilter::new();
        let nan = AccelData { x: f32::NAN, y: 0.0, z: 1.0 };
        let angle = filter.fuse(&nan, &GyroData::default(), 0);
        assert!(angle.pitch.is_nan());
        assert_eq!(angle.roll, 0.0);
    }

    #[test]
    fn test_reset() {
        let mut filter = ComplementaryFilter::new();
        filter.fuse(&LEVEL, &GyroData::default(), 10);
        assert!(filter.is_tracking());
        filter.reset();
        assert!(!filter.is_tracking());
        assert_eq!(filter.counter(), 0);
    }
}
