//! Configuración del driver y secuencia de arranque

use core::time::Duration;

use crate::device::{Mpu6050, Mpu6050Error};
use crate::interface::{Interface, DEFAULT_BUS_TIMEOUT};
use crate::types::{AccelFullScale, GyroFullScale};

/// Parámetros de arranque del MPU6050
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mpu6050Config {
    /// Escala completa del acelerómetro
    pub accel_range: AccelFullScale,
    /// Escala completa del giroscopio
    pub gyro_range: GyroFullScale,
    /// Timeout de cada transacción de bus
    pub bus_timeout: Duration,
    /// Comprobar WHO_AM_I tras despertar el dispositivo
    pub verify_identity: bool,
}

impl Default for Mpu6050Config {
    fn default() -> Self {
        Self {
            accel_range: AccelFullScale::Fs2G,
            gyro_range: GyroFullScale::Fs250Dps,
            bus_timeout: DEFAULT_BUS_TIMEOUT,
            verify_identity: true,
        }
    }
}

impl Mpu6050Config {
    #[must_use]
    pub fn with_accel_range(mut self, range: AccelFullScale) -> Self {
        self.accel_range = range;
        self
    }

    #[must_use]
    pub fn with_gyro_range(mut self, range: GyroFullScale) -> Self {
        self.gyro_range = range;
        self
    }

    #[must_use]
    pub fn with_bus_timeout(mut self, timeout: Duration) -> Self {
        self.bus_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_verify_identity(mut self, verify: bool) -> Self {
        self.verify_identity = verify;
        self
    }
}

impl<I, G, E> Mpu6050<I, G>
where
    I: Interface<Error = E>,
{
    /// Arranca el dispositivo: escalas, salida de sleep y, si se pide, WHO_AM_I
    ///
    /// El timeout de bus de `config` rige desde la primera transacción.
    pub fn initialize(&mut self, config: &Mpu6050Config) -> Result<(), Mpu6050Error<E>> {
        self.interface.set_timeout(config.bus_timeout);
        self.configure(config.accel_range, config.gyro_range)?;
        self.wake_up()?;

        if config.verify_identity {
            self.verify_device_id()?;
        }

        log::info!(
            "MPU6050 inicializado ({:?}, {:?})",
            config.accel_range,
            config.gyro_range
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::registers;
    use crate::testing::{sim_device, MockGpio, SimulatedBus};

    #[test]
    fn test_default_config() {
        let config = Mpu6050Config::default();
        assert_eq!(config.accel_range, AccelFullScale::Fs2G);
        assert_eq!(config.gyro_range, GyroFullScale::Fs250Dps);
        assert_eq!(config.bus_timeout, Duration::from_secs(1));
        assert!(config.verify_identity);
    }

    #[test]
    fn test_initialize_sequence() {
        let mut dev = sim_device();
        dev.interface_mut().transport_mut().set_reg(registers::PWR_MGMT_1, 0x40);

        let config = Mpu6050Config::default()
            .with_accel_range(AccelFullScale::Fs8G)
            .with_gyro_range(GyroFullScale::Fs2000Dps);
        dev.initialize(&config).unwrap();

        let bus = dev.interface().transport();
        assert_eq!(bus.reg(registers::GYRO_CONFIG), 0x18);
        assert_eq!(bus.reg(registers::ACCEL_CONFIG), 0x10);
        assert_eq!(bus.reg(registers::PWR_MGMT_1), 0x00);
        // configure (1) + wake_up (2) + WHO_AM_I (1)
        assert_eq!(bus.submissions(), 4);
    }

    #[test]
    fn test_initialize_reports_wrong_identity() {
        let mut dev = sim_device();
        dev.interface_mut().transport_mut().set_reg(registers::WHO_AM_I, 0x98);

        let result = dev.initialize(&Mpu6050Config::default());
        assert_eq!(result, Err(Mpu6050Error::DeviceMismatch(0x98)));

        // Sin verificación no se lee WHO_AM_I
        let config = Mpu6050Config::default().with_verify_identity(false);
        assert!(dev.initialize(&config).is_ok());
    }

    #[test]
    fn test_initialize_applies_bus_timeout() {
        let mut dev = crate::new_i2c_device(SimulatedBus::new(0x68), 0, 0x68, MockGpio::new());
        assert_eq!(dev.interface().timeout(), DEFAULT_BUS_TIMEOUT);

        let config = Mpu6050Config::default().with_bus_timeout(Duration::from_millis(20));
        dev.initialize(&config).unwrap();

        assert_eq!(dev.interface().timeout(), Duration::from_millis(20));
        assert_eq!(dev.interface().transport().last_timeout(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_bus_timeout_reaches_transport() {
        let config = Mpu6050Config::default().with_bus_timeout(Duration::from_millis(20));
        let mut dev = crate::new_i2c_device_with_config(
            SimulatedBus::new(0x68),
            2,
            crate::I2C_ADDRESS_AD0_LOW,
            MockGpio::new(),
            &config,
        );
        dev.get_device_id().unwrap();

        assert_eq!(dev.interface().timeout(), Duration::from_millis(20));
        assert_eq!(dev.interface().transport().last_timeout(), Some(Duration::from_millis(20)));
        assert_eq!(dev.interface().transport().last_port(), Some(2));
    }
}
