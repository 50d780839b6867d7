//! Biblioteca Rust para el sensor de movimiento InvenSense MPU6050
//!
//! Esta biblioteca proporciona una interfaz para controlar el sensor MPU6050,
//! un IMU de 6 ejes con giroscopio, acelerómetro y sensor de temperatura,
//! junto con un filtro complementario que estima roll y pitch.
//!
//! # Ejemplo
//!
//! ```ignore
//! use mpu6050_rs::{new_i2c_device, AccelFullScale, GyroFullScale, HalTransport, NoGpio};
//!
//! let transport = HalTransport::new(i2c);
//! let mut imu = new_i2c_device(transport, 0, mpu6050_rs::I2C_ADDRESS_AD0_LOW, NoGpio);
//! imu.configure(AccelFullScale::Fs4G, GyroFullScale::Fs500Dps)?;
//! imu.wake_up()?;
//! let accel = imu.read_accel()?;
//! ```
//!
//! # Features
//!
//! - `std` (por defecto): activa [`SystemTimeSource`] y `std::error::Error`
//!   para [`Mpu6050Error`]. El crate no es `no_std`: las transacciones y los
//!   callbacks usan `Vec` y `Box` con o sin esta feature.
//! - `linux`: añade `new_linux_device` sobre `/dev/i2c-N`.

// Importaciones internas
pub mod base;
pub mod config;
pub mod conversion;
pub mod device;
pub mod filter;
pub mod interface;
pub mod interrupt;
pub mod register;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports públicos
pub use base::{ManualTimeSource, TimeSource};
#[cfg(feature = "std")]
pub use base::SystemTimeSource;
pub use config::Mpu6050Config;
pub use conversion::{accel_raw_to_g, gyro_raw_to_dps, temp_raw_to_celsius};
pub use device::{Mpu6050, Mpu6050Error};
pub use filter::{ComplementaryAngle, ComplementaryFilter};
pub use interface::{
    CommandLink, HalTransport, HalTransportError, I2cInterface, Interface, InterfaceError,
    Transport, DEFAULT_BUS_TIMEOUT,
};
pub use interrupt::{
    GpioController, GpioEdge, GpioError, InterruptCallback, InterruptConfig, InterruptSources,
    InterruptStatus, NoGpio,
};
pub use types::{AccelData, AccelFullScale, GyroData, GyroFullScale, RawTriple};

/// Dirección I2C del MPU6050 con el pin AD0 a nivel bajo
pub const I2C_ADDRESS_AD0_LOW: u8 = 0x68;

/// Dirección I2C del MPU6050 con el pin AD0 a nivel alto
pub const I2C_ADDRESS_AD0_HIGH: u8 = 0x69;

/// Valor esperado del registro WHO_AM_I
pub const WHO_AM_I_VALUE: u8 = 0x68;

/// Crea un nuevo dispositivo MPU6050 sobre un transporte I2C
///
/// `address` es la dirección de 7 bits; se desplaza a su forma en el bus aquí.
pub fn new_i2c_device<T, G>(transport: T, port: u8, address: u8, gpio: G) -> Mpu6050<I2cInterface<T>, G>
where
    T: Transport,
    G: interrupt::GpioController,
{
    let interface = I2cInterface::new(transport, port, address);
    Mpu6050::new(interface, gpio)
}

/// Igual que [`new_i2c_device`] pero aplicando el timeout de bus de `config`
pub fn new_i2c_device_with_config<T, G>(
    transport: T,
    port: u8,
    address: u8,
    gpio: G,
    config: &Mpu6050Config,
) -> Mpu6050<I2cInterface<T>, G>
where
    T: Transport,
    G: interrupt::GpioController,
{
    let interface = I2cInterface::new(transport, port, address).with_timeout(config.bus_timeout);
    Mpu6050::new(interface, gpio)
}

/// Abre `/dev/i2c-<bus>` y crea un dispositivo MPU6050 sin línea de interrupción
#[cfg(feature = "linux")]
pub fn new_linux_device(
    bus: u8,
    address: u8,
) -> Result<
    Mpu6050<I2cInterface<HalTransport<linux_embedded_hal::I2cdev>>, NoGpio>,
    linux_embedded_hal::i2cdev::linux::LinuxI2CError,
> {
    let path = format!("/dev/i2c-{}", bus);
    let i2c = linux_embedded_hal::I2cdev::new(&path)?;
    log::info!("Bus I2C abierto: {}", path);
    Ok(new_i2c_device(HalTransport::new(i2c), bus, address, NoGpio))
}
