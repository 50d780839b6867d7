use core::fmt;

use crate::base::TimeSource;
use crate::conversion::{
    accel_raw_to_g, accel_sensitivity_for_code, gyro_raw_to_dps, gyro_sensitivity_for_code,
    temp_raw_to_celsius,
};
use crate::filter::{ComplementaryAngle, ComplementaryFilter};
use crate::interface::Interface;
use crate::interrupt::GpioError;
use crate::register::registers;
use crate::types::{bits, fs_sel_code, AccelData, AccelFullScale, GyroData, GyroFullScale, RawTriple};
use crate::WHO_AM_I_VALUE;

/// Handle del dispositivo MPU6050
///
/// Es propietario de la interfaz de bus, del controlador GPIO de la línea de
/// interrupción y del estado del filtro complementario. No hace ningún
/// bloqueo interno: si varias tareas comparten el handle deben serializar el
/// acceso desde fuera.
pub struct Mpu6050<I, G> {
    pub(crate) interface: I,
    pub(crate) gpio: G,
    pub(crate) int_pin: Option<u8>,
    pub(crate) filter: ComplementaryFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mpu6050Error<E> {
    /// La transacción de bus falló o expiró; recuperable
    Bus(E),
    /// Argumento inválido, detectado antes de cualquier acceso al bus
    InvalidArgument,
    /// WHO_AM_I leído correctamente pero con un valor inesperado
    DeviceMismatch(u8),
    /// Código de escala fuera de la tabla de sensibilidades
    UnknownFullScale(u8),
    /// Se pidió registrar una ISR sin haber configurado el pin de interrupción
    InterruptPinNotConfigured,
    /// Error del controlador GPIO
    Gpio(GpioError),
}

impl<E: fmt::Debug> fmt::Display for Mpu6050Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mpu6050Error::Bus(e) => write!(f, "bus error: {:?}", e),
            Mpu6050Error::InvalidArgument => write!(f, "invalid argument"),
            Mpu6050Error::DeviceMismatch(id) => {
                write!(f, "unexpected WHO_AM_I 0x{:02X} (expected 0x{:02X})", id, WHO_AM_I_VALUE)
            }
            Mpu6050Error::UnknownFullScale(code) => write!(f, "unknown full-scale code {}", code),
            Mpu6050Error::InterruptPinNotConfigured => write!(f, "interrupt pin not configured"),
            Mpu6050Error::Gpio(e) => write!(f, "gpio error: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Mpu6050Error<E> {}

impl<E> From<GpioError> for Mpu6050Error<E> {
    fn from(error: GpioError) -> Self {
        Mpu6050Error::Gpio(error)
    }
}

impl<I, G> Mpu6050<I, G> {
    /// Create a new instance of Mpu6050
    pub fn new(interface: I, gpio: G) -> Self {
        Self {
            interface,
            gpio,
            int_pin: None,
            filter: ComplementaryFilter::new(),
        }
    }

    /// Consume el handle y devuelve la interfaz y el controlador GPIO
    pub fn release(self) -> (I, G) {
        (self.interface, self.gpio)
    }

    pub fn interface(&self) -> &I {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    /// Pin del host configurado para la interrupción, si lo hay
    pub fn int_pin(&self) -> Option<u8> {
        self.int_pin
    }

    /// Estado del filtro complementario
    pub fn filter(&self) -> &ComplementaryFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut ComplementaryFilter {
        &mut self.filter
    }

    /// Fusiona una muestra de acelerómetro y giroscopio usando `time` como reloj
    ///
    /// El primer llamado inicializa el filtro con los ángulos del acelerómetro.
    pub fn complimentary_filter<S: TimeSource>(
        &mut self,
        accel: &AccelData,
        gyro: &GyroData,
        time: &S,
    ) -> ComplementaryAngle {
        self.filter.fuse(accel, gyro, time.get_timestamp_us())
    }
}

impl<I, G, E> Mpu6050<I, G>
where
    I: Interface<Error = E>,
{
    /// Lee un registro
    pub fn read_reg(&mut self, reg: u8) -> Result<u8, Mpu6050Error<E>> {
        let mut data = [0u8];
        self.interface.read_reg(reg, &mut data).map_err(Mpu6050Error::Bus)?;
        Ok(data[0])
    }

    /// Lee varios registros consecutivos en una sola transacción
    pub fn read_regs(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Mpu6050Error<E>> {
        if data.is_empty() {
            return Err(Mpu6050Error::InvalidArgument);
        }
        self.interface.read_reg(reg, data).map_err(Mpu6050Error::Bus)
    }

    /// Escribe un registro
    pub fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Mpu6050Error<E>> {
        self.interface.write_reg(reg, &[value]).map_err(Mpu6050Error::Bus)
    }

    /// Escribe varios registros consecutivos en una sola transacción
    pub fn write_regs(&mut self, reg: u8, values: &[u8]) -> Result<(), Mpu6050Error<E>> {
        self.interface.write_reg(reg, values).map_err(Mpu6050Error::Bus)
    }

    /// Método genérico para modificar bits específicos de un registro
    pub fn modify_reg<F>(&mut self, reg: u8, f: F) -> Result<(), Mpu6050Error<E>>
    where
        F: FnOnce(u8) -> u8,
    {
        // Leer el valor actual
        let value = self.read_reg(reg)?;

        // Aplicar la modificación
        let new_value = f(value);

        // Escribir el nuevo valor
        self.write_reg(reg, new_value)
    }

    /// Get device ID (WHO_AM_I register)
    pub fn get_device_id(&mut self) -> Result<u8, Mpu6050Error<E>> {
        self.read_reg(registers::WHO_AM_I)
    }

    /// Comprueba que WHO_AM_I coincide con el valor del MPU6050
    pub fn verify_device_id(&mut self) -> Result<(), Mpu6050Error<E>> {
        let id = self.get_device_id()?;
        if id != WHO_AM_I_VALUE {
            log::warn!("WHO_AM_I inesperado: 0x{:02X}", id);
            return Err(Mpu6050Error::DeviceMismatch(id));
        }
        Ok(())
    }

    /// Despierta el dispositivo (borra el bit SLEEP de PWR_MGMT_1)
    pub fn wake_up(&mut self) -> Result<(), Mpu6050Error<E>> {
        self.set_sleep(false)
    }

    /// Pone el dispositivo en modo sleep
    pub fn sleep(&mut self) -> Result<(), Mpu6050Error<E>> {
        self.set_sleep(true)
    }

    /// Enable or disable the Sleep mode
    pub fn set_sleep(&mut self, sleep: bool) -> Result<(), Mpu6050Error<E>> {
        if sleep {
            self.modify_reg(registers::PWR_MGMT_1, |x| x | bits::SLEEP)
        } else {
            self.modify_reg(registers::PWR_MGMT_1, |x| x & !bits::SLEEP)
        }
    }

    /// Configura las escalas de acelerómetro y giroscopio
    ///
    /// GYRO_CONFIG y ACCEL_CONFIG son consecutivos, así que ambos se escriben
    /// en una sola transacción de dos bytes.
    pub fn configure(
        &mut self,
        accel_fs: AccelFullScale,
        gyro_fs: GyroFullScale,
    ) -> Result<(), Mpu6050Error<E>> {
        let config_regs = [gyro_fs.register_value(), accel_fs.register_value()];
        self.write_regs(registers::GYRO_CONFIG, &config_regs)?;
        log::debug!("Escalas configuradas: {:?}, {:?}", accel_fs, gyro_fs);
        Ok(())
    }

    /// Obtiene la escala completa del acelerómetro leída del dispositivo
    pub fn accel_full_scale(&mut self) -> Result<AccelFullScale, Mpu6050Error<E>> {
        let code = fs_sel_code(self.read_reg(registers::ACCEL_CONFIG)?);
        AccelFullScale::from_code(code).ok_or(Mpu6050Error::UnknownFullScale(code))
    }

    /// Obtiene la escala completa del giroscopio leída del dispositivo
    pub fn gyro_full_scale(&mut self) -> Result<GyroFullScale, Mpu6050Error<E>> {
        let code = fs_sel_code(self.read_reg(registers::GYRO_CONFIG)?);
        GyroFullScale::from_code(code).ok_or(Mpu6050Error::UnknownFullScale(code))
    }

    /// Sensibilidad del acelerómetro (LSB/g), siempre releída del dispositivo
    pub fn get_accel_sensitivity(&mut self) -> Result<f32, Mpu6050Error<E>> {
        let code = fs_sel_code(self.read_reg(registers::ACCEL_CONFIG)?);
        accel_sensitivity_for_code(code).ok_or(Mpu6050Error::UnknownFullScale(code))
    }

    /// Sensibilidad del giroscopio (LSB/(°/s)), siempre releída del dispositivo
    pub fn get_gyro_sensitivity(&mut self) -> Result<f32, Mpu6050Error<E>> {
        let code = fs_sel_code(self.read_reg(registers::GYRO_CONFIG)?);
        gyro_sensitivity_for_code(code).ok_or(Mpu6050Error::UnknownFullScale(code))
    }

    /// Read accelerometer data from hardware registers
    pub fn read_raw_accel(&mut self) -> Result<RawTriple, Mpu6050Error<E>> {
        let mut accel_data = [0u8; 6];
        self.read_regs(registers::ACCEL_XOUT_H, &mut accel_data)?;
        Ok(RawTriple::from_be_bytes(&accel_data))
    }

    /// Read gyroscope data from hardware registers
    pub fn read_raw_gyro(&mut self) -> Result<RawTriple, Mpu6050Error<E>> {
        let mut gyro_data = [0u8; 6];
        self.read_regs(registers::GYRO_XOUT_H, &mut gyro_data)?;
        Ok(RawTriple::from_be_bytes(&gyro_data))
    }

    /// Leer los datos de temperatura sin procesar
    pub fn read_temperature_raw(&mut self) -> Result<i16, Mpu6050Error<E>> {
        let mut buffer = [0u8; 2];
        self.read_regs(registers::TEMP_OUT_H, &mut buffer)?;
        Ok(i16::from_be_bytes(buffer))
    }

    /// Lee el acelerómetro y lo devuelve en G
    ///
    /// La sensibilidad se vuelve a leer del dispositivo en cada llamada: dos
    /// transacciones por muestra.
    pub fn read_accel(&mut self) -> Result<AccelData, Mpu6050Error<E>> {
        let sensitivity = self.get_accel_sensitivity()?;
        let raw = self.read_raw_accel()?;
        Ok(accel_raw_to_g(raw, sensitivity))
    }

    /// Lee el giroscopio y lo devuelve en grados/segundo
    pub fn read_gyro(&mut self) -> Result<GyroData, Mpu6050Error<E>> {
        let sensitivity = self.get_gyro_sensitivity()?;
        let raw = self.read_raw_gyro()?;
        Ok(gyro_raw_to_dps(raw, sensitivity))
    }

    /// Lee el valor raw de temperatura y lo convierte a grados Celsius
    pub fn read_temperature(&mut self) -> Result<f32, Mpu6050Error<E>> {
        let raw_temp = self.read_temperature_raw()?;
        Ok(temp_raw_to_celsius(raw_temp))
    }
}
