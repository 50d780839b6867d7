//! Configuración de interrupciones y decodificación de estado
//!
//! El MPU6050 tiene un único pin INT. El driver programa su polaridad, modo,
//! latch y política de borrado en INT_PIN_CFG, configura la línea GPIO del
//! host con el flanco correspondiente y habilita fuentes en INT_ENABLE.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! let config = InterruptConfig::new(4)
//!     .with_active_level(InterruptActiveLevel::ActiveLow)
//!     .with_latch(InterruptLatch::LatchUntilCleared);
//! imu.configure_interrupts(&config)?;
//!
//! let ready = Arc::new(AtomicBool::new(false));
//! let flag = ready.clone();
//! imu.register_isr(Box::new(move || flag.store(true, Ordering::Release)))?;
//! imu.enable_interrupts(InterruptSources::DATA_READY)?;
//! ```

use bitflags::bitflags;

use crate::device::{Mpu6050, Mpu6050Error};
use crate::interface::Interface;
use crate::register::registers;
use crate::types::bits;

/// Nivel activo del pin INT
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InterruptActiveLevel {
    #[default]
    ActiveHigh,
    ActiveLow,
}

/// Modo eléctrico del pin INT
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InterruptPinMode {
    #[default]
    PushPull,
    OpenDrain,
}

/// Duración del pulso de interrupción
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InterruptLatch {
    /// Pulso de 50 µs
    #[default]
    Pulse,
    /// Se mantiene hasta que se borra el estado
    LatchUntilCleared,
}

/// Cuándo se borra el estado de interrupción
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InterruptClearBehavior {
    /// Solo al leer INT_STATUS
    #[default]
    OnStatusRead,
    /// Con cualquier lectura de registro
    OnAnyRead,
}

/// Configuración del pin de interrupción
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptConfig {
    /// Pin GPIO del host conectado a INT
    pub interrupt_pin: u8,
    pub active_level: InterruptActiveLevel,
    pub pin_mode: InterruptPinMode,
    pub interrupt_latch: InterruptLatch,
    pub interrupt_clear_behavior: InterruptClearBehavior,
}

impl InterruptConfig {
    /// Configuración por defecto (activo alto, push-pull, pulso, borrado al leer estado)
    pub const fn new(interrupt_pin: u8) -> Self {
        Self {
            interrupt_pin,
            active_level: InterruptActiveLevel::ActiveHigh,
            pin_mode: InterruptPinMode::PushPull,
            interrupt_latch: InterruptLatch::Pulse,
            interrupt_clear_behavior: InterruptClearBehavior::OnStatusRead,
        }
    }

    #[must_use]
    pub const fn with_active_level(mut self, level: InterruptActiveLevel) -> Self {
        self.active_level = level;
        self
    }

    #[must_use]
    pub const fn with_pin_mode(mut self, mode: InterruptPinMode) -> Self {
        self.pin_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_latch(mut self, latch: InterruptLatch) -> Self {
        self.interrupt_latch = latch;
        self
    }

    #[must_use]
    pub const fn with_clear_behavior(mut self, clear: InterruptClearBehavior) -> Self {
        self.interrupt_clear_behavior = clear;
        self
    }

    /// Bits [7:4] de INT_PIN_CFG para esta configuración
    pub const fn pin_cfg_bits(&self) -> u8 {
        let mut value = 0u8;
        if matches!(self.active_level, InterruptActiveLevel::ActiveLow) {
            value |= bits::INT_LEVEL;
        }
        if matches!(self.pin_mode, InterruptPinMode::OpenDrain) {
            value |= bits::INT_OPEN;
        }
        if matches!(self.interrupt_latch, InterruptLatch::LatchUntilCleared) {
            value |= bits::LATCH_INT_EN;
        }
        if matches!(self.interrupt_clear_behavior, InterruptClearBehavior::OnAnyRead) {
            value |= bits::INT_RD_CLEAR;
        }
        value
    }

    /// Flanco que debe detectar el GPIO del host
    pub const fn gpio_edge(&self) -> GpioEdge {
        match self.active_level {
            InterruptActiveLevel::ActiveLow => GpioEdge::NegativeEdge,
            InterruptActiveLevel::ActiveHigh => GpioEdge::PositiveEdge,
        }
    }
}

bitflags! {
    /// Fuentes de interrupción (INT_ENABLE / INT_STATUS)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InterruptSources: u8 {
        const DATA_READY = bits::DATA_RDY_INT;
        const I2C_MASTER = bits::I2C_MST_INT;
        const FIFO_OVERFLOW = bits::FIFO_OFLOW_INT;
        const MOTION_DETECT = bits::MOT_INT;
        const ALL = Self::DATA_READY.bits()
            | Self::I2C_MASTER.bits()
            | Self::FIFO_OVERFLOW.bits()
            | Self::MOTION_DETECT.bits();
    }
}

/// Contenido de INT_STATUS
///
/// Las consultas son puras y no reservan memoria, así que pueden usarse
/// desde el contexto de la ISR.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InterruptStatus(u8);

impl InterruptStatus {
    pub const fn from_bits(status: u8) -> Self {
        Self(status)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn is_data_ready(&self) -> bool {
        is_data_ready_interrupt(self.0)
    }

    pub const fn is_i2c_master(&self) -> bool {
        is_i2c_master_interrupt(self.0)
    }

    pub const fn is_fifo_overflow(&self) -> bool {
        is_fifo_overflow_interrupt(self.0)
    }

    pub const fn is_motion_detect(&self) -> bool {
        is_motion_detect_interrupt(self.0)
    }

    /// Fuentes conocidas presentes en el estado
    pub const fn sources(&self) -> InterruptSources {
        InterruptSources::from_bits_truncate(self.0)
    }
}

pub const fn is_data_ready_interrupt(status: u8) -> bool {
    status & bits::DATA_RDY_INT == bits::DATA_RDY_INT
}

pub const fn is_i2c_master_interrupt(status: u8) -> bool {
    status & bits::I2C_MST_INT == bits::I2C_MST_INT
}

pub const fn is_fifo_overflow_interrupt(status: u8) -> bool {
    status & bits::FIFO_OFLOW_INT == bits::FIFO_OFLOW_INT
}

pub const fn is_motion_detect_interrupt(status: u8) -> bool {
    status & bits::MOT_INT == bits::MOT_INT
}

/// Flanco de la interrupción GPIO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioEdge {
    PositiveEdge,
    NegativeEdge,
}

/// Errores del controlador GPIO del host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// El pin no existe o no admite interrupciones
    InvalidPin(u8),
    /// No se pudo configurar el pin como entrada
    ConfigFailed,
    /// No se pudo instalar el manejador
    IsrInstallFailed,
    /// No se pudo habilitar la interrupción
    EnableFailed,
}

/// Callback invocado en el contexto de interrupción del GPIO
///
/// Corre de forma concurrente con la tarea principal: comparte datos con ella
/// solo mediante atómicos o cerrojos.
pub type InterruptCallback = Box<dyn FnMut() + Send + 'static>;

/// Controlador GPIO del host para la línea INT
pub trait GpioController {
    /// Indica si `pin` existe y puede generar interrupciones
    fn is_interrupt_capable(&self, pin: u8) -> bool;

    /// Configura `pin` como entrada con interrupción en `edge`
    fn configure_input(&mut self, pin: u8, edge: GpioEdge) -> Result<(), GpioError>;

    /// Asocia `callback` a la interrupción de `pin`
    fn attach_interrupt(&mut self, pin: u8, callback: InterruptCallback) -> Result<(), GpioError>;

    /// Habilita la interrupción de `pin`
    fn enable_interrupt(&mut self, pin: u8) -> Result<(), GpioError>;
}

/// Controlador para montajes sin línea de interrupción (solo sondeo)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoGpio;

impl GpioController for NoGpio {
    fn is_interrupt_capable(&self, _pin: u8) -> bool {
        false
    }

    fn configure_input(&mut self, pin: u8, _edge: GpioEdge) -> Result<(), GpioError> {
        Err(GpioError::InvalidPin(pin))
    }

    fn attach_interrupt(&mut self, pin: u8, _callback: InterruptCallback) -> Result<(), GpioError> {
        Err(GpioError::InvalidPin(pin))
    }

    fn enable_interrupt(&mut self, pin: u8) -> Result<(), GpioError> {
        Err(GpioError::InvalidPin(pin))
    }
}

impl<I, G, E> Mpu6050<I, G>
where
    I: Interface<Error = E>,
    G: GpioController,
{
    /// Configura el pin INT del dispositivo y la línea GPIO del host
    ///
    /// Si el pin del host no admite interrupciones falla con
    /// `InvalidArgument` sin tocar el bus.
    pub fn configure_interrupts(&mut self, config: &InterruptConfig) -> Result<(), Mpu6050Error<E>> {
        if !self.gpio.is_interrupt_capable(config.interrupt_pin) {
            log::warn!("GPIO {} no admite interrupciones", config.interrupt_pin);
            return Err(Mpu6050Error::InvalidArgument);
        }
        self.int_pin = Some(config.interrupt_pin);

        let mut int_pin_cfg = self.read_reg(registers::INT_PIN_CFG)?;
        int_pin_cfg &= !bits::INT_PIN_CFG_MASK;
        int_pin_cfg |= config.pin_cfg_bits();
        self.write_reg(registers::INT_PIN_CFG, int_pin_cfg)?;

        self.gpio.configure_input(config.interrupt_pin, config.gpio_edge())?;

        log::info!(
            "Interrupción configurada en GPIO {} ({:?}, INT_PIN_CFG=0x{:02X})",
            config.interrupt_pin,
            config.gpio_edge(),
            int_pin_cfg
        );
        Ok(())
    }

    /// Asocia `callback` a la línea INT configurada y la habilita
    pub fn register_isr(&mut self, callback: InterruptCallback) -> Result<(), Mpu6050Error<E>> {
        let pin = self.int_pin.ok_or(Mpu6050Error::InterruptPinNotConfigured)?;
        self.gpio.attach_interrupt(pin, callback)?;
        self.gpio.enable_interrupt(pin)?;
        Ok(())
    }

    /// Habilita las fuentes indicadas; no escribe si ya estaban habilitadas
    pub fn enable_interrupts(&mut self, sources: InterruptSources) -> Result<(), Mpu6050Error<E>> {
        let enabled = self.read_reg(registers::INT_ENABLE)?;
        let desired = enabled | sources.bits();

        if desired != enabled {
            self.write_reg(registers::INT_ENABLE, desired)?;
        }
        Ok(())
    }

    /// Deshabilita las fuentes indicadas; no escribe si ya estaban deshabilitadas
    pub fn disable_interrupts(&mut self, sources: InterruptSources) -> Result<(), Mpu6050Error<E>> {
        let enabled = self.read_reg(registers::INT_ENABLE)?;
        let desired = enabled & !sources.bits();

        if desired != enabled {
            self.write_reg(registers::INT_ENABLE, desired)?;
        }
        Ok(())
    }

    /// Lee INT_STATUS
    pub fn get_interrupt_status(&mut self) -> Result<InterruptStatus, Mpu6050Error<E>> {
        let status = self.read_reg(registers::INT_STATUS)?;
        Ok(InterruptStatus::from_bits(status))
    }
}
