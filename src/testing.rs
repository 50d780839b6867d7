//! MPU6050 simulado para las pruebas del crate
//!
//! `SimulatedBus` decodifica las transacciones enmarcadas contra un banco de
//! 128 registros y `MockGpio` registra lo que el driver hace con la línea INT.

use core::cell::RefCell;
use core::time::Duration;

use crate::device::Mpu6050;
use crate::interface::{CommandLink, I2cInterface, Transport};
use crate::interrupt::{GpioController, GpioEdge, GpioError, InterruptCallback};
use crate::register::registers;
use crate::WHO_AM_I_VALUE;

const REGISTER_FILE_LEN: usize = 128;

/// Pines del host que admiten interrupción en el mock
pub const MOCK_GPIO_PINS: u8 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimBusError {
    Nack,
    Timeout,
}

/// Dispositivo simulado en el bus
pub struct SimulatedBus {
    address: u8,
    regs: [u8; REGISTER_FILE_LEN],
    submissions: usize,
    writes: Vec<(u8, Vec<u8>)>,
    last_port: Option<u8>,
    last_timeout: Option<Duration>,
    fail_next: Option<SimBusError>,
    fail_at: Option<(usize, SimBusError)>,
}

impl SimulatedBus {
    /// `address` es la dirección de 7 bits a la que responde
    pub fn new(address: u8) -> Self {
        let mut regs = [0u8; REGISTER_FILE_LEN];
        regs[registers::WHO_AM_I as usize] = WHO_AM_I_VALUE;
        Self {
            address,
            regs,
            submissions: 0,
            writes: Vec::new(),
            last_port: None,
            last_timeout: None,
            fail_next: None,
            fail_at: None,
        }
    }

    pub fn reg(&self, reg: u8) -> u8 {
        self.regs[reg as usize]
    }

    pub fn set_reg(&mut self, reg: u8, value: u8) {
        self.regs[reg as usize] = value;
    }

    pub fn set_regs(&mut self, reg: u8, values: &[u8]) {
        let start = reg as usize;
        self.regs[start..start + values.len()].copy_from_slice(values);
    }

    pub fn set_accel_raw(&mut self, x: i16, y: i16, z: i16) {
        self.set_regs(registers::ACCEL_XOUT_H, &triple_bytes(x, y, z));
    }

    pub fn set_gyro_raw(&mut self, x: i16, y: i16, z: i16) {
        self.set_regs(registers::GYRO_XOUT_H, &triple_bytes(x, y, z));
    }

    /// Transacciones enviadas, incluidas las que fallaron
    pub fn submissions(&self) -> usize {
        self.submissions
    }

    /// Escrituras aceptadas: `(registro, datos)`
    pub fn writes(&self) -> &[(u8, Vec<u8>)] {
        &self.writes
    }

    pub fn last_port(&self) -> Option<u8> {
        self.last_port
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        self.last_timeout
    }

    pub fn fail_next_submission(&mut self, error: SimBusError) {
        self.fail_next = Some(error);
    }

    /// Hace fallar la transacción número `n` (contando desde 1)
    pub fn fail_submission_at(&mut self, n: usize, error: SimBusError) {
        self.fail_at = Some((n, error));
    }

    fn register_range(reg: u8, len: usize) -> Result<core::ops::Range<usize>, SimBusError> {
        let start = reg as usize;
        let end = start + len;
        if end > REGISTER_FILE_LEN {
            return Err(SimBusError::Nack);
        }
        Ok(start..end)
    }
}

impl Transport for SimulatedBus {
    type Error = SimBusError;

    fn submit(
        &mut self,
        port: u8,
        link: &CommandLink,
        rx: &mut [u8],
        timeout: Duration,
    ) -> Result<(), Self::Error> {
        self.submissions += 1;
        self.last_port = Some(port);
        self.last_timeout = Some(timeout);

        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        if let Some((n, error)) = self.fail_at {
            if n == self.submissions {
                self.fail_at = None;
                return Err(error);
            }
        }

        if let Some((addr, reg, payload)) = link.as_register_write() {
            if addr >> 1 != self.address {
                return Err(SimBusError::Nack);
            }
            let range = Self::register_range(reg, payload.len())?;
            self.regs[range].copy_from_slice(payload);
            self.writes.push((reg, payload.to_vec()));
            return Ok(());
        }

        if let Some((addr, reg, len)) = link.as_register_read() {
            if addr >> 1 != self.address || rx.len() < len {
                return Err(SimBusError::Nack);
            }
            let range = Self::register_range(reg, len)?;
            rx[..len].copy_from_slice(&self.regs[range]);
            return Ok(());
        }

        Err(SimBusError::Nack)
    }
}

fn triple_bytes(x: i16, y: i16, z: i16) -> [u8; 6] {
    let [xh, xl] = x.to_be_bytes();
    let [yh, yl] = y.to_be_bytes();
    let [zh, zl] = z.to_be_bytes();
    [xh, xl, yh, yl, zh, zl]
}

/// Controlador GPIO simulado
#[derive(Default)]
pub struct MockGpio {
    configured: Vec<(u8, GpioEdge)>,
    enabled: Vec<u8>,
    callbacks: RefCell<Vec<(u8, InterruptCallback)>>,
}

impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pines configurados como entrada, con su flanco
    pub fn configured(&self) -> &[(u8, GpioEdge)] {
        &self.configured
    }

    pub fn enabled(&self) -> &[u8] {
        &self.enabled
    }

    /// Simula un flanco en `pin`: invoca los callbacks asociados
    pub fn fire(&self, pin: u8) {
        if !self.enabled.contains(&pin) {
            return;
        }
        for (callback_pin, callback) in self.callbacks.borrow_mut().iter_mut() {
            if *callback_pin == pin {
                callback();
            }
        }
    }
}

impl GpioController for MockGpio {
    fn is_interrupt_capable(&self, pin: u8) -> bool {
        pin < MOCK_GPIO_PINS
    }

    fn configure_input(&mut self, pin: u8, edge: GpioEdge) -> Result<(), GpioError> {
        if !self.is_interrupt_capable(pin) {
            return Err(GpioError::InvalidPin(pin));
        }
        self.configured.push((pin, edge));
        Ok(())
    }

    fn attach_interrupt(&mut self, pin: u8, callback: InterruptCallback) -> Result<(), GpioError> {
        if !self.configured.iter().any(|(p, _)| *p == pin) {
            return Err(GpioError::IsrInstallFailed);
        }
        self.callbacks.get_mut().push((pin, callback));
        Ok(())
    }

    fn enable_interrupt(&mut self, pin: u8) -> Result<(), GpioError> {
        if !self.callbacks.get_mut().iter().any(|(p, _)| *p == pin) {
            return Err(GpioError::EnableFailed);
        }
        if !self.enabled.contains(&pin) {
            self.enabled.push(pin);
        }
        Ok(())
    }
}

/// MPU6050 simulado en 0x68 con WHO_AM_I = 0x68 y el resto de registros a 0
pub fn sim_device() -> Mpu6050<I2cInterface<SimulatedBus>, MockGpio> {
    let interface = I2cInterface::new(SimulatedBus::new(0x68), 0, 0x68);
    Mpu6050::new(interface, MockGpio::new())
}
