//! Capa de transacciones de bus para el MPU6050
//!
//! Cada lectura o escritura de registro se traduce en una única transacción
//! I2C que se envía de forma atómica al transporte:
//!
//! - escritura: `START, ADDR|W, REG, DATA..., STOP`
//! - lectura: `START, ADDR|W, REG, START, ADDR|R, DATA... (NACK en el último), STOP`

use core::fmt;
use core::time::Duration;
use embedded_hal::blocking::i2c;

/// Timeout por defecto de cada transacción
pub const DEFAULT_BUS_TIMEOUT: Duration = Duration::from_millis(1000);

/// Bit R/W para escritura
pub const I2C_MASTER_WRITE: u8 = 0x00;
/// Bit R/W para lectura
pub const I2C_MASTER_READ: u8 = 0x01;

/// Política de ACK para los bytes leídos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAck {
    /// ACK en todos los bytes
    Ack,
    /// ACK en todos menos en el último, que recibe NACK
    LastNack,
}

/// Operación elemental dentro de una transacción
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    /// Condición de START (o START repetido)
    Start,
    /// Escribe un byte (dirección o registro)
    WriteByte { byte: u8, ack_check: bool },
    /// Escribe un bloque de datos
    Write { bytes: Vec<u8>, ack_check: bool },
    /// Lee `len` bytes
    Read { len: usize, ack: ReadAck },
    /// Condición de STOP
    Stop,
}

/// Secuencia de operaciones que el transporte ejecuta como una sola transacción
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLink {
    ops: Vec<BusOp>,
}

impl CommandLink {
    /// Crea una transacción vacía
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn start(&mut self) -> &mut Self {
        self.ops.push(BusOp::Start);
        self
    }

    pub fn write_byte(&mut self, byte: u8, ack_check: bool) -> &mut Self {
        self.ops.push(BusOp::WriteByte { byte, ack_check });
        self
    }

    pub fn write(&mut self, bytes: &[u8], ack_check: bool) -> &mut Self {
        self.ops.push(BusOp::Write {
            bytes: bytes.to_vec(),
            ack_check,
        });
        self
    }

    pub fn read(&mut self, len: usize, ack: ReadAck) -> &mut Self {
        self.ops.push(BusOp::Read { len, ack });
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.ops.push(BusOp::Stop);
        self
    }

    /// Operaciones en orden de ejecución
    pub fn ops(&self) -> &[BusOp] {
        &self.ops
    }

    /// Número total de bytes que la transacción va a leer
    pub fn read_len(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                BusOp::Read { len, .. } => *len,
                _ => 0,
            })
            .sum()
    }

    /// Construye la escritura de `payload` a partir del registro `reg`
    ///
    /// `addr` es la dirección ya desplazada (forma en el bus, bit R/W a 0).
    pub fn register_write(addr: u8, reg: u8, payload: &[u8]) -> Self {
        debug_assert_eq!(addr & 0x01, 0, "la dirección en el bus debe tener el bit R/W libre");
        let mut link = Self::new();
        link.start()
            .write_byte(addr | I2C_MASTER_WRITE, true)
            .write_byte(reg, true)
            .write(payload, true)
            .stop();
        link
    }

    /// Construye la lectura de `len` bytes a partir del registro `reg`
    pub fn register_read(addr: u8, reg: u8, len: usize) -> Self {
        debug_assert_eq!(addr & 0x01, 0, "la dirección en el bus debe tener el bit R/W libre");
        let mut link = Self::new();
        link.start()
            .write_byte(addr | I2C_MASTER_WRITE, true)
            .write_byte(reg, true)
            .start()
            .write_byte(addr | I2C_MASTER_READ, true)
            .read(len, ReadAck::LastNack)
            .stop();
        link
    }

    /// Reconoce una escritura de registro: `(dirección en el bus, registro, datos)`
    pub fn as_register_write(&self) -> Option<(u8, u8, &[u8])> {
        match self.ops.as_slice() {
            [BusOp::Start, BusOp::WriteByte { byte: addr, .. }, BusOp::WriteByte { byte: reg, .. }, BusOp::Write { bytes, .. }, BusOp::Stop]
                if addr & 0x01 == I2C_MASTER_WRITE =>
            {
                Some((*addr, *reg, bytes.as_slice()))
            }
            _ => None,
        }
    }

    /// Reconoce una lectura de registro: `(dirección en el bus, registro, longitud)`
    pub fn as_register_read(&self) -> Option<(u8, u8, usize)> {
        match self.ops.as_slice() {
            [BusOp::Start, BusOp::WriteByte { byte: waddr, .. }, BusOp::WriteByte { byte: reg, .. }, BusOp::Start, BusOp::WriteByte { byte: raddr, .. }, BusOp::Read { len, ack: ReadAck::LastNack }, BusOp::Stop]
                if waddr & 0x01 == I2C_MASTER_WRITE && *raddr == (*waddr | I2C_MASTER_READ) =>
            {
                Some((*waddr, *reg, *len))
            }
            _ => None,
        }
    }
}

/// Ejecutor de transacciones del bus
///
/// `submit` ejecuta `link` de forma atómica en el bus `port`, deja los bytes
/// leídos en `rx` y no debe bloquear más allá de `timeout`.
pub trait Transport {
    /// Estado de error que devuelve el transporte
    type Error: fmt::Debug;

    fn submit(
        &mut self,
        port: u8,
        link: &CommandLink,
        rx: &mut [u8],
        timeout: Duration,
    ) -> Result<(), Self::Error>;
}

/// Error del adaptador `embedded-hal`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HalTransportError<E> {
    /// Error del periférico I2C
    I2c(E),
    /// Transacción que no corresponde a una lectura o escritura de registro
    Framing,
}

/// Transporte sobre cualquier periférico I2C bloqueante de `embedded-hal`
///
/// El timeout lo impone el propio periférico; aquí no se aplica.
pub struct HalTransport<I2C> {
    i2c: I2C,
}

impl<I2C> HalTransport<I2C> {
    /// Crea un nuevo transporte
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Consume el transporte y devuelve el periférico I2C
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Transport for HalTransport<I2C>
where
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
    E: fmt::Debug,
{
    type Error = HalTransportError<E>;

    fn submit(
        &mut self,
        _port: u8,
        link: &CommandLink,
        rx: &mut [u8],
        _timeout: Duration,
    ) -> Result<(), Self::Error> {
        if let Some((addr, reg, payload)) = link.as_register_write() {
            let mut buffer = Vec::with_capacity(payload.len() + 1);
            buffer.push(reg);
            buffer.extend_from_slice(payload);
            return self
                .i2c
                .write(addr >> 1, &buffer)
                .map_err(HalTransportError::I2c);
        }

        if let Some((addr, reg, len)) = link.as_register_read() {
            if rx.len() < len {
                return Err(HalTransportError::Framing);
            }
            return self
                .i2c
                .write_read(addr >> 1, &[reg], &mut rx[..len])
                .map_err(HalTransportError::I2c);
        }

        Err(HalTransportError::Framing)
    }
}

/// Error genérico para interfaces de comunicación
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceError<E> {
    /// El transporte no pudo completar la transacción (NACK, timeout...)
    Bus(E),
    /// Parámetro inválido
    InvalidParameter,
}

impl<E: fmt::Debug> fmt::Display for InterfaceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceError::Bus(e) => write!(f, "bus transaction failed: {:?}", e),
            InterfaceError::InvalidParameter => write!(f, "invalid bus parameter"),
        }
    }
}

/// Trait para abstraer la comunicación con el dispositivo MPU6050
pub trait Interface {
    /// Tipo de error que puede producir la interfaz
    type Error;

    /// Escribe `data` a partir del registro `reg`
    fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Lee `data.len()` bytes a partir del registro `reg`
    fn read_reg(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Cambia el timeout de las transacciones siguientes
    ///
    /// Las interfaces sin timeout propio lo ignoran.
    fn set_timeout(&mut self, _timeout: Duration) {}
}

/// Implementación de Interface para I2C
pub struct I2cInterface<T> {
    transport: T,
    port: u8,
    addr: u8,
    timeout: Duration,
}

impl<T> I2cInterface<T> {
    /// Crea una nueva interfaz I2C
    ///
    /// `address` es la dirección de 7 bits; se guarda ya desplazada.
    pub fn new(transport: T, port: u8, address: u8) -> Self {
        Self {
            transport,
            port,
            addr: address << 1,
            timeout: DEFAULT_BUS_TIMEOUT,
        }
    }

    /// Cambia el timeout de cada transacción
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Dirección en el bus (7 bits desplazados una posición)
    pub fn address(&self) -> u8 {
        self.addr
    }

    pub fn port(&self) -> u8 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume la interfaz y devuelve el transporte subyacente
    pub fn release(self) -> T {
        self.transport
    }
}

impl<T: Transport> Interface for I2cInterface<T> {
    type Error = InterfaceError<T::Error>;

    fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        let link = CommandLink::register_write(self.addr, reg, data);
        log::debug!("I2C{} W 0x{:02X} <- {:02X?}", self.port, reg, data);
        self.transport
            .submit(self.port, &link, &mut [], self.timeout)
            .map_err(InterfaceError::Bus)
    }

    fn read_reg(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        if data.is_empty() {
            return Err(InterfaceError::InvalidParameter);
        }

        let link = CommandLink::register_read(self.addr, reg, data.len());
        self.transport
            .submit(self.port, &link, data, self.timeout)
            .map_err(InterfaceError::Bus)?;
        log::debug!("I2C{} R 0x{:02X} -> {:02X?}", self.port, reg, data);
        Ok(())
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}
