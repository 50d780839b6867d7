//! Definiciones de tipos y constantes comunes para el MPU6050

/// Escalas completas disponibles para el giroscopio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum GyroFullScale {
    /// ±250 dps
    #[default]
    Fs250Dps = 0,
    /// ±500 dps
    Fs500Dps = 1,
    /// ±1000 dps
    Fs1000Dps = 2,
    /// ±2000 dps
    Fs2000Dps = 3,
}

impl GyroFullScale {
    /// Código de 2 bits tal como se coloca en GYRO_CONFIG[4:3]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodifica el código de 2 bits leído del registro
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(GyroFullScale::Fs250Dps),
            1 => Some(GyroFullScale::Fs500Dps),
            2 => Some(GyroFullScale::Fs1000Dps),
            3 => Some(GyroFullScale::Fs2000Dps),
            _ => None,
        }
    }

    /// Valor de registro con el código ya desplazado
    pub const fn register_value(self) -> u8 {
        self.code() << bits::FS_SEL_SHIFT
    }
}

/// Escalas completas disponibles para el acelerómetro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AccelFullScale {
    /// ±2g
    #[default]
    Fs2G = 0,
    /// ±4g
    Fs4G = 1,
    /// ±8g
    Fs8G = 2,
    /// ±16g
    Fs16G = 3,
}

impl AccelFullScale {
    /// Código de 2 bits tal como se coloca en ACCEL_CONFIG[4:3]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodifica el código de 2 bits leído del registro
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(AccelFullScale::Fs2G),
            1 => Some(AccelFullScale::Fs4G),
            2 => Some(AccelFullScale::Fs8G),
            3 => Some(AccelFullScale::Fs16G),
            _ => None,
        }
    }

    /// Valor de registro con el código ya desplazado
    pub const fn register_value(self) -> u8 {
        self.code() << bits::FS_SEL_SHIFT
    }
}

/// Extrae el código de escala (bits 4:3) de un registro de configuración
pub const fn fs_sel_code(reg: u8) -> u8 {
    (reg & bits::FS_SEL_MASK) >> bits::FS_SEL_SHIFT
}

/// Bits útiles para configuración y control
pub mod bits {
    // PWR_MGMT_1
    pub const SLEEP: u8 = 0x40;

    // Selección de escala completa, bits [4:3]
    pub const FS_SEL_SHIFT: u8 = 3;
    pub const FS_SEL_MASK: u8 = 0x18;

    // INT_PIN_CFG
    pub const INT_LEVEL: u8 = 0x80; // activo a nivel bajo
    pub const INT_OPEN: u8 = 0x40; // open-drain
    pub const LATCH_INT_EN: u8 = 0x20; // mantener hasta borrar
    pub const INT_RD_CLEAR: u8 = 0x10; // borrar con cualquier lectura
    pub const INT_PIN_CFG_MASK: u8 = INT_LEVEL | INT_OPEN | LATCH_INT_EN | INT_RD_CLEAR;

    // INT_ENABLE / INT_STATUS
    pub const DATA_RDY_INT: u8 = 0x01;
    pub const I2C_MST_INT: u8 = 0x08;
    pub const FIFO_OFLOW_INT: u8 = 0x10;
    pub const MOT_INT: u8 = 0x40;
}

/// Muestra cruda de tres ejes (X, Y, Z) con signo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawTriple {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawTriple {
    /// Decodifica tres pares big-endian `[H, L]` en orden X, Y, Z
    pub fn from_be_bytes(data: &[u8; 6]) -> Self {
        Self {
            x: ((data[0] as i16) << 8) | (data[1] as i16),
            y: ((data[2] as i16) << 8) | (data[3] as i16),
            z: ((data[4] as i16) << 8) | (data[5] as i16),
        }
    }
}

/// Estructura para datos de aceleración en unidades físicas (g)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccelData {
    /// Aceleración en el eje X (g)
    pub x: f32,
    /// Aceleración en el eje Y (g)
    pub y: f32,
    /// Aceleración en el eje Z (g)
    pub z: f32,
}

/// Estructura para datos del giroscopio en unidades físicas (grados/segundo)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GyroData {
    /// Velocidad angular en el eje X (°/s)
    pub x: f32,
    /// Velocidad angular en el eje Y (°/s)
    pub y: f32,
    /// Velocidad angular en el eje Z (°/s)
    pub z: f32,
}
