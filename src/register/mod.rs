//! Definiciones de registros para el MPU6050
//!
//! El MPU6050 tiene un único banco de registros, direccionado con 8 bits.

pub mod registers {
    // Configuración de escala completa
    pub const GYRO_CONFIG: u8 = 0x1B;
    pub const ACCEL_CONFIG: u8 = 0x1C;

    // Registros de interrupción
    pub const INT_PIN_CFG: u8 = 0x37;
    pub const INT_ENABLE: u8 = 0x38;
    pub const INT_STATUS: u8 = 0x3A;

    // Inicio de cada bloque de datos (X, Y, Z big-endian; temperatura H, L)
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const TEMP_OUT_H: u8 = 0x41;
    pub const GYRO_XOUT_H: u8 = 0x43;

    // Gestión de energía
    pub const PWR_MGMT_1: u8 = 0x6B;

    // Registro de identificación
    pub const WHO_AM_I: u8 = 0x75;
}
