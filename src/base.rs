//! Funcionalidades y traits base para el driver

/// Trait para obtener un timestamp en microsegundos.
/// Permite implementar diferentes fuentes (reloj del sistema o manual).
///
/// El reloj debe ser monótono.
pub trait TimeSource {
    /// Retorna el timestamp (en microsegundos)
    fn get_timestamp_us(&self) -> u64;
}

/// Implementación por defecto usando un reloj monótono del sistema.
///
/// Cuenta microsegundos desde que se creó la fuente.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for SystemTimeSource {
    fn get_timestamp_us(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

/// Reloj controlado a mano, para pruebas o para timestamps externos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualTimeSource {
    pub timestamp_us: u64,
}

impl ManualTimeSource {
    pub fn new(timestamp_us: u64) -> Self {
        Self { timestamp_us }
    }

    pub fn set(&mut self, timestamp_us: u64) {
        self.timestamp_us = timestamp_us;
    }

    /// Avanza el reloj `delta_us` microsegundos
    pub fn advance_us(&mut self, delta_us: u64) {
        self.timestamp_us = self.timestamp_us.saturating_add(delta_us);
    }
}

impl TimeSource for ManualTimeSource {
    fn get_timestamp_us(&self) -> u64 {
        self.timestamp_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "std")]
    #[test]
    fn test_system_time_source_is_monotonic() {
        let ts = SystemTimeSource::new();
        let t1 = ts.get_timestamp_us();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let t2 = ts.get_timestamp_us();
        assert!(t2 >= t1 + 1_000);
    }

    #[test]
    fn test_manual_time_source() {
        let mut ts = ManualTimeSource::new(123456789);
        assert_eq!(ts.get_timestamp_us(), 123456789);

        ts.advance_us(11);
        assert_eq!(ts.get_timestamp_us(), 123456800);

        ts.set(u64::MAX - 1);
        ts.advance_us(5);
        assert_eq!(ts.get_timestamp_us(), u64::MAX);
    }
}
