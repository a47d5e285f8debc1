use core::future::Future;

use embassy_futures::select::{select, Either};
use embedded_hal_async::{
    delay::DelayNs,
    i2c::I2c,
    spi::{Operation, SpiDevice},
};

use crate::cfg::I2cAddress;
use crate::reg::*;

/// Failure of a single register transaction
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<E> {
    /// The transaction did not complete within the configured timeout
    Timeout,
    /// The bus reported an error (NACK, arbitration loss, ...)
    Bus(E),
}

// Type to hold bus information for I2c
pub struct Lis3mdlBusI2c<I2C> {
    pub(crate) bus_inner: I2C,
    pub(crate) address: I2cAddress,
}

// Type to hold bus information for Spi
pub struct Lis3mdlBusSpi<SPI> {
    pub(crate) bus_inner: SPI,
}

// Trait to allow for generic behavior across I2c or Spi usage
#[allow(async_fn_in_trait)]
pub trait BusTransfer {
    type Error;
    type Inner;
    fn destroy(self) -> Self::Inner;
    /// Address byte for reading `len` registers starting at `reg`
    fn read_address(reg: u8, len: usize) -> u8;
    /// Address byte for writing `len` registers starting at `reg`
    fn write_address(reg: u8, len: usize) -> u8;
    async fn bus_transfer(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), Self::Error>;
    async fn bus_write(&mut self, write: &[u8]) -> Result<(), Self::Error>;
}

// Implementation of bus trait for I2c
impl<I2C, E> BusTransfer for Lis3mdlBusI2c<I2C>
where
    I2C: I2c<Error = E>,
{
    type Inner = I2C;
    type Error = E;

    fn destroy(self) -> Self::Inner {
        self.bus_inner
    }

    fn read_address(reg: u8, len: usize) -> u8 {
        if len > 1 {
            reg | I2C_AUTO_INCREMENT
        } else {
            reg
        }
    }

    fn write_address(reg: u8, len: usize) -> u8 {
        Self::read_address(reg, len)
    }

    // Repeated start between the address write and the read
    async fn bus_transfer(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), E> {
        self.bus_inner
            .write_read(self.address.get(), write, read)
            .await
    }

    async fn bus_write(&mut self, write: &[u8]) -> Result<(), E> {
        self.bus_inner.write(self.address.get(), write).await
    }
}

// Implementation of bus trait for Spi
impl<SPI, E> BusTransfer for Lis3mdlBusSpi<SPI>
where
    SPI: SpiDevice<Error = E>,
{
    type Inner = SPI;
    type Error = E;

    fn destroy(self) -> Self::Inner {
        self.bus_inner
    }

    fn read_address(reg: u8, len: usize) -> u8 {
        SPI_READ | Self::write_address(reg, len)
    }

    fn write_address(reg: u8, len: usize) -> u8 {
        if len > 1 {
            reg | SPI_AUTO_INCREMENT
        } else {
            reg
        }
    }

    async fn bus_transfer(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), E> {
        self.bus_inner
            .transaction(&mut [Operation::Write(write), Operation::Read(read)])
            .await
    }

    async fn bus_write(&mut self, write: &[u8]) -> Result<(), E> {
        self.bus_inner.write(write).await
    }
}

/// Races a bus operation against `timeout_us` on the delay source
pub(crate) async fn with_timeout<T, E, D>(
    delay: &mut D,
    timeout_us: u32,
    op: impl Future<Output = Result<T, E>>,
) -> Result<T, TransportError<E>>
where
    D: DelayNs,
{
    match select(op, delay.delay_us(timeout_us)).await {
        Either::First(res) => res.map_err(TransportError::Bus),
        Either::Second(()) => Err(TransportError::Timeout),
    }
}
