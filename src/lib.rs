#![no_std]

use core::{future::Future, marker::PhantomData};
use embedded_hal_async::{delay::DelayNs, digital::Wait, i2c::I2c, spi::SpiDevice};
use nalgebra::Vector3;

mod bus;
mod calibration;
mod cfg;
mod flag;
mod reg;
mod status;
mod units;

pub use crate::bus::{BusTransfer, Lis3mdlBusI2c, Lis3mdlBusSpi, TransportError};
pub use crate::calibration::{CalibrationState, CALIBRATION_INTERVAL_MS, CALIBRATION_SAMPLES};
pub use crate::cfg::*;
pub use crate::flag::DataReadyFlag;
pub use crate::reg::{Register, WHO_AM_I_VALUE};
pub use crate::status::{InterruptSource, Status};
pub use crate::units::*;

use crate::bus::with_timeout;
use crate::reg::INT_CFG_FIXED;

// Longest auto-incrementing write, the hard-iron offset block
const MAX_BURST_WRITE: usize = 6;

// Compile-time init states
pub struct Init;
pub struct NotInit;

pub struct Lis3mdl<BUS, INIT, DELAY> {
    bus: BUS,
    config: Lis3mdlConfig,
    delay: DELAY,
    init_state: PhantomData<INIT>,
}

impl<BUS, DELAY> Lis3mdl<Lis3mdlBusI2c<BUS>, NotInit, DELAY>
where
    BUS: I2c,
    DELAY: DelayNs,
{
    /// Creates an uninitialized magnetometer struct with the given config.
    #[must_use]
    pub fn new_i2c_from_cfg(
        bus: BUS,
        cfg: Lis3mdlConfig,
        delay: DELAY,
    ) -> Lis3mdl<Lis3mdlBusI2c<BUS>, NotInit, DELAY> {
        Self {
            bus: Lis3mdlBusI2c {
                bus_inner: bus,
                address: I2cAddress::default(),
            },
            config: cfg,
            delay,
            init_state: PhantomData::<NotInit>,
        }
    }

    /// Creates an uninitialized magnetometer struct with a default config.
    #[must_use]
    pub fn new_i2c(bus: BUS, delay: DELAY) -> Lis3mdl<Lis3mdlBusI2c<BUS>, NotInit, DELAY> {
        Self::new_i2c_from_cfg(bus, Lis3mdlConfig::default(), delay)
    }

    /// Set I2C address of the module. See `I2cAddress` for defaults, otherwise `u8` implements `Into<I2cAddress>`
    #[must_use]
    pub fn set_address(
        self,
        address: impl Into<I2cAddress>,
    ) -> Lis3mdl<Lis3mdlBusI2c<BUS>, NotInit, DELAY> {
        Lis3mdl {
            bus: Lis3mdlBusI2c {
                address: address.into(),
                ..self.bus
            },
            ..self
        }
    }
}

impl<BUS, DELAY> Lis3mdl<Lis3mdlBusSpi<BUS>, NotInit, DELAY>
where
    BUS: SpiDevice,
    DELAY: DelayNs,
{
    /// Creates an uninitialized magnetometer struct with the given config.
    #[must_use]
    pub fn new_spi_from_cfg(
        bus: BUS,
        cfg: Lis3mdlConfig,
        delay: DELAY,
    ) -> Lis3mdl<Lis3mdlBusSpi<BUS>, NotInit, DELAY> {
        Self {
            bus: Lis3mdlBusSpi { bus_inner: bus },
            config: cfg,
            delay,
            init_state: PhantomData::<NotInit>,
        }
    }

    /// Creates an uninitialized magnetometer struct with a default config.
    #[must_use]
    pub fn new_spi(bus: BUS, delay: DELAY) -> Lis3mdl<Lis3mdlBusSpi<BUS>, NotInit, DELAY> {
        Self::new_spi_from_cfg(bus, Lis3mdlConfig::default(), delay)
    }
}

impl<BUS: BusTransfer, INIT, DELAY> Lis3mdl<BUS, INIT, DELAY> {
    /// Consumes the `Lis3mdl` and releases the bus back to the user
    #[must_use]
    pub fn destroy(self) -> BUS::Inner {
        self.bus.destroy()
    }

    /// Current configuration
    pub fn config(&self) -> &Lis3mdlConfig {
        &self.config
    }
}

impl<BUS, DELAY> Lis3mdl<BUS, NotInit, DELAY>
where
    BUS: BusTransfer,
    DELAY: DelayNs,
{
    /*
        Configuration methods
    */

    /// Set full-scale range, choices are 4, 8, 12 or 16 gauss
    #[must_use]
    pub fn range(self, range: GaussRange) -> Lis3mdl<BUS, NotInit, DELAY> {
        Lis3mdl {
            config: Lis3mdlConfig {
                range,
                ..self.config
            },
            ..self
        }
    }

    /// Set operating profile, power optimized or high resolution
    #[must_use]
    pub fn profile(self, profile: Profile) -> Lis3mdl<BUS, NotInit, DELAY> {
        Lis3mdl {
            config: Lis3mdlConfig {
                profile,
                ..self.config
            },
            ..self
        }
    }

    /// Enable or disable the temperature sensor
    #[must_use]
    pub fn temperature(self, temperature: bool) -> Lis3mdl<BUS, NotInit, DELAY> {
        Lis3mdl {
            config: Lis3mdlConfig {
                temperature,
                ..self.config
            },
            ..self
        }
    }

    /// Set (or disable) threshold interrupt generation
    #[must_use]
    pub fn interrupt(self, int: impl Into<Option<Interrupt>>) -> Lis3mdl<BUS, NotInit, DELAY> {
        Lis3mdl {
            config: Lis3mdlConfig {
                int: int.into(),
                ..self.config
            },
            ..self
        }
    }

    /// Set timeout of each bus transaction in microseconds
    #[must_use]
    pub fn timeout_us(self, timeout_us: u32) -> Lis3mdl<BUS, NotInit, DELAY> {
        Lis3mdl {
            config: Lis3mdlConfig {
                timeout_us,
                ..self.config
            },
            ..self
        }
    }

    /*
        Initialization methods
    */

    /// Verifies the device identity and writes the configuration. On failure
    /// the uninitialized driver is handed back so initialization can be retried.
    pub async fn initialize(
        mut self,
    ) -> Result<Lis3mdl<BUS, Init, DELAY>, (Self, Lis3mdlError<BUS::Error>)> {
        match self.setup().await {
            Ok(()) => Ok(Lis3mdl {
                bus: self.bus,
                config: self.config,
                delay: self.delay,
                init_state: PhantomData::<Init>,
            }),
            Err(e) => Err((self, e)),
        }
    }

    /// Identity check followed by the control register sequence
    async fn setup(&mut self) -> Result<(), Lis3mdlError<BUS::Error>> {
        let [whoami] = self.read_from(Register::WhoAmI).await?;

        if whoami != WHO_AM_I_VALUE {
            #[cfg(feature = "defmt")]
            defmt::warn!("LIS3MDL not found, WHO_AM_I = {=u8:#x}", whoami);
            return Err(Lis3mdlError::DeviceNotFound(whoami));
        }

        for (reg, value) in self.config.ctrl_regs() {
            self.write_config(reg, value).await?;
        }

        self.setup_interrupt(self.config.int).await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("LIS3MDL initialized with {}", self.config);

        Ok(())
    }

    async fn setup_interrupt(&mut self, int: Option<Interrupt>) -> Result<(), Lis3mdlError<BUS::Error>> {
        match int {
            Some(int) => {
                let [low, high] = (int.threshold & 0x7FFF).to_le_bytes();
                self.write_config(Register::IntThsL, low).await?;
                self.write_config(Register::IntThsH, high).await?;
                self.write_config(Register::IntCfg, int.int_cfg()).await
            }
            // Written anyway so a retry never leaves a stale interrupt setup
            None => self.write_config(Register::IntCfg, INT_CFG_FIXED).await,
        }
    }

    async fn write_config(&mut self, reg: Register, value: u8) -> Result<(), Lis3mdlError<BUS::Error>> {
        self.write_to(reg, value).await.map_err(|e| {
            #[cfg(feature = "defmt")]
            defmt::error!("LIS3MDL write to {} failed", reg);
            Lis3mdlError::ConfigWriteFailed(reg, e)
        })
    }
}

impl<BUS, INIT, DELAY> Lis3mdl<BUS, INIT, DELAY>
where
    BUS: BusTransfer,
    DELAY: DelayNs,
{
    /// Read a const number `N` of bytes starting at the requested register
    async fn read_from<const N: usize>(
        &mut self,
        reg: Register,
    ) -> Result<[u8; N], TransportError<BUS::Error>> {
        let mut buf = [0u8; N];
        let address = BUS::read_address(reg.reg(), N);
        with_timeout(
            &mut self.delay,
            self.config.timeout_us,
            self.bus.bus_transfer(&[address], &mut buf),
        )
        .await?;
        Ok(buf)
    }

    /// Write a single byte to the requested register
    async fn write_to(&mut self, reg: Register, data: u8) -> Result<(), TransportError<BUS::Error>> {
        let address = BUS::write_address(reg.reg(), 1);
        with_timeout(
            &mut self.delay,
            self.config.timeout_us,
            self.bus.bus_write(&[address, data]),
        )
        .await
    }

    /// Write consecutive registers in one auto-incrementing transaction
    async fn write_burst<const N: usize>(
        &mut self,
        reg: Register,
        data: &[u8; N],
    ) -> Result<(), TransportError<BUS::Error>> {
        const { assert!(N <= MAX_BURST_WRITE) };
        let mut buf = [0u8; MAX_BURST_WRITE + 1];
        buf[0] = BUS::write_address(reg.reg(), N);
        buf[1..=N].copy_from_slice(data);
        with_timeout(
            &mut self.delay,
            self.config.timeout_us,
            self.bus.bus_write(&buf[..=N]),
        )
        .await
    }
}

impl<BUS, DELAY> Lis3mdl<BUS, Init, DELAY>
where
    BUS: BusTransfer,
    DELAY: DelayNs,
{
    /// Configured full-scale range
    pub fn gauss_range(&self) -> GaussRange {
        self.config.range
    }

    /// Change the full-scale range on the device, later conversions follow it
    pub async fn set_range(&mut self, range: GaussRange) -> Result<(), TransportError<BUS::Error>> {
        let config = Lis3mdlConfig {
            range,
            ..self.config
        };
        let [_, (reg, value), ..] = config.ctrl_regs();
        self.write_to(reg, value).await?;
        self.config.range = range;
        Ok(())
    }

    /// Read and decode the status register
    pub async fn read_status(&mut self) -> Result<Status, TransportError<BUS::Error>> {
        let [status] = self.read_from(Register::Status).await?;
        Ok(status.into())
    }

    /// Returns true if a new set of data is available on all axes
    pub async fn new_data_ready(&mut self) -> Result<bool, TransportError<BUS::Error>> {
        Ok(self.read_status().await?.data_available)
    }

    /// Read and decode the interrupt source register, clearing a latched interrupt
    pub async fn read_interrupt_source(&mut self) -> Result<InterruptSource, TransportError<BUS::Error>> {
        let [src] = self.read_from(Register::IntSrc).await?;
        Ok(src.into())
    }

    /// Set the interrupt threshold, the value is limited to 15 bits
    pub async fn set_interrupt_threshold(&mut self, threshold: u16) -> Result<(), TransportError<BUS::Error>> {
        let bytes = (threshold & 0x7FFF).to_le_bytes();
        self.write_burst(Register::IntThsL, &bytes).await?;
        if let Some(int) = self.config.int.as_mut() {
            int.threshold = threshold & 0x7FFF;
        }
        Ok(())
    }

    /// Get unscaled magnetometer axes
    pub async fn read_raw_axes(&mut self) -> Result<RawAxes, TransportError<BUS::Error>> {
        let raw = self.read_from(Register::OutXL).await?;
        Ok(collect_3xi16(raw))
    }

    /// Get the hard-iron offsets programmed on the device
    pub async fn read_raw_offsets(&mut self) -> Result<RawAxes, TransportError<BUS::Error>> {
        let raw = self.read_from(Register::OffsetXL).await?;
        Ok(collect_3xi16(raw))
    }

    /// Program hard-iron offsets on the device
    pub async fn set_offsets(&mut self, offsets: RawAxes) -> Result<(), TransportError<BUS::Error>> {
        self.write_burst(Register::OffsetXL, &spread_3xi16(offsets))
            .await
    }

    /// Get unscaled temperature
    pub async fn read_raw_temperature(&mut self) -> Result<i16, TransportError<BUS::Error>> {
        let [low, high] = self.read_from(Register::TempOutL).await?;
        Ok(merge(low, high))
    }

    /// Get temperature in degrees Celsius
    pub async fn read_temperature(&mut self) -> Result<f32, TransportError<BUS::Error>> {
        Ok(temperature_celsius(self.read_raw_temperature().await?))
    }

    /// Get magnetometer axes in micro tesla for the configured range
    pub async fn read_mag(&mut self) -> Result<MagAxes, TransportError<BUS::Error>> {
        let raw = self.read_raw_axes().await?;
        Ok(axes_to_microtesla(raw, self.config.range))
    }

    /// Get unscaled axes, tracked by and corrected with `state`
    pub async fn read_raw_axes_continuous(
        &mut self,
        state: &mut CalibrationState,
    ) -> Result<RawAxes, TransportError<BUS::Error>> {
        let raw = self.read_raw_axes().await?;
        Ok(state.track(raw))
    }

    /// Get axes in micro tesla, tracked by and corrected with `state`
    pub async fn read_mag_continuous(
        &mut self,
        state: &mut CalibrationState,
    ) -> Result<MagAxes, TransportError<BUS::Error>> {
        let raw = self.read_raw_axes_continuous(state).await?;
        Ok(axes_to_microtesla(raw, self.config.range))
    }

    /// Get compass heading in degrees from continuously calibrated axes
    pub async fn read_heading(
        &mut self,
        state: &mut CalibrationState,
    ) -> Result<f32, TransportError<BUS::Error>> {
        let raw = self.read_raw_axes_continuous(state).await?;
        Ok(heading(f32::from(raw.x), f32::from(raw.y)))
    }

    /// Collects `num` samples into `state` while the sensor is rotated, then
    /// programs the resulting offsets on the device. Device offsets are
    /// cleared before sampling and restored if a sample cannot be read.
    pub async fn calibrate(
        &mut self,
        state: &mut CalibrationState,
        num: usize,
        interval_ms: u32,
    ) -> Result<RawAxes, TransportError<BUS::Error>> {
        let previous = self.read_raw_offsets().await?;
        self.set_offsets(Vector3::zeros()).await?;

        if let Err(e) = self.sample(state, num, interval_ms).await {
            #[cfg(feature = "defmt")]
            defmt::warn!("LIS3MDL calibration aborted, restoring offsets");
            // The sampling error is the one reported
            let _ = self.set_offsets(previous).await;
            return Err(e);
        }

        let offset = state.offset();
        self.set_offsets(offset).await?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "LIS3MDL offsets x: {} y: {} z: {} from {} samples",
            offset.x,
            offset.y,
            offset.z,
            state.samples()
        );

        Ok(offset)
    }

    async fn sample(
        &mut self,
        state: &mut CalibrationState,
        num: usize,
        interval_ms: u32,
    ) -> Result<(), TransportError<BUS::Error>> {
        for _ in 0..num {
            state.update(self.read_raw_axes().await?);
            self.delay.delay_ms(interval_ms).await;
        }
        Ok(())
    }
}

/// Runs any future supplied in this driver after a rising or falling
/// edge of a pin, usually the LIS3MDL `DRDY` or `INT` pin.
pub trait WithInterrupt<T, E> {
    fn rising(self, pin: &mut impl Wait) -> impl Future<Output = Result<T, Lis3mdlError<E>>>;
    fn falling(self, pin: &mut impl Wait) -> impl Future<Output = Result<T, Lis3mdlError<E>>>;
}

impl<T, E, F> WithInterrupt<T, E> for F
where
    F: Future<Output = Result<T, TransportError<E>>>,
{
    async fn rising(self, pin: &mut impl Wait) -> Result<T, Lis3mdlError<E>> {
        pin.wait_for_rising_edge().await.map_err(|_| Lis3mdlError::<E>::InterruptPin)?;
        Ok(self.await?)
    }

    async fn falling(self, pin: &mut impl Wait) -> Result<T, Lis3mdlError<E>> {
        pin.wait_for_falling_edge().await.map_err(|_| Lis3mdlError::<E>::InterruptPin)?;
        Ok(self.await?)
    }
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lis3mdlError<E> {
    /// A register transaction failed or timed out
    Transport(TransportError<E>),
    /// An incorrect 'Who Am I' value was returned, expected 0x3D
    DeviceNotFound(u8),
    /// A configuration register write was not acknowledged
    ConfigWriteFailed(Register, TransportError<E>),
    /// Waiting for an edge on the interrupt pin failed
    InterruptPin,
}

impl<E> From<TransportError<E>> for Lis3mdlError<E> {
    fn from(error: TransportError<E>) -> Self {
        Lis3mdlError::Transport(error)
    }
}
