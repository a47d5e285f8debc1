//! Shared test helpers

#![allow(dead_code)]


use embassy_futures::block_on;
use lis3mdl_async::{Init, Lis3mdl, Lis3mdlBusI2c, Lis3mdlConfig};

pub use mock_bus::{MockLis3mdl, MockPin, MockSpiLis3mdl, NoopDelay, Op};

pub type MockDriver = Lis3mdl<Lis3mdlBusI2c<MockLis3mdl>, Init, NoopDelay>;

/// Initialize a driver on `mock` with `cfg`, panicking on failure
pub fn init_with(mock: &MockLis3mdl, cfg: Lis3mdlConfig) -> MockDriver {
    match block_on(Lis3mdl::new_i2c_from_cfg(mock.clone(), cfg, NoopDelay).initialize()) {
        Ok(driver) => driver,
        Err((_, e)) => panic!("initialization failed: {e:?}"),
    }
}

/// Initialize a driver with the default configuration and forget the init traffic
pub fn create_mock_driver() -> (MockDriver, MockLis3mdl) {
    let mock = MockLis3mdl::new();
    let driver = init_with(&mock, Lis3mdlConfig::default());
    mock.clear_operations();
    (driver, mock)
}
