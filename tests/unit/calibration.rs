//! Batch and continuous hard-iron calibration

use crate::common::{create_mock_driver, Op};
use embassy_futures::block_on;
use lis3mdl_async::{CalibrationState, CALIBRATION_INTERVAL_MS};
use nalgebra::Vector3;

#[test]
fn test_batch_calibration_programs_offsets() {
    let (mut driver, mock) = create_mock_driver();
    mock.set_axes_sequence(&[[-100, 50, 0], [300, 250, 10], [100, 150, 5]]);
    let mut state = CalibrationState::new();

    let offset = block_on(driver.calibrate(&mut state, 3, CALIBRATION_INTERVAL_MS)).unwrap();

    assert_eq!(offset, Vector3::new(-100, -150, -5));
    assert_eq!(state.samples(), 3);
    assert_eq!(state.min(), Some(Vector3::new(-100, 50, 0)));
    assert_eq!(state.max(), Some(Vector3::new(300, 250, 10)));

    let writes = mock.writes();
    assert_eq!(writes.len(), 2);
    // Device offsets are cleared before sampling
    assert_eq!(
        writes[0],
        Op::Write {
            reg: 0x05,
            auto_increment: true,
            data: vec![0; 6],
        }
    );
    assert_eq!(
        block_on(driver.read_raw_offsets()).unwrap(),
        Vector3::new(-100, -150, -5)
    );
}

#[test]
fn test_batch_calibration_without_samples() {
    let (mut driver, _mock) = create_mock_driver();
    let mut state = CalibrationState::new();

    let offset = block_on(driver.calibrate(&mut state, 0, CALIBRATION_INTERVAL_MS)).unwrap();

    assert_eq!(offset, Vector3::zeros());
    assert!(state.is_empty());
}

#[test]
fn test_batch_calibration_restores_offsets_on_read_error() {
    let (mut driver, mock) = create_mock_driver();
    let mut state = CalibrationState::new();
    block_on(driver.set_offsets(Vector3::new(-100, 256, -1))).unwrap();
    mock.clear_operations();

    mock.fail_read_from(Some(0x28));
    assert!(block_on(driver.calibrate(&mut state, 5, 1)).is_err());
    mock.fail_read_from(None);

    // Cleared, then put back
    let writes = mock.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(
        writes[0],
        Op::Write {
            reg: 0x05,
            auto_increment: true,
            data: vec![0; 6],
        }
    );
    assert_eq!(
        block_on(driver.read_raw_offsets()).unwrap(),
        Vector3::new(-100, 256, -1)
    );
    assert!(state.is_empty());
}

#[test]
fn test_batch_calibration_keeps_offsets_when_unreadable() {
    let (mut driver, mock) = create_mock_driver();
    let mut state = CalibrationState::new();

    mock.fail_next_read();
    assert!(block_on(driver.calibrate(&mut state, 5, 1)).is_err());
    assert!(mock.writes().is_empty());
}

#[test]
fn test_continuous_calibration_tightens() {
    let (mut driver, mock) = create_mock_driver();
    mock.set_axes_sequence(&[[-100, 0, 0], [300, 0, 0], [300, 0, 0]]);
    let mut state = CalibrationState::new();

    let first = block_on(driver.read_raw_axes_continuous(&mut state)).unwrap();
    assert_eq!(first, Vector3::zeros());

    let second = block_on(driver.read_raw_axes_continuous(&mut state)).unwrap();
    assert_eq!(second, Vector3::new(200, 0, 0));
    assert_eq!(state.offset(), Vector3::new(-100, 0, 0));

    let mag = block_on(driver.read_mag_continuous(&mut state)).unwrap();
    assert!((mag.x - 200.0 / 6842.0 * 100.0).abs() < 1e-3);

    // Purely host side
    assert!(mock.writes().is_empty());
}

#[test]
fn test_states_are_independent() {
    let (mut driver, mock) = create_mock_driver();
    mock.set_axes(400, 0, 0);
    let mut a = CalibrationState::new();
    let mut b = CalibrationState::new();
    b.update(Vector3::new(-400, 0, 0));

    assert_eq!(block_on(driver.read_raw_axes_continuous(&mut a)).unwrap(), Vector3::zeros());
    assert_eq!(
        block_on(driver.read_raw_axes_continuous(&mut b)).unwrap(),
        Vector3::new(400, 0, 0)
    );
    assert_eq!(a.samples(), 1);
    assert_eq!(b.samples(), 2);
}
