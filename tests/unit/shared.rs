//! Unit tests for the locked driver

use crate::common::{MockDelay, create_mock_driver};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use mpu6880::{Command, Response, SampleEvent, Sensor, SharedMpu6880};

#[test]
fn test_operations_through_lock() {
    let (driver, interface) = create_mock_driver();
    let shared: SharedMpu6880<NoopRawMutex, _, _> = SharedMpu6880::new(driver);

    shared.set_enable(Sensor::Accel, true, &mut MockDelay).unwrap();
    assert!(shared.is_enabled(Sensor::Accel));
    assert_eq!(shared.set_poll_interval(Sensor::Accel, 20), 20);

    interface.set_accel_data(7, 8, 9);
    let mut events = Vec::new();
    let next = shared
        .service_poll(0, &mut |e: SampleEvent| events.push(e))
        .unwrap();
    assert_eq!(next, Some(20));
    assert_eq!(events.len(), 1);

    assert_eq!(
        shared
            .dispatch(Command::GetEnable(Sensor::Gyro), &mut MockDelay)
            .unwrap(),
        Response::Enabled(false)
    );
}

#[test]
fn test_suspend_resume_through_lock() {
    let (driver, _interface) = create_mock_driver();
    let shared: SharedMpu6880<NoopRawMutex, _, _> = SharedMpu6880::new(driver);

    shared.set_enable(Sensor::Gyro, true, &mut MockDelay).unwrap();
    shared.suspend(&mut MockDelay).unwrap();
    assert!(shared.lock(|drv| drv.config().is_asleep));
    shared.resume(&mut MockDelay).unwrap();

    let driver = shared.into_inner();
    assert!(driver.is_enabled(Sensor::Gyro));
    assert!(driver.power_state().rail_powered);
}
