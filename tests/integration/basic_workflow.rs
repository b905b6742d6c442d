//! Integration tests for basic workflow scenarios

use crate::common::{MockDelay, create_interrupt_driver, create_mock_driver};
use mpu6880::{AccelData, Command, GyroData, Response, SampleEvent, Sensor};

#[test]
fn test_polling_lifecycle() {
    let (mut driver, interface) = create_mock_driver();

    driver.set_enable(Sensor::Accel, true, &mut MockDelay).unwrap();
    driver.set_enable(Sensor::Gyro, true, &mut MockDelay).unwrap();
    driver.set_poll_interval(Sensor::Gyro, 100);

    interface.set_accel_data(0, 0, 16384);
    interface.set_gyro_data(10, 20, 30);

    let mut events = Vec::new();
    let mut now = 0;
    while now <= 400 {
        let next = driver
            .service_poll(now, &mut |e: SampleEvent| events.push(e))
            .unwrap();
        now = next.unwrap();
    }

    let accel = events
        .iter()
        .filter(|e| matches!(e, SampleEvent::Accel(_)))
        .count();
    let gyro = events
        .iter()
        .filter(|e| matches!(e, SampleEvent::Gyro(_)))
        .count();
    // Accel at 0, 200, 400; gyro every 100 ms
    assert_eq!(accel, 3);
    assert_eq!(gyro, 5);
    assert!(events.contains(&SampleEvent::Gyro(GyroData {
        x: -10,
        y: 20,
        z: -30
    })));

    driver.suspend(&mut MockDelay).unwrap();
    driver.resume(&mut MockDelay).unwrap();

    events.clear();
    driver
        .service_poll(1_000, &mut |e: SampleEvent| events.push(e))
        .unwrap();
    assert_eq!(events.len(), 2);

    driver.set_enable(Sensor::Accel, false, &mut MockDelay).unwrap();
    driver.set_enable(Sensor::Gyro, false, &mut MockDelay).unwrap();
    assert_eq!(driver.next_poll_deadline(), None);
    assert!(driver.power_state().chip_sleep);
}

#[test]
fn test_interrupt_lifecycle() {
    let (mut driver, interface) = create_interrupt_driver();

    driver
        .dispatch(
            Command::SetEnable {
                sensor: Sensor::Accel,
                on: true,
            },
            &mut MockDelay,
        )
        .unwrap();
    interface.set_accel_data(5, 6, 7);

    let mut events = Vec::new();
    assert!(
        driver
            .handle_interrupt(&mut |e: SampleEvent| events.push(e))
            .unwrap()
    );
    assert_eq!(events[0], SampleEvent::Accel(AccelData { x: 5, y: 6, z: 7 }));

    driver.suspend(&mut MockDelay).unwrap();
    assert!(
        !driver
            .handle_interrupt(&mut |e: SampleEvent| events.push(e))
            .unwrap()
    );

    driver.resume(&mut MockDelay).unwrap();
    assert!(driver.interrupt_armed());
    assert_eq!(
        driver
            .dispatch(Command::RawData(Sensor::Accel), &mut MockDelay)
            .unwrap(),
        Response::RawData([5, 6, 7])
    );
}
