//! Drive the bridge against simulated probes and print every event.
//!
//! Run with: cargo run --example simulated_bridge

use bluetherm_bridge::{
    BridgeEvent, ConnectionState, Device, DeviceType, NotificationType, Sensor, SensorUnit,
    SimulatedSdk, ThermBridge,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bluetherm_bridge=debug".parse().unwrap()),
        )
        .init();

    let sdk = Arc::new(SimulatedSdk::new());
    let bridge = ThermBridge::new(sdk.clone());

    let availability = bridge.check_bluetooth_availability().await;
    println!(
        "Bluetooth available: {} ({})",
        availability.available, availability.message
    );

    // Two probes will show up on the first scan
    for (id, device_type, unit) in [
        ("probe-1", DeviceType::ThermaQBlue, SensorUnit::Celsius),
        ("probe-2", DeviceType::ThermapenBlue, SensorUnit::Fahrenheit),
    ] {
        sdk.add_discoverable(Device {
            device_name: format!("Simulated {}", id),
            connection_state: ConnectionState::Available,
            max_sensor_count: 1,
            battery_level: 75,
            sensors: vec![Sensor::new(unit, 0.0)],
            ..Device::new(id, device_type)
        });
    }

    let printer = tokio::spawn({
        let mut events = Box::pin(bridge.events());
        async move {
            while let Some(event) = events.next().await {
                match event {
                    BridgeEvent::DeviceListUpdated(devices) => {
                        println!("\ndeviceListUpdated ({} devices)", devices.len());
                        for d in devices {
                            match (d.temperature, d.unit) {
                                (Some(t), Some(unit)) => println!(
                                    "  {:<8} {:<15} {:<12} {:.1}{}",
                                    d.identifier, d.device_type, d.connection_state, t, unit
                                ),
                                _ => println!(
                                    "  {:<8} {:<15} {:<12} --",
                                    d.identifier, d.device_type, d.connection_state
                                ),
                            }
                        }
                    }
                    BridgeEvent::NotificationReceived(code) => {
                        println!(
                            "\nnotificationReceived {} ({:?})",
                            code,
                            NotificationType::from_code(code)
                        );
                    }
                }
            }
        }
    });

    bridge.subscribe_device_list_callback();
    bridge.start_scan();
    bridge.connect_to_device("probe-1");
    bridge.connect_to_device("probe-2");

    for step in 0..5 {
        sdk.set_reading_celsius("probe-1", 20.0 + step as f64 * 5.0);
        sdk.set_reading_celsius("probe-2", 60.0 + step as f64 * 2.5);
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    sdk.push_notification("probe-2", NotificationType::ButtonPressed.code(), &[]);
    bridge.connect_to_device("no-such-probe");
    bridge.forget_device("probe-1");

    tokio::time::sleep(Duration::from_millis(200)).await;
    bridge.unsubscribe_device_list_callback();
    printer.abort();
}
