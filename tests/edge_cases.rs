use fogmesh::{Device, DeviceId, MemoryIndex, RegisterOutcome, Registry, SpatialIndex};
use std::sync::Arc;
use std::thread;

fn sample_device(ip: &str, latitude: f64, longitude: f64) -> Device {
    Device {
        name: format!("node-{ip}"),
        cpu_cores: 2,
        cpu_frequency: 1.8,
        ram_size: 4_096,
        rom_size: 128_000,
        os: "Ubuntu 22.04".to_string(),
        os_kernel: "5.15.0".to_string(),
        ip: ip.to_string(),
        latitude,
        longitude,
        country: "Ukraine".to_string(),
        region: "Kyiv Oblast".to_string(),
        city: "Kyiv".to_string(),
    }
}

fn register(registry: &Registry, ip: &str, latitude: f64, longitude: f64) -> DeviceId {
    match registry
        .register(sample_device(ip, latitude, longitude))
        .unwrap()
    {
        RegisterOutcome::Created(registration) => registration.record.id,
        RegisterOutcome::Conflict(_) => panic!("unexpected conflict for {ip}"),
    }
}

/// Test 1: Large population stress test
#[test]
fn test_large_population() {
    let registry = Registry::in_memory().expect("Failed to create registry");

    // 1K devices spread over a 10x10 degree area (keeping it reasonable for CI)
    for i in 0..1_000 {
        let lat = 40.0 + (i % 100) as f64 * 0.1;
        let lon = -74.0 + (i / 100) as f64 * 0.1;
        register(&registry, &format!("10.{}.{}.1", i / 256, i % 256), lat, lon);
    }

    let nearest = registry.nearest(45.0, -73.5, 10).expect("Query failed");
    assert_eq!(nearest.len(), 10);
}

/// Test 2: Extreme coordinate values
#[test]
fn test_extreme_coordinates() {
    let registry = Registry::in_memory().expect("Failed to create registry");

    register(&registry, "10.0.0.1", 90.0, 0.0); // North pole
    register(&registry, "10.0.0.2", -90.0, 0.0); // South pole
    register(&registry, "10.0.0.3", 0.0, 180.0); // Date line east
    register(&registry, "10.0.0.4", 0.0, -180.0); // Date line west

    // Should handle these without panic and rank the pole nearest.
    let nearest = registry.nearest(89.0, 0.0, 1).expect("Query failed");
    let record = registry.get(&nearest[0]).unwrap();
    assert_eq!(record.device.latitude, 90.0);
}

/// Test 3: Truncation places small negative coordinates in the zero cell
#[test]
fn test_negative_fraction_shares_zero_cell() {
    let index = Arc::new(MemoryIndex::new());
    let registry = Registry::builder()
        .index(Arc::clone(&index) as Arc<dyn SpatialIndex>)
        .build()
        .unwrap();

    // Truncation toward zero: both of these land in cell 0x0.
    register(&registry, "10.0.0.1", -0.5, -0.5);
    register(&registry, "10.0.0.2", 0.5, 0.5);

    let cell = fogmesh::BucketKey::new(0, 0);
    assert_eq!(index.devices_in_cell(&cell).unwrap().len(), 2);

    let nearest = registry.nearest(0.0, 0.0, 2).expect("Query failed");
    assert_eq!(nearest.len(), 2);
}

/// Test 4: Equidistant devices come back in registration order
#[test]
fn test_tie_break_is_registration_order() {
    let registry = Registry::in_memory().unwrap();

    let first = register(&registry, "10.0.0.1", 0.2, 0.5);
    let second = register(&registry, "10.0.0.2", 0.8, 0.5);

    let nearest = registry.nearest(0.5, 0.5, 2).unwrap();
    assert_eq!(nearest, vec![first, second]);
}

/// Test 5: Concurrent registrations all become searchable
#[test]
fn test_concurrent_registrations() {
    let registry = Registry::in_memory().unwrap();
    let mut handles = Vec::new();

    for worker in 0..4u8 {
        let registry = registry.clone();
        handles.push(thread::spawn(move || {
            for i in 0..50u8 {
                let device = sample_device(
                    &format!("10.{worker}.{i}.1"),
                    50.0 + worker as f64 * 0.1,
                    30.0 + i as f64 * 0.01,
                );
                registry.register(device).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let nearest = registry.nearest(50.0, 30.0, 200).unwrap();
    assert_eq!(nearest.len(), 200);
}

/// Test 6: K spanning several distance rings
#[test]
fn test_k_spans_multiple_rings() {
    let registry = Registry::in_memory().unwrap();

    // One device in the query cell, the rest in progressively farther cells.
    let center = register(&registry, "10.0.0.1", 20.5, 20.5);
    let ring1 = register(&registry, "10.0.0.2", 21.5, 20.5);
    let ring2 = register(&registry, "10.0.0.3", 22.5, 20.5);
    register(&registry, "10.0.0.4", 28.5, 20.5);

    let nearest = registry.nearest(20.5, 20.5, 3).unwrap();
    assert_eq!(nearest, vec![center, ring1, ring2]);
}

/// Test 7: Devices stacked on the same coordinates
#[test]
fn test_coincident_devices() {
    let registry = Registry::in_memory().unwrap();

    let a = register(&registry, "10.0.0.1", 7.7, 7.7);
    let b = register(&registry, "10.0.0.2", 7.7, 7.7);
    let c = register(&registry, "10.0.0.3", 7.7, 7.7);

    let nearest = registry.nearest(7.7, 7.7, 3).unwrap();
    assert_eq!(nearest, vec![a, b, c]);
}
