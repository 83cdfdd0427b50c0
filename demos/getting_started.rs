use fogmesh::{Device, DeviceFilter, RegisterOutcome, Registry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug to see detailed logs)
    env_logger::init();

    println!("=== Fogmesh - Getting Started ===\n");

    // Create an in-memory registry
    let registry = Registry::in_memory()?;
    println!("✓ Created in-memory registry\n");

    // === DEVICE REGISTRATION ===
    println!("1. Device Registration");
    println!("----------------------");

    let base = Device {
        name: "edge-node".to_string(),
        cpu_cores: 4,
        cpu_frequency: 2.4,
        ram_size: 8_192,
        rom_size: 256_000,
        os: "Ubuntu 22.04".to_string(),
        os_kernel: "5.15.0".to_string(),
        ip: String::new(),
        latitude: 0.0,
        longitude: 0.0,
        country: "Ukraine".to_string(),
        region: "Kyiv Oblast".to_string(),
        city: "Kyiv".to_string(),
    };

    let sites = [
        ("10.0.0.1", 50.4501, 30.5234, "Kyiv"),
        ("10.0.0.2", 50.4547, 30.5238, "Kyiv"),
        ("10.0.0.3", 49.8397, 24.0297, "Lviv"),
    ];

    for (ip, lat, lon, city) in sites {
        let outcome = registry.register(Device {
            ip: ip.to_string(),
            latitude: lat,
            longitude: lon,
            city: city.to_string(),
            ..base.clone()
        })?;
        if let RegisterOutcome::Created(registration) = outcome {
            println!(
                "   Registered {} at ({lat}, {lon}) -> id {}, join via {}",
                ip, registration.record.id, registration.grant.manager_address
            );
        }
    }
    println!();

    // === PROXIMITY SEARCH ===
    println!("2. Proximity Search");
    println!("-------------------");

    // Default K = 2: the two devices closest to central Kyiv.
    let nearest = registry.find_nearest(50.4500, 30.5230)?;
    println!("   {} devices nearest to central Kyiv:", nearest.len());
    for id in &nearest {
        let record = registry.get(id)?;
        println!(
            "     - {} ({}, {})",
            record.device.ip, record.device.latitude, record.device.longitude
        );
    }
    println!();

    // === EXACT-MATCH FILTERING ===
    println!("3. Exact-Match Filtering");
    println!("------------------------");

    let filter = DeviceFilter {
        city: Some("Lviv".to_string()),
        ..DeviceFilter::default()
    };
    let found = registry.find(&filter)?;
    println!("   Devices in Lviv: {}", found.len());
    for record in &found {
        println!("     - {} ({})", record.device.name, record.device.ip);
    }

    println!("\n=== Done ===");
    Ok(())
}
