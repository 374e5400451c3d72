use anyhow::Result;
use dimark_introspect::MapGenerator;
use std::path::Path;

use super::{load_compilation, load_config};

pub fn run(input: &Path, config: Option<&Path>, json: bool, yaml: bool) -> Result<()> {
    let compilation = load_compilation(input)?;
    let map = MapGenerator::new(load_config(config)?).generate(&compilation)?;

    if json {
        println!("{}", map.to_json()?);
    } else if yaml {
        print!("{}", map.to_yaml()?);
    } else {
        println!("Registration map for {}:", map.assembly);
        println!("Module: {}.{}", map.module.namespace, map.module.name);
        println!("Method: {}", map.module.method);
        println!("Registrations: {}", map.registrations.len());
        for registration in &map.registrations {
            let service = registration
                .service
                .as_deref()
                .unwrap_or(&registration.implementation);
            match &registration.key {
                Some(key) => println!(
                    "  {} -> {} ({}, key {})",
                    service, registration.implementation, registration.lifetime, key
                ),
                None => println!(
                    "  {} -> {} ({})",
                    service, registration.implementation, registration.lifetime
                ),
            }
        }
        println!("Interfaces: {}", map.interfaces.len());
        println!("Modules: {}", map.modules.len());
        println!("Diagnostics: {}", map.diagnostics.len());
    }

    Ok(())
}
