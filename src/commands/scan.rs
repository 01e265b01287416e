use anyhow::Result;
use serde_json::json;

use sitedeck::{BundleScanner, Config};

pub fn cmd_scan(config: &Config, json: bool) -> Result<()> {
    for deployer in config.deployer_configs() {
        let scanner = BundleScanner::new(&deployer.scan_root, deployer.kind);
        let bundles = scanner.scan();

        if json {
            let entries: Vec<_> = bundles
                .iter()
                .map(|bundle| {
                    json!({
                        "identity": bundle.identity(),
                        "kind": bundle.kind().to_string(),
                        "path": bundle.path(),
                        "modified": chrono::DateTime::<chrono::Utc>::from(bundle.modified()).to_rfc3339(),
                    })
                })
                .collect();
            println!(
                "{}",
                json!({
                    "event": "scan",
                    "deployer": deployer.name,
                    "root": deployer.scan_root,
                    "bundles": entries,
                })
            );
            continue;
        }

        println!("{} ({})", deployer.name, deployer.scan_root.display());
        if bundles.is_empty() {
            println!("  no bundles");
        }
        for bundle in bundles.iter() {
            println!(
                "  {:<24} {:<8} {}",
                bundle.identity(),
                bundle.kind(),
                bundle.path().display()
            );
        }
    }
    Ok(())
}
