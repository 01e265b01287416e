use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use serde_json::json;

use sitedeck::application::{webapp_timestamp, CONTEXT_FILE_EXTENSION};
use sitedeck::domain::entities::UnitOutcome;
use sitedeck::{Bundle, BundleKind, Config, ContextBuilder, Identity, SitedeckError};

pub fn cmd_inspect(config: &Config, path: &Path, json: bool) -> Result<()> {
    let bundle = bundle_at(path)?;
    let services = config.host_services();
    let builder = ContextBuilder::new(
        services.composer(),
        config.deployer_config(bundle.kind()),
        services.attributes().clone(),
    );

    let context = builder
        .build(&bundle)
        .with_context(|| format!("failed to build context for {}", path.display()))?;
    let classloading = context.classloading();

    if json {
        let units: Vec<_> = classloading
            .units()
            .iter()
            .chain(classloading.rejected())
            .map(|unit| match unit.outcome() {
                UnitOutcome::Registered { digest } => {
                    json!({ "path": unit.path(), "digest": digest })
                }
                UnitOutcome::Failed { reason } => json!({ "path": unit.path(), "error": reason }),
            })
            .collect();
        println!(
            "{}",
            json!({
                "event": "inspect",
                "identity": context.identity(),
                "context_path": context.context_path(),
                "document_root": context.document_root(),
                "steps": context.steps(),
                "units": units,
                "servlets": context.servlets(),
                "filters": context.filters(),
                "attributes": context.attributes().keys().collect::<Vec<_>>(),
            })
        );
        return Ok(());
    }

    println!("{} -> {}", context.identity(), context.context_path());
    println!("  document root: {}", context.document_root().display());

    println!("  steps:");
    for step in context.steps() {
        println!("    {}", step.name());
    }

    println!(
        "  units: {} registered, {} rejected",
        classloading.len(),
        classloading.rejected().len()
    );
    for unit in classloading.units() {
        println!("    + {}", unit.path().display());
    }
    for unit in classloading.rejected() {
        if let UnitOutcome::Failed { reason } = unit.outcome() {
            println!("    - {} ({reason})", unit.path().display());
        }
    }

    println!("  servlets:");
    for servlet in context.servlets() {
        println!("    {} [{}] {}", servlet.name, servlet.class, servlet.url_patterns.join(", "));
    }
    for taglib in context.taglibs() {
        println!("  taglib {} -> {}", taglib.uri, taglib.location.display());
    }
    Ok(())
}

/// A directory is a webapp bundle, a `.toml` file a context descriptor.
fn bundle_at(path: &Path) -> Result<Bundle> {
    let not_found = || SitedeckError::BundleNotFound {
        path: path.to_path_buf(),
    };
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(not_found)?;

    if path.is_dir() {
        return Ok(Bundle::new(
            Identity::new(name),
            path,
            BundleKind::Webapp,
            webapp_timestamp(path),
        ));
    }

    let is_context_file = path.extension().and_then(|e| e.to_str()) == Some(CONTEXT_FILE_EXTENSION);
    if path.is_file() && is_context_file {
        let modified = path
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        return Ok(Bundle::new(Identity::new(name), path, BundleKind::ContextFile, modified));
    }

    Err(not_found().into())
}
