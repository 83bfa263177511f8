//! Plugin catalog commands

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use ocular_api::{DependencyKind, PluginManifest, PluginPriority};
use ocular_core::PluginCatalog;

/// Plugin catalog arguments
#[derive(Args)]
pub struct PluginArgs {
    #[command(subcommand)]
    pub command: PluginCommands,
}

/// Plugin subcommands
#[derive(Subcommand)]
pub enum PluginCommands {
    /// List plugins the host can load
    List,
    /// Show plugin details
    Info {
        /// Plugin name or file name (e.g. `echo.dll`)
        name: String,
    },
}

/// Run plugin command
pub fn run(args: PluginArgs) -> Result<()> {
    let catalog = PluginCatalog::with_builtins();

    match args.command {
        PluginCommands::List => {
            println!("{}", catalog_table(&catalog.manifests()));
            Ok(())
        }
        PluginCommands::Info { name } => show_plugin_info(&catalog, &name),
    }
}

fn catalog_table(manifests: &[PluginManifest]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Version").fg(Color::Cyan),
        Cell::new("Priority").fg(Color::Cyan),
        Cell::new("Dependencies").fg(Color::Cyan),
    ]);

    for manifest in manifests {
        table.add_row(vec![
            Cell::new(&manifest.name),
            Cell::new(&manifest.version),
            Cell::new(priority_label(manifest.priority)),
            Cell::new(dependency_summary(manifest)),
        ]);
    }
    table
}

fn show_plugin_info(catalog: &PluginCatalog, name: &str) -> Result<()> {
    let Some(m) = catalog.manifest(name) else {
        bail!("Plugin '{}' not found. Run 'ocular plugin list' to see all plugins.", name);
    };

    println!("Name:         {}", m.name);
    println!("Version:      {}", m.version);
    println!("API Version:  {}", m.api_version);
    println!("Priority:     {}", priority_label(m.priority));
    println!("Dependencies: {}", dependency_summary(&m));
    Ok(())
}

fn priority_label(priority: PluginPriority) -> &'static str {
    match priority {
        PluginPriority::First => "first",
        PluginPriority::Default => "default",
        PluginPriority::Later => "later",
    }
}

fn dependency_summary(manifest: &PluginManifest) -> String {
    if manifest.dependencies.is_empty() {
        return "-".to_string();
    }
    manifest
        .dependencies
        .iter()
        .map(|dep| match dep.kind {
            DependencyKind::Required => dep.name.clone(),
            DependencyKind::Optional => format!("{} (optional)", dep.name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
