use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use dialogues::api::ApiClient;
use dialogues::app::{App, AppEvent, ViewBindings};
use dialogues::catalog::Catalog;
use dialogues::config::Config;
use dialogues::util::validate_server_url;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Get the config directory path (~/.config/dialogues/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("dialogues"))
}

/// Atomically copy a file using write-to-temp-then-rename.
/// The destination is never left in a partial state.
fn atomic_copy(src: &Path, dst: &Path) -> Result<()> {
    // Randomized temp filename so the path cannot be predicted between
    // check and create.
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let content = std::fs::read(src)
        .with_context(|| format!("Failed to read source file '{}'", src.display()))?;

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true) // Fails atomically if the file exists
        .open(&temp_path)
        .with_context(|| format!("Failed to create temporary file '{}'", temp_path.display()))?;

    temp_file.write_all(&content).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to write temporary file '{}': disk may be full",
            temp_path.display()
        )
    })?;

    temp_file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!("Failed to sync '{}' to disk", temp_path.display())
    })?;

    drop(temp_file);

    // On Windows, rename fails if destination exists
    #[cfg(windows)]
    if dst.exists() {
        std::fs::remove_file(dst).with_context(|| {
            let _ = std::fs::remove_file(&temp_path);
            format!("Failed to remove existing '{}'", dst.display())
        })?;
    }

    std::fs::rename(&temp_path, dst).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}'",
            temp_path.display(),
            dst.display()
        )
    })?;

    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "dialogues", about = "Terminal client for a discourse content site")]
struct Args {
    /// Backend server URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Import a catalog JSON file (copies to config directory)
    #[arg(long, value_name = "FILE")]
    import: Option<PathBuf>,

    /// Use this catalog file instead of the one in the config directory
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Set up config directory
    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    // User-only directory permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    let installed_catalog = config_dir.join("catalog.json");

    // Handle --import flag
    if let Some(import_file) = &args.import {
        // Canonicalize to resolve symlinks
        let canonical_import = import_file
            .canonicalize()
            .with_context(|| format!("Failed to resolve import file: {}", import_file.display()))?;

        let metadata = std::fs::metadata(&canonical_import)?;
        if !metadata.is_file() {
            anyhow::bail!("Import path must be a regular file");
        }

        // Parse before installing, so a broken file never replaces a good one
        Catalog::load(&canonical_import).with_context(|| {
            format!(
                "File does not appear to be a valid catalog: {}",
                canonical_import.display()
            )
        })?;

        // Back up the existing catalog first; if that fails, the original
        // stays untouched.
        if installed_catalog.exists() {
            let backup_name =
                format!("catalog.json.backup.{}", Utc::now().format("%Y%m%d_%H%M%S"));
            let backup_path = config_dir.join(&backup_name);

            atomic_copy(&installed_catalog, &backup_path).with_context(|| {
                format!(
                    "Failed to create backup at '{}'. Original file is unchanged.",
                    backup_path.display()
                )
            })?;
            println!("Backed up existing catalog to: {}", backup_path.display());
        }

        atomic_copy(&canonical_import, &installed_catalog).with_context(|| {
            format!(
                "Failed to import catalog '{}'. If a backup was created, your previous catalog is preserved there.",
                canonical_import.display()
            )
        })?;
        println!("Imported catalog to: {}", installed_catalog.display());
    }

    // Load config and apply CLI overrides
    let mut config = Config::load(&config_dir.join("config.toml")).context("Failed to load config")?;
    if let Some(server) = args.server {
        config.server_url = server;
    }

    let server_url = validate_server_url(&config.server_url)
        .with_context(|| format!("Invalid server URL: {}", config.server_url))?;

    // Resolve and load the catalog
    let catalog_path = args.catalog.clone().unwrap_or(installed_catalog);
    if !catalog_path.exists() {
        eprintln!("Error: No catalog file found at {}", catalog_path.display());
        eprintln!();
        eprintln!("To get started, import a catalog exported by the site:");
        eprintln!("  dialogues --import /path/to/catalog.json");
        eprintln!();
        eprintln!("Or create {} manually.", catalog_path.display());
        std::process::exit(1);
    }

    let catalog = Catalog::load(&catalog_path).context("Failed to load catalog")?;
    if catalog.categories.is_empty() {
        eprintln!("Warning: Catalog has no categories");
        eprintln!("The navigation panels will be empty until one is published");
    } else {
        println!(
            "Loaded {} categories and {} discourses from {}",
            catalog.categories.len(),
            catalog.content.len(),
            catalog_path.display()
        );
    }

    let api = ApiClient::new(server_url).context("Failed to create API client")?;
    let bindings = ViewBindings::from_config(&config);
    let mut app = App::new(catalog, api, bindings);

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Run the TUI
    dialogues::ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
