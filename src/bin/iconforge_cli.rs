//! IconForge CLI - Bridge interface for build tooling
//!
//! Commands: resolve, render
//! Outputs JSON to stdout
//! Returns non-zero on icon errors

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use iconforge_core::{
    AssetDescriptor, ConfigMap, Fingerprint, IconPipeline, RenderOptions,
};

#[derive(Parser)]
#[command(name = "iconforge-cli")]
#[command(about = "IconForge CLI - PWA icon renditions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the JSON configuration (object with `icon` / `icons`)
    #[arg(short, long, default_value = "manifest.config.json")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate icons and print their canonical form
    Resolve,

    /// Render every icon size
    Render {
        /// Public URL prefix (overrides `publicPath` in the config)
        #[arg(short, long)]
        public_path: Option<String>,

        /// true, false, icons or manifest (overrides `fingerprints` in the config)
        #[arg(short, long)]
        fingerprint: Option<Fingerprint>,

        /// Write rendered assets under this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(r#"{{"error": "Failed to load config: {}"}}"#, e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Resolve => {
            let pipeline = IconPipeline::new(RenderOptions::default());
            match pipeline.resolve(config) {
                Ok(resolved) => {
                    let output = serde_json::json!({
                        "valid": true,
                        "icons": resolved.icons,
                        "config": resolved.residual,
                    });
                    print_json(&output);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    print_json(&serde_json::json!({"valid": false, "error": e.to_string()}));
                    ExitCode::from(2)
                }
            }
        }

        Commands::Render {
            public_path,
            fingerprint,
            out,
        } => {
            let mut options = match RenderOptions::from_config(&config) {
                Ok(o) => o,
                Err(e) => {
                    print_json(&serde_json::json!({"success": false, "error": e.to_string()}));
                    return ExitCode::from(2);
                }
            };
            if let Some(public_path) = public_path {
                options.public_path = public_path;
            }
            if let Some(fingerprint) = fingerprint {
                options.fingerprint = fingerprint;
            }

            let pipeline = IconPipeline::new(options);
            let (rendered, residual) = match pipeline.run(config).await {
                Ok(r) => r,
                Err(e) => {
                    print_json(&serde_json::json!({"success": false, "error": e.to_string()}));
                    return ExitCode::from(2);
                }
            };

            if let Some(dir) = out {
                if let Err(e) = write_assets(&dir, &rendered.assets) {
                    print_json(&serde_json::json!({"success": false, "error": e.to_string()}));
                    return ExitCode::FAILURE;
                }
            }

            // Bytes already went to disk (or nowhere); keep stdout small.
            let assets: Vec<_> = rendered
                .assets
                .iter()
                .filter_map(|a| serde_json::to_value(a).ok())
                .map(|mut a| {
                    if let Some(fields) = a.as_object_mut() {
                        fields.remove("source_base64");
                    }
                    a
                })
                .collect();

            print_json(&serde_json::json!({
                "success": true,
                "icons": rendered.icons,
                "assets": assets,
                "config": residual,
            }));
            ExitCode::SUCCESS
        }
    }
}

fn load_config(path: &Path) -> Result<ConfigMap, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_assets(dir: &Path, assets: &[AssetDescriptor]) -> std::io::Result<()> {
    for asset in assets {
        let target = dir.join(&asset.output);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &asset.source)?;
        log::info!("wrote {} ({} bytes)", target.display(), asset.size);
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!(r#"{{"error": "Failed to serialize output: {}"}}"#, e),
    }
}
