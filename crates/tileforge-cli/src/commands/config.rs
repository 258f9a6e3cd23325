use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tileforge_core::basemap::Basemap;
use tileforge_core::pipeline::config::PipelineConfig;
use tileforge_core::tools::ToolPaths;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full default PipelineConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = PipelineConfig {
        set_name: "image_set".into(),
        channel_base: Some(PathBuf::from("input/image_set")),
        channels: None,
        output_folder: PathBuf::from("output"),
        basemap: Basemap {
            color_path: PathBuf::from("basemap/color.tif"),
            gray_path: PathBuf::from("basemap/gray.tif"),
            proj4: "+proj=eqc +R=3396190 +units=m".into(),
            low_res_mpp: 50.0,
            high_res_mpp: 5.0,
            width_pixels: 11520,
            height_pixels: 5760,
        },
        tools: ToolPaths::default(),
        tile_size: 1024,
        workers: 4,
        force: false,
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{toml_str}");
    }

    Ok(())
}
