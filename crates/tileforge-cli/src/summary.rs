use console::Style;
use tileforge_core::pipeline::config::PipelineConfig;
use tileforge_core::pipeline::RunSummary;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    path: Style,
    bad: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            path: Style::new().underlined(),
            bad: Style::new().red().bold(),
        }
    }
}

pub fn print_pipeline_summary(config: &PipelineConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Tileforge Pipeline"));
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Image set"),
        s.value.apply_to(&config.set_name)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_folder.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Basemap"),
        s.path.apply_to(config.basemap.color_path.display())
    );
    println!(
        "  {:<14}{} -> {} m/px",
        s.label.apply_to("Resolution"),
        s.value.apply_to(config.basemap.low_res_mpp),
        s.value.apply_to(config.basemap.high_res_mpp)
    );
    println!(
        "  {:<14}{} px, {} workers{}",
        s.label.apply_to("Tiles"),
        s.value.apply_to(config.tile_size),
        s.value.apply_to(config.workers),
        if config.force { ", forced" } else { "" }
    );
    println!();
}

pub fn print_run_summary(summary: &RunSummary) {
    let s = Styles::new();

    println!();
    println!(
        "  {:<14}{} of {} tiles completed",
        s.label.apply_to("Result"),
        s.value.apply_to(summary.tiles_completed),
        s.value.apply_to(summary.tiles_total)
    );
    if !summary.failed_tiles.is_empty() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Failed"),
            s.bad.apply_to(summary.failed_tiles.join(", "))
        );
    }
    println!();
}
