mod app;
mod ui;

use std::sync::Arc;

use clap::Parser;
use eframe::egui;

use sampler_atlas::net::thumbs::{OfflineLookup, OpenAccessLookup, ThumbnailLookup, ThumbnailWorker};
use sampler_atlas::source::{self, DataSource};

use app::AtlasApp;

#[derive(Parser, Debug)]
#[command(name = "sampler-atlas", version, about = "Scroll through samplers and everyday objects")]
struct Args {
    /// Story directory or base URL holding story.json, manifests and datasets
    #[arg(long, default_value = "demos")]
    story: String,

    /// Never look up thumbnails over the network
    #[arg(long)]
    offline: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let source: Arc<dyn DataSource> = match source::open(&args.story) {
        Ok(s) => Arc::from(s),
        Err(e) => {
            log::error!("cannot open story {}: {}", args.story, e);
            std::process::exit(2);
        }
    };
    let config = source::load_story(source.as_ref());
    log::info!(
        "[Story] {} steps, {} categories from {}",
        config.steps.len(),
        config.categories.len(),
        source.describe()
    );

    let lookup: Box<dyn ThumbnailLookup> = if args.offline {
        Box::new(OfflineLookup)
    } else {
        match OpenAccessLookup::from_config(&config.thumbnails) {
            Ok(l) => Box::new(l),
            Err(e) => {
                log::warn!("[Thumbs] lookups disabled: {}", e);
                Box::new(OfflineLookup)
            }
        }
    };
    let thumbs = ThumbnailWorker::spawn(lookup);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Sampler Atlas",
        options,
        Box::new(move |_cc| Ok(Box::new(AtlasApp::new(source, config, thumbs)))),
    );
    if let Err(e) = result {
        log::error!("eframe: {}", e);
        std::process::exit(1);
    }
}
