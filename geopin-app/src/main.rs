use geopin::{
    background::LookupDispatcher,
    runtime::TokioSpawner,
    services::{FixedGeolocator, NominatimClient},
    ui::{MapWidget, MapWidgetExt},
    MapController, WidgetConfig,
};
use std::sync::Arc;
use std::time::Duration;

/// Desktop viewer: `geopin-app [config.json]`
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading configuration from {}", path);
            WidgetConfig::from_file(&path)?
        }
        None => WidgetConfig::default(),
    };

    let spawner = Arc::new(TokioSpawner::current());
    let geocoder = Arc::new(NominatimClient::new(&config.geocoder)?);
    let geolocator = Arc::new(FixedGeolocator::from_config(config.user_location));

    let controller = MapController::new(config)?;
    let dispatcher = LookupDispatcher::new(spawner.clone(), geocoder, geolocator);
    let widget = MapWidget::new(&controller, spawner)?;

    // One-shot geolocation at startup
    dispatcher.locate();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("geopin"),
        ..Default::default()
    };

    eframe::run_native(
        "geopin-app",
        options,
        Box::new(move |_cc| Box::new(GeopinApp::new(controller, dispatcher, widget))),
    )?;

    Ok(())
}

struct GeopinApp {
    controller: MapController,
    dispatcher: LookupDispatcher,
    widget: MapWidget,
}

impl GeopinApp {
    fn new(controller: MapController, dispatcher: LookupDispatcher, widget: MapWidget) -> Self {
        Self {
            controller,
            dispatcher,
            widget,
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("⌖ Return to my location").clicked() {
                if let Some(request) = self.controller.on_return_to_location() {
                    self.dispatcher.submit(request);
                }
            }

            ui.separator();
            let viewport = self.controller.map().viewport();
            ui.label(format!(
                "{} | zoom {:.1}",
                viewport.center.format_lon_lat(6),
                viewport.zoom
            ));
        });
    }
}

impl eframe::App for GeopinApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.dispatcher.pump(&mut self.controller) > 0 {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                ui.map_widget(&mut self.widget, &mut self.controller, &self.dispatcher);
            });

        // Background results arrive without input events
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
