//! egui front end for [`MapController`].
//!
//! The widget draws the basemap, the marker, the popup and the front dialog,
//! and turns pointer input into map operations. Lookups raised by clicks are
//! handed to a [`LookupDispatcher`]; tiles and the marker icon are downloaded
//! through the runtime given to [`MapWidget::new`].

use crate::{
    background::LookupDispatcher,
    controller::MapController,
    core::geo::{Point, TileCoord},
    layers::{base::LayerTrait, tile::TilePlacement},
    runtime::{spawn, AsyncSpawner},
    tiles::{TileCache, TileImage, TileLoader},
    Result,
};
use crossbeam_channel::Receiver;
use egui::{
    Align2, Color32, ColorImage, CursorIcon, FontId, Pos2, Rect, Response, Sense, Stroke,
    TextureHandle, TextureOptions, Ui, Vec2,
};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Zoom levels per point of scroll
const ZOOM_PER_SCROLL: f64 = 1.0 / 200.0;

/// GPU textures kept alive alongside the decoded tile cache
const TEXTURE_CACHE_SIZE: usize = 256;

const BACKGROUND: Color32 = Color32::from_rgb(230, 230, 230);
const PIN_COLOR: Color32 = Color32::from_rgb(220, 50, 50);

/// What happened during one frame of the widget
pub struct WidgetResponse {
    pub response: Response,
    /// Lookups submitted because of clicks this frame
    pub lookups: usize,
    pub popup_dismissed: bool,
    pub dialog_dismissed: bool,
}

pub struct MapWidget {
    loader: TileLoader,
    textures: LruCache<TileCoord, TextureHandle>,
    icon: Option<TextureHandle>,
    icon_rx: Option<Receiver<Result<TileImage>>>,
}

impl MapWidget {
    /// Creates the widget for `controller`'s basemap and starts loading the
    /// marker icon.
    pub fn new(controller: &MapController, spawner: Arc<dyn AsyncSpawner>) -> Result<Self> {
        let config = controller.config();
        let source = match controller.basemap() {
            Some(basemap) => basemap.source(),
            None => {
                return Err(crate::MapError::Layer(
                    "the controller has no basemap".to_string(),
                ))
            }
        };
        let loader = TileLoader::new(
            source,
            Arc::clone(&spawner),
            TileCache::new(config.tiles.cache_size),
            &config.tiles.user_agent,
        )?;

        let (tx, rx) = crossbeam_channel::bounded(1);
        let client = reqwest::Client::builder()
            .user_agent(config.tiles.user_agent.as_str())
            .build()?;
        let url = config.marker.icon_src.clone();
        spawn(spawner.as_ref(), async move {
            let _ = tx.send(fetch_icon(&client, &url).await);
        });

        Ok(Self {
            loader,
            textures: LruCache::new(
                NonZeroUsize::new(TEXTURE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            ),
            icon: None,
            icon_rx: Some(rx),
        })
    }

    pub fn show(
        &mut self,
        ui: &mut Ui,
        controller: &mut MapController,
        dispatcher: &LookupDispatcher,
    ) -> WidgetResponse {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        controller
            .map_mut()
            .set_size(Point::new(rect.width() as f64, rect.height() as f64));

        self.handle_input(ui, rect, &response, controller);

        let lookups = controller.handle_map_events();
        let lookup_count = lookups.len();
        dispatcher.submit_all(lookups);

        self.poll_icon(ui.ctx());
        self.loader.poll();

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKGROUND);
        self.draw_tiles(ui, rect, controller);
        self.draw_marker(&painter, rect, controller);
        if let Some(basemap) = controller.basemap() {
            painter.text(
                rect.left_bottom() + Vec2::new(5.0, -5.0),
                Align2::LEFT_BOTTOM,
                basemap.attribution(),
                FontId::proportional(10.0),
                Color32::from_gray(80),
            );
        }

        let popup_dismissed = self.show_popup(ui.ctx(), rect, controller);
        let dialog_dismissed = show_dialog(ui.ctx(), controller);

        if self.loader.pending_count() > 0 || self.icon_rx.is_some() {
            ui.ctx().request_repaint();
        }

        WidgetResponse {
            response,
            lookups: lookup_count,
            popup_dismissed,
            dialog_dismissed,
        }
    }

    fn handle_input(
        &self,
        ui: &Ui,
        rect: Rect,
        response: &Response,
        controller: &mut MapController,
    ) {
        let map = controller.map_mut();

        if response.dragged() {
            let delta = response.drag_delta();
            map.pan(Point::new(-delta.x as f64, -delta.y as f64));
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        } else if response.hovered() {
            ui.ctx().set_cursor_icon(CursorIcon::Grab);
        }

        if let Some(hover) = response.hover_pos() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                map.zoom_by(scroll as f64 * ZOOM_PER_SCROLL, to_map(rect, hover));
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                map.click_at(to_map(rect, pos));
            }
        }
    }

    fn draw_tiles(&mut self, ui: &Ui, rect: Rect, controller: &MapController) {
        let Some(basemap) = controller.basemap() else {
            return;
        };
        if !basemap.is_visible() {
            return;
        }
        let painter = ui.painter_at(rect);
        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));

        for placement in basemap.visible_tiles(controller.map().viewport()) {
            let Some(texture) = self.texture_for(ui.ctx(), placement.coord) else {
                continue;
            };
            painter.image(texture, tile_rect(rect, &placement), uv, Color32::WHITE);
        }
    }

    fn texture_for(&mut self, ctx: &egui::Context, coord: TileCoord) -> Option<egui::TextureId> {
        if let Some(texture) = self.textures.get(&coord) {
            return Some(texture.id());
        }
        let tile = self.loader.request(coord)?;
        let texture = ctx.load_texture(
            format!("tile_{}_{}_{}", coord.z, coord.x, coord.y),
            to_color_image(&tile),
            TextureOptions::LINEAR,
        );
        let id = texture.id();
        self.textures.put(coord, texture);
        Some(id)
    }

    fn poll_icon(&mut self, ctx: &egui::Context) {
        let Some(rx) = &self.icon_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(image)) => {
                self.icon = Some(ctx.load_texture(
                    "marker_icon",
                    to_color_image(&image),
                    TextureOptions::LINEAR,
                ));
                self.icon_rx = None;
            }
            Ok(Err(e)) => {
                log::warn!("marker icon unavailable, drawing a pin instead: {}", e);
                self.icon_rx = None;
            }
            Err(crossbeam_channel::TryRecvError::Empty) => {}
            Err(crossbeam_channel::TryRecvError::Disconnected) => self.icon_rx = None,
        }
    }

    fn draw_marker(&self, painter: &egui::Painter, rect: Rect, controller: &MapController) {
        let Some(marker) = controller.marker() else {
            return;
        };
        let viewport = controller.map().viewport();
        let tip = to_screen(rect, viewport.projected_to_pixel(&marker.position()));
        let size = marker.style().display_size() as f32;
        let icon_rect = marker_rect(tip, size);

        match &self.icon {
            Some(icon) => {
                painter.image(
                    icon.id(),
                    icon_rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None => {
                let head = Pos2::new(tip.x, icon_rect.top() + size * 0.35);
                painter.line_segment([head, tip], Stroke::new(2.0, PIN_COLOR));
                painter.circle(head, size * 0.35, PIN_COLOR, Stroke::new(1.5, Color32::WHITE));
            }
        };
    }

    /// Draws the popup above its anchor. Returns whether it was closed.
    fn show_popup(&self, ctx: &egui::Context, rect: Rect, controller: &mut MapController) -> bool {
        let Some(popup) = controller.popup() else {
            return false;
        };
        let (Some(anchor), Some(content)) = (popup.anchor(), popup.content()) else {
            return false;
        };
        let viewport = controller.map().viewport();
        let tip = to_screen(rect, viewport.projected_to_pixel(&anchor));
        let size = controller
            .marker()
            .map(|marker| marker.style().display_size() as f32)
            .unwrap_or(0.0);
        let template = popup.template();

        let mut close = false;
        egui::Area::new(egui::Id::new("geopin_popup"))
            .order(egui::Order::Foreground)
            .fixed_pos(Pos2::new(tip.x, tip.y - size - 4.0))
            .pivot(Align2::CENTER_BOTTOM)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(280.0);
                    ui.horizontal(|ui| {
                        ui.heading(&template.title);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                            if ui.small_button("×").clicked() {
                                close = true;
                            }
                        });
                    });
                    ui.label(format!("{}: {}", template.address_label, content.address));
                    ui.label(format!(
                        "{}: {}",
                        template.coordinates_label,
                        content.coordinates_text()
                    ));
                });
            });

        if close {
            controller.dismiss_popup();
        }
        close
    }
}

/// Shows the front dialog as a modal window. Returns whether it was dismissed.
pub fn show_dialog(ctx: &egui::Context, controller: &mut MapController) -> bool {
    let Some(alert) = controller.dialogs().current() else {
        return false;
    };
    let mut ok = false;
    egui::Window::new(alert.title.as_str())
        .id(egui::Id::new("geopin_dialog"))
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(alert.text.as_str());
            ui.vertical_centered(|ui| {
                if ui.button("OK").clicked() {
                    ok = true;
                }
            });
        });

    if ok {
        controller.dismiss_dialog();
    }
    ok
}

/// Extension trait so the widget reads like a regular `ui` call
pub trait MapWidgetExt {
    fn map_widget(
        &mut self,
        widget: &mut MapWidget,
        controller: &mut MapController,
        dispatcher: &LookupDispatcher,
    ) -> WidgetResponse;
}

impl MapWidgetExt for Ui {
    fn map_widget(
        &mut self,
        widget: &mut MapWidget,
        controller: &mut MapController,
        dispatcher: &LookupDispatcher,
    ) -> WidgetResponse {
        widget.show(self, controller, dispatcher)
    }
}

async fn fetch_icon(client: &reqwest::Client, url: &str) -> Result<TileImage> {
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    TileImage::decode(&bytes)
}

fn to_color_image(image: &TileImage) -> ColorImage {
    ColorImage::from_rgba_unmultiplied(
        [image.width as usize, image.height as usize],
        &image.pixels,
    )
}

/// Screen position to container pixel
fn to_map(rect: Rect, pos: Pos2) -> Point {
    Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)
}

/// Container pixel to screen position
fn to_screen(rect: Rect, pixel: Point) -> Pos2 {
    Pos2::new(rect.min.x + pixel.x as f32, rect.min.y + pixel.y as f32)
}

fn tile_rect(rect: Rect, placement: &TilePlacement) -> Rect {
    Rect::from_min_max(to_screen(rect, placement.min), to_screen(rect, placement.max))
}

/// The icon's bottom center sits on the marked coordinate
fn marker_rect(tip: Pos2, size: f32) -> Rect {
    Rect::from_min_size(Pos2::new(tip.x - size / 2.0, tip.y - size), Vec2::splat(size))
}
