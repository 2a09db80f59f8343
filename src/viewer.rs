//! Desktop window that displays a rendered figure, with a "Save as…" dialog.

use crate::figure::Figure;
use anyhow::{Result, anyhow};
use eframe::egui;

struct ViewerApp {
    figure: Figure,
    pixels: Vec<u8>,
    size: [usize; 2],
    texture: Option<egui::TextureHandle>,
    status: String,
}

impl ViewerApp {
    fn new(figure: Figure) -> Result<Self> {
        let (pixels, w, h) = crate::viz::render_rgb(&figure)?;
        Ok(Self {
            figure,
            pixels,
            size: [w as usize, h as usize],
            texture: None,
            status: String::new(),
        })
    }

    fn save_as(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .add_filter("SVG", &["svg"])
            .add_filter("JPEG", &["jpg", "jpeg"])
            .add_filter("HTML", &["html"])
            .set_file_name("chart.png")
            .save_file()
        else {
            return;
        };
        self.status = match self.figure.save(&path) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => {
                log::error!("saving {} failed: {e:#}", path.display());
                format!("Error: {e:#}")
            }
        };
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let texture = self
            .texture
            .get_or_insert_with(|| {
                let image = egui::ColorImage::from_rgb(self.size, &self.pixels);
                ctx.load_texture("figure", image, egui::TextureOptions::LINEAR)
            })
            .clone();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Save as…").clicked() {
                    self.save_as();
                }
                if !self.status.is_empty() {
                    ui.label(&self.status);
                }
            });
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                ui.add(egui::Image::new(&texture).shrink_to_fit());
            });
        });
    }
}

/// Open a window showing `fig`; blocks until the window is closed.
pub fn show(fig: &Figure, title: &str) -> Result<()> {
    let app = ViewerApp::new(fig.clone())?;
    let window_title = if title.is_empty() { "Chart" } else { title };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([fig.layout.width as f32 + 20.0, fig.layout.height as f32 + 60.0])
            .with_min_inner_size([300.0, 200.0])
            .with_title(window_title),
        ..Default::default()
    };
    eframe::run_native(
        window_title,
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
