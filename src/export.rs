//! Card export pipeline.
//!
//! Selects a renderer variant through the tagged `RenderRequest`, draws it
//! onto a fixed-size raster surface, and writes the PNG to a user-chosen
//! path. The save prompt is a collaborator: a cancelled prompt aborts the
//! export with no side effect. Writes are atomic: the PNG lands in a temp
//! file beside the destination and is persisted in one step, so a failed
//! export leaves no partial file.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use image::RgbaImage;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::{FilterMode, ListQuery};
use crate::render::layout::{
    self, CardImages, CardTheme, ListRow, RenderRequest, CANVAS_HEIGHT, CANVAS_WIDTH,
};
use crate::render::raster::RasterSurface;
use crate::render::RenderError;
use crate::status;
use crate::store::AppointmentStore;
use crate::{assets, reminder::Clock};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Export I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no appointments in the current view")]
    NothingToExport,
}

/// Save-path collaborator: returns the chosen path, or `None` when the
/// operator cancelled.
pub trait SavePrompt {
    fn choose_path(&self, suggested_name: &str) -> Option<PathBuf>;
}

/// Prompt that always picks a fixed path. Useful headless and in tests.
pub struct FixedPathPrompt(pub PathBuf);

impl SavePrompt for FixedPathPrompt {
    fn choose_path(&self, _suggested_name: &str) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Everything the renderer needs besides the record data.
pub struct ExportAssets {
    pub font: ab_glyph::FontArc,
    pub bold: Option<ab_glyph::FontArc>,
    pub images: CardImages,
    pub theme: CardTheme,
}

impl ExportAssets {
    /// Discovers the export font and optional card imagery.
    pub fn discover() -> Result<Self, RenderError> {
        Ok(Self {
            font: assets::load_export_font()?,
            bold: assets::load_export_bold_font(),
            images: assets::load_card_images(),
            theme: CardTheme::default(),
        })
    }
}

/// Default filename offered to the save prompt.
pub fn suggested_filename(request: &RenderRequest) -> String {
    match request {
        RenderRequest::Greeting(record) => {
            format!("card-{}.png", record.person.trim().replace(' ', "-"))
        }
        RenderRequest::ListReport { .. } => "appointment-schedule.png".into(),
    }
}

/// Renders the request and writes it as a PNG to a prompted path.
/// Returns `Ok(None)` when the prompt was cancelled.
pub fn export_card(
    request: &RenderRequest,
    prompt: &dyn SavePrompt,
    assets: &ExportAssets,
) -> Result<Option<PathBuf>, ExportError> {
    let Some(path) = prompt.choose_path(&suggested_filename(request)) else {
        tracing::debug!("Card export cancelled at path prompt");
        return Ok(None);
    };

    let mut surface = RasterSurface::new(
        CANVAS_WIDTH as u32,
        CANVAS_HEIGHT as u32,
        assets.font.clone(),
    );
    if let Some(bold) = &assets.bold {
        surface = surface.with_bold(bold.clone());
    }

    layout::render(request, &mut surface, &assets.images, &assets.theme);
    write_png_atomic(&surface.into_image(), &path)?;

    tracing::info!(path = %path.display(), "Card exported");
    Ok(Some(path))
}

/// Exports the list/report card for today's appointments, ordered by
/// scheduled time. An empty day is an error surfaced to the caller, not a
/// blank card.
pub fn export_today_report(
    store: &dyn AppointmentStore,
    clock: &dyn Clock,
    prompt: &dyn SavePrompt,
    assets: &ExportAssets,
) -> Result<Option<PathBuf>, ExportError> {
    let rows = collect_today_rows(store, clock.now())?;
    let request = RenderRequest::ListReport {
        title: assets.theme.report_title.clone(),
        rows,
    };
    export_card(&request, prompt, assets)
}

/// Today's rows in scheduled order; empty is `NothingToExport`.
fn collect_today_rows(
    store: &dyn AppointmentStore,
    now: NaiveDateTime,
) -> Result<Vec<ListRow>, ExportError> {
    let records = store.list()?;
    let today = status::apply_query(&records, &ListQuery::with_mode(FilterMode::Today), now);
    if today.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    Ok(today.iter().map(ListRow::from).collect())
}

/// Encodes the canvas as PNG and moves it into place in one step.
fn write_png_atomic(image: &RgbaImage, path: &Path) -> Result<(), ExportError> {
    let mut encoded = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
        .map_err(|e| RenderError::Encode(e.to_string()))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let tmp = NamedTempFile::new_in(&dir)?;
    std::fs::write(tmp.path(), &encoded)?;
    tmp.persist(path).map_err(|e| ExportError::Io(e.error))?;
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
