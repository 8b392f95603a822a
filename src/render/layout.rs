//! Card layout engine.
//!
//! One engine renders both export variants behind a tagged request:
//! a greeting card for a single appointment, or a list/report card for the
//! currently visible rows. Both share the outer card, the accent header
//! band with a shadowed centered title, and the badge primitive: a rounded,
//! near-opaque light panel drawn behind dark text so the text stays legible
//! over photographic or textured backgrounds.
//!
//! The greeting card measures the wrapped name height before any later
//! element is placed; every subsequent panel offset is derived from that
//! measurement. The list card draws rows only while they fit the table
//! region and silently omits the rest.

use chrono::NaiveDateTime;
use image::DynamicImage;

use crate::models::Appointment;
use crate::render::surface::{
    Color, Direction, HAlign, Rect, RenderSurface, ScaleMode, TextStyle,
};

/// Logical canvas size for every exported card.
pub const CANVAS_WIDTH: i32 = 2400;
pub const CANVAS_HEIGHT: i32 = 1600;

const CARD_MARGIN: i32 = 40;
const CARD_RADIUS: i32 = 26;
const HEADER_INSET: i32 = 20;
const HEADER_RADIUS: i32 = 16;
const GREETING_HEADER_HEIGHT: i32 = 220;
const LIST_HEADER_HEIGHT: i32 = 120;

const NAME_PANEL_MAX_HEIGHT: i32 = 240;
const NAME_GAP: i32 = 26;
const INFO_LINE_HEIGHT: i32 = 58;
const INFO_LINE_GAP: i32 = 10;

const ROW_HEIGHT: i32 = 48;
const ROW_GAP: i32 = 4;
/// Explicit widths for index, name, phone, address, date, time; the
/// companions column takes the remaining width.
const COLUMN_WIDTHS: [i32; 6] = [60, 270, 220, 240, 200, 140];

const TITLE_SIZE: f32 = 40.0;
const NAME_SIZE: f32 = 46.0;
const INFO_SIZE: f32 = 24.0;
const NOTES_SIZE: f32 = 22.0;
const TABLE_HEADER_SIZE: f32 = 18.0;
const TABLE_ROW_SIZE: f32 = 16.0;

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%I:%M %p";

/// Data for a single-record greeting card.
#[derive(Debug, Clone)]
pub struct CardRecord {
    pub person: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub companions: Option<String>,
    pub scheduled_at: NaiveDateTime,
}

impl From<&Appointment> for CardRecord {
    fn from(a: &Appointment) -> Self {
        Self {
            person: a.person.clone(),
            phone: a.phone.clone(),
            address: a.address.clone(),
            notes: a.notes.clone(),
            companions: a.companions.clone(),
            scheduled_at: a.scheduled_at,
        }
    }
}

/// One table row of a list/report card.
#[derive(Debug, Clone)]
pub struct ListRow {
    pub person: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub scheduled_at: NaiveDateTime,
    pub companions: Option<String>,
}

impl From<&Appointment> for ListRow {
    fn from(a: &Appointment) -> Self {
        Self {
            person: a.person.clone(),
            phone: a.phone.clone(),
            address: a.address.clone(),
            scheduled_at: a.scheduled_at,
            companions: a.companions.clone(),
        }
    }
}

/// Which card to render.
#[derive(Debug, Clone)]
pub enum RenderRequest {
    Greeting(CardRecord),
    ListReport { title: String, rows: Vec<ListRow> },
}

/// Optional imagery placed in the header band. Absent images leave their
/// region blank; that is never an error.
#[derive(Default)]
pub struct CardImages {
    pub subject: Option<DynamicImage>,
    pub logo: Option<DynamicImage>,
}

/// Field labels drawn on cards. Swappable as a unit so a deployment can
/// relabel without touching layout code.
#[derive(Debug, Clone)]
pub struct FieldLabels {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub date: String,
    pub time: String,
    pub companions: String,
    pub notes: String,
}

impl Default for FieldLabels {
    fn default() -> Self {
        Self {
            name: "Name".into(),
            phone: "Phone".into(),
            address: "Address".into(),
            date: "Date".into(),
            time: "Time".into(),
            companions: "Companions".into(),
            notes: "Notes".into(),
        }
    }
}

/// Colors, titles, and paragraph direction for both card variants.
#[derive(Debug, Clone)]
pub struct CardTheme {
    pub background: Color,
    pub card_fill: Color,
    pub card_border: Color,
    pub accent: Color,
    pub accent_text: Color,
    pub badge_fill: Color,
    pub badge_border: Color,
    pub title_ink: Color,
    pub title_shadow: Color,
    pub ink: Color,
    pub notes_ink: Color,
    pub greeting_title: String,
    pub report_title: String,
    pub direction: Direction,
    pub labels: FieldLabels,
}

impl Default for CardTheme {
    fn default() -> Self {
        Self {
            background: Color::rgb(0xf7, 0xf6, 0xf3),
            card_fill: Color::rgba(255, 255, 255, 220),
            card_border: Color::rgba(0, 0, 0, 25),
            accent: Color::rgba(255, 140, 58, 235),
            accent_text: Color::rgb(0xff, 0x8c, 0x3a),
            badge_fill: Color::rgba(255, 255, 255, 245),
            badge_border: Color::rgba(0, 0, 0, 25),
            title_ink: Color::rgb(0x14, 0x14, 0x14),
            title_shadow: Color::rgba(0, 0, 0, 70),
            ink: Color::rgb(0x11, 0x11, 0x11),
            notes_ink: Color::rgb(0x22, 0x22, 0x22),
            greeting_title: "Appointment Card".into(),
            report_title: "Today's Appointments".into(),
            direction: Direction::Ltr,
            labels: FieldLabels::default(),
        }
    }
}

/// Renders a card onto the surface. The surface is expected to match the
/// logical canvas size; a mismatched surface is a programmer error and
/// simply draws out of frame.
pub fn render(
    request: &RenderRequest,
    surface: &mut dyn RenderSurface,
    images: &CardImages,
    theme: &CardTheme,
) {
    match request {
        RenderRequest::Greeting(record) => greeting_card(surface, record, images, theme),
        RenderRequest::ListReport { title, rows } => list_card(surface, title, rows, images, theme),
    }
}

// ─── Shared primitives ────────────────────────────────────────────────────────

/// Rounded, near-opaque light panel behind text: guarantees contrast
/// against whatever is rendered beneath.
fn draw_badge(surface: &mut dyn RenderSurface, rect: Rect, radius: i32, theme: &CardTheme) {
    surface.fill_round_rect(rect, radius, theme.badge_fill, Some((theme.badge_border, 2)));
}

/// Centered title with a drop-shadow duplicate drawn first (offset +2,+2 at
/// lower opacity) so the solid ink stays readable over the accent band.
fn draw_center_title(surface: &mut dyn RenderSurface, rect: Rect, text: &str, theme: &CardTheme) {
    let shadow = TextStyle::new(TITLE_SIZE, theme.title_shadow)
        .bold()
        .align(HAlign::Center)
        .middle()
        .direction(theme.direction);
    surface.draw_text(rect.offset(2, 2), text, &shadow);

    let ink = TextStyle::new(TITLE_SIZE, theme.title_ink)
        .bold()
        .align(HAlign::Center)
        .middle()
        .direction(theme.direction);
    surface.draw_text(rect, text, &ink);
}

fn card_frame(surface: &mut dyn RenderSurface, theme: &CardTheme) -> Rect {
    surface.fill(theme.background);
    let card = Rect::new(
        CARD_MARGIN,
        CARD_MARGIN,
        CANVAS_WIDTH - 2 * CARD_MARGIN,
        CANVAS_HEIGHT - 2 * CARD_MARGIN,
    );
    surface.fill_round_rect(card, CARD_RADIUS, theme.card_fill, Some((theme.card_border, 2)));
    card
}

fn header_band(
    surface: &mut dyn RenderSurface,
    card: Rect,
    height: i32,
    theme: &CardTheme,
) -> Rect {
    let header = Rect::new(
        card.x + HEADER_INSET,
        card.y + HEADER_INSET,
        card.w - 2 * HEADER_INSET,
        height,
    );
    surface.fill_round_rect(header, HEADER_RADIUS, theme.accent, None);
    header
}

fn value_or_dash(value: Option<&str>) -> &str {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => "-",
    }
}

// ─── Greeting card ────────────────────────────────────────────────────────────

fn greeting_card(
    surface: &mut dyn RenderSurface,
    record: &CardRecord,
    images: &CardImages,
    theme: &CardTheme,
) {
    let card = card_frame(surface, theme);
    let header = header_band(surface, card, GREETING_HEADER_HEIGHT, theme);

    if let Some(subject) = &images.subject {
        surface.blit_image(
            Rect::new(header.x + 20, header.y + 20, 180, 180),
            subject,
            ScaleMode::Fill,
        );
    }
    if let Some(logo) = &images.logo {
        surface.blit_image(
            Rect::new(header.right() - 200, header.y + 20, 180, 180),
            logo,
            ScaleMode::Fit,
        );
    }
    draw_center_title(surface, header, &theme.greeting_title, theme);

    let content = Rect::new(
        card.x + 40,
        header.bottom() + 30,
        card.w - 80,
        card.h - 280,
    );

    // Name panel: measure the wrapped height first; every later offset
    // depends on it.
    let name_rect = Rect::new(content.x, content.y, content.w, NAME_PANEL_MAX_HEIGHT);
    let name_style = TextStyle::new(NAME_SIZE, theme.ink)
        .bold()
        .direction(theme.direction);
    let measured = surface.measure_text(&record.person, name_rect.w, &name_style);
    draw_badge(surface, name_rect, 18, theme);
    surface.draw_text(name_rect, &record.person, &name_style);

    let mut y = content.y + measured.min(NAME_PANEL_MAX_HEIGHT) + NAME_GAP;

    let labels = &theme.labels;
    let date = record.scheduled_at.format(DATE_FORMAT);
    let time = record.scheduled_at.format(TIME_FORMAT);
    let info_lines = [
        format!("{}: {}", labels.phone, value_or_dash(record.phone.as_deref())),
        format!("{}: {}", labels.address, value_or_dash(record.address.as_deref())),
        format!("{}: {}  |  {}: {}", labels.date, date, labels.time, time),
        format!(
            "{}: {}",
            labels.companions,
            value_or_dash(record.companions.as_deref())
        ),
    ];

    let info_style = TextStyle::new(INFO_SIZE, theme.ink)
        .middle()
        .direction(theme.direction);
    for line in &info_lines {
        let rect = Rect::new(content.x, y, content.w, INFO_LINE_HEIGHT);
        draw_badge(surface, rect, 14, theme);
        surface.draw_text(rect, line, &info_style);
        y += INFO_LINE_HEIGHT + INFO_LINE_GAP;
    }

    // Notes panel fills whatever vertical space remains.
    let notes_top = y + 10;
    let notes_rect = Rect::new(
        content.x,
        notes_top,
        content.w,
        content.bottom() - notes_top - 20,
    );
    draw_badge(surface, notes_rect, 16, theme);
    let notes_text = format!(
        "{}:\n{}",
        labels.notes,
        value_or_dash(record.notes.as_deref())
    );
    let notes_style = TextStyle::new(NOTES_SIZE, theme.notes_ink).direction(theme.direction);
    surface.draw_text(notes_rect, &notes_text, &notes_style);
}

// ─── List/report card ─────────────────────────────────────────────────────────

fn column_widths(table: Rect) -> [i32; 7] {
    let fixed: i32 = COLUMN_WIDTHS.iter().sum();
    [
        COLUMN_WIDTHS[0],
        COLUMN_WIDTHS[1],
        COLUMN_WIDTHS[2],
        COLUMN_WIDTHS[3],
        COLUMN_WIDTHS[4],
        COLUMN_WIDTHS[5],
        table.w - fixed - 30,
    ]
}

fn draw_cells(
    surface: &mut dyn RenderSurface,
    table: Rect,
    y: i32,
    widths: &[i32; 7],
    cells: &[String; 7],
    style: &TextStyle,
) {
    let mut x = table.x + 15;
    for (cell, width) in cells.iter().zip(widths) {
        surface.draw_text(Rect::new(x, y, *width, ROW_HEIGHT), cell, style);
        x += width;
    }
}

fn list_card(
    surface: &mut dyn RenderSurface,
    title: &str,
    rows: &[ListRow],
    images: &CardImages,
    theme: &CardTheme,
) {
    let card = card_frame(surface, theme);
    let header = header_band(surface, card, LIST_HEADER_HEIGHT, theme);

    if let Some(logo) = &images.logo {
        surface.blit_image(
            Rect::new(header.x + 26, header.y + 8, 110, 110),
            logo,
            ScaleMode::Fit,
        );
    }
    draw_center_title(surface, header, title, theme);

    let table = Rect::new(card.x + 20, card.y + 160, card.w - 40, card.h - 190);
    surface.fill_round_rect(
        table,
        HEADER_RADIUS,
        Color::rgba(255, 255, 255, 235),
        Some((Color::rgba(0, 0, 0, 30), 2)),
    );

    let widths = column_widths(table);
    let labels = &theme.labels;
    let headers = [
        "#".to_string(),
        labels.name.clone(),
        labels.phone.clone(),
        labels.address.clone(),
        labels.date.clone(),
        labels.time.clone(),
        labels.companions.clone(),
    ];

    let mut y = table.y + 15;
    let header_style = TextStyle::new(TABLE_HEADER_SIZE, theme.accent_text)
        .bold()
        .middle()
        .direction(theme.direction);
    draw_cells(surface, table, y, &widths, &headers, &header_style);
    y += ROW_HEIGHT + 8;

    let row_style = TextStyle::new(TABLE_ROW_SIZE, theme.notes_ink)
        .middle()
        .direction(theme.direction);
    let mut drawn = 0_usize;
    for (idx, row) in rows.iter().enumerate() {
        // Rows past the table's bottom bound are silently omitted: no
        // pagination, no truncation marker.
        if y + ROW_HEIGHT > table.bottom() - 15 {
            break;
        }
        let badge = Rect::new(table.x + 10, y, table.w - 20, ROW_HEIGHT);
        draw_badge(surface, badge, 10, theme);

        let cells = [
            (idx + 1).to_string(),
            row.person.clone(),
            value_or_dash(row.phone.as_deref()).to_string(),
            value_or_dash(row.address.as_deref()).to_string(),
            row.scheduled_at.format(DATE_FORMAT).to_string(),
            row.scheduled_at.format(TIME_FORMAT).to_string(),
            value_or_dash(row.companions.as_deref()).to_string(),
        ];
        draw_cells(surface, table, y, &widths, &cells, &row_style);

        y += ROW_HEIGHT + ROW_GAP;
        drawn += 1;
    }

    if drawn < rows.len() {
        tracing::debug!(drawn, total = rows.len(), "List card rows omitted for space");
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
