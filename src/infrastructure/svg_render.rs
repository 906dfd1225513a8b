// SVG rendering - Draws a chart model with its four-slot axis layout
use crate::application::axis_layout::{x_label_indices, NORMALIZED_DOMAIN};
use crate::application::chart_service::{series_style, ChartModel};
use crate::domain::chart::{AxisPosition, AxisSide, AxisSlot, ChartType, MIN_CHART_HEIGHT};
use crate::infrastructure::export::ExportError;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

const FONT: &str = "sans-serif";
const TITLE_HEIGHT: i32 = 18;
const TICK_LENGTH: i32 = 4;
const GRID_COLOR: RGBColor = RGBColor(229, 231, 235);
const TEXT_COLOR: RGBColor = RGBColor(55, 65, 81);
const FALLBACK_COLOR: RGBColor = RGBColor(107, 114, 128);

fn render_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Render(e.to_string())
}

fn parse_hex(color: &str) -> Option<RGBColor> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Pixel rectangle of the plotting area.
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
}

impl Frame {
    fn x(&self, index: usize, rows: usize) -> i32 {
        let band = f64::from(self.right - self.left) / rows.max(1) as f64;
        self.left + ((index as f64 + 0.5) * band).round() as i32
    }

    fn band(&self, rows: usize) -> f64 {
        f64::from(self.right - self.left) / rows.max(1) as f64
    }

    fn y(&self, value: f64, domain: (f64, f64)) -> i32 {
        let (lo, hi) = domain;
        let span = if hi - lo == 0.0 { 1.0 } else { hi - lo };
        let ratio = (value - lo) / span;
        self.bottom - (ratio * f64::from(self.bottom - self.top)).round() as i32
    }

    /// X pixel of an axis line; outer axes sit beyond their inner neighbour.
    fn axis_x(&self, model: &ChartModel, position: AxisPosition) -> i32 {
        let width = |p: AxisPosition| model.layout.slot(p).geometry.width as i32;
        match position {
            AxisPosition::InnerLeft => self.left,
            AxisPosition::OuterLeft => self.left - width(AxisPosition::InnerLeft),
            AxisPosition::InnerRight => self.right,
            AxisPosition::OuterRight => self.right + width(AxisPosition::InnerRight),
        }
    }
}

fn plot_frame(model: &ChartModel, width: u32, height: u32) -> Result<Frame, ExportError> {
    let layout = &model.layout;
    let slot_width = |p: AxisPosition| layout.slot(p).geometry.width as i32;

    let left = layout.margins.left as i32
        + slot_width(AxisPosition::InnerLeft)
        + slot_width(AxisPosition::OuterLeft);
    let right = width as i32
        - layout.margins.right as i32
        - slot_width(AxisPosition::InnerRight)
        - slot_width(AxisPosition::OuterRight);
    let top = layout.margins.top as i32 + TITLE_HEIGHT;
    let bottom = height as i32 - layout.margins.bottom as i32;

    if right <= left || bottom <= top {
        return Err(ExportError::Render(format!(
            "{}x{} leaves no room for the plot area",
            width, height
        )));
    }
    Ok(Frame { left, right, top, bottom })
}

fn draw_axis<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    model: &ChartModel,
    frame: &Frame,
    slot: &AxisSlot,
) -> Result<(), ExportError> {
    let x = frame.axis_x(model, slot.position);
    let font_size = f64::from(slot.geometry.font_size);

    // placeholders keep their geometry but draw nothing visible
    let color: RGBAColor = match (slot.is_placeholder(), parse_hex(&slot.color)) {
        (true, _) => TRANSPARENT,
        (false, Some(c)) => c.to_rgba(),
        (false, None) => FALLBACK_COLOR.to_rgba(),
    };

    root.draw(&PathElement::new(
        vec![(x, frame.top), (x, frame.bottom)],
        color.stroke_width(1),
    ))
    .map_err(render_err)?;

    let Some(domain) = slot.domain else {
        return Ok(());
    };

    let (direction, anchor) = match slot.position.side() {
        AxisSide::Left => (-1, HPos::Right),
        AxisSide::Right => (1, HPos::Left),
    };
    let label_x = x + direction * (TICK_LENGTH + 2) + slot.geometry.tick_dx;
    let style = (FONT, font_size)
        .into_font()
        .color(&color)
        .pos(Pos::new(anchor, VPos::Center));

    for tick in &slot.ticks {
        let y = frame.y(*tick, domain);
        root.draw(&PathElement::new(
            vec![(x, y), (x + direction * TICK_LENGTH, y)],
            color.stroke_width(1),
        ))
        .map_err(render_err)?;
        root.draw(&Text::new(format_tick(*tick), (label_x, y), style.clone()))
            .map_err(render_err)?;
    }

    let caption_x = x + direction * slot.geometry.label_offset as i32;
    let caption = (FONT, font_size)
        .into_font()
        .color(&color)
        .pos(Pos::new(anchor, VPos::Bottom));
    root.draw(&Text::new(slot.label.clone(), (caption_x, frame.top - 2), caption))
        .map_err(render_err)?;

    Ok(())
}

/// Render the model into an SVG document `width` pixels wide.
pub fn render_svg(model: &ChartModel, width: u32) -> Result<String, ExportError> {
    if model.is_empty() {
        return Err(ExportError::NoData);
    }

    let height = model.chart_height.max(MIN_CHART_HEIGHT);
    let frame = plot_frame(model, width, height)?;
    let rows = model.rows.len();
    let config = &model.config;
    let base_font = f64::from(model.layout.slot(AxisPosition::InnerLeft).geometry.font_size);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        root.draw(&Text::new(
            model.title.clone(),
            (frame.left, model.layout.margins.top as i32),
            (FONT, base_font + 4.0).into_font().color(&TEXT_COLOR),
        ))
        .map_err(render_err)?;

        let labels = x_label_indices(rows, model.layout.x_interval);

        if config.show_grid {
            let reference = model
                .layout
                .populated()
                .next()
                .and_then(|s| s.domain.zip(model.layout.grid_reference.as_ref()));
            if let Some((domain, ticks)) = reference {
                for tick in ticks {
                    let y = frame.y(*tick, domain);
                    root.draw(&PathElement::new(
                        vec![(frame.left, y), (frame.right, y)],
                        GRID_COLOR.stroke_width(1),
                    ))
                    .map_err(render_err)?;
                }
            }
            for index in &labels {
                let x = frame.x(*index, rows);
                root.draw(&PathElement::new(
                    vec![(x, frame.top), (x, frame.bottom)],
                    GRID_COLOR.stroke_width(1),
                ))
                .map_err(render_err)?;
            }
        }

        for slot in &model.layout.slots {
            draw_axis(&root, model, &frame, slot)?;
        }

        root.draw(&PathElement::new(
            vec![(frame.left, frame.bottom), (frame.right, frame.bottom)],
            TEXT_COLOR.stroke_width(1),
        ))
        .map_err(render_err)?;

        let x_style = (FONT, base_font)
            .into_font()
            .color(&TEXT_COLOR)
            .pos(Pos::new(HPos::Center, VPos::Top));
        for index in &labels {
            let row = &model.rows[*index];
            root.draw(&Text::new(
                row.label.clone(),
                (frame.x(*index, rows), frame.bottom + 4),
                x_style.clone(),
            ))
            .map_err(render_err)?;
        }

        let visible: Vec<_> = model.visible_series().collect();
        let bar_width = frame.band(rows) * 0.8 / visible.len().max(1) as f64;

        for (series_index, descriptor) in visible.iter().enumerate() {
            let color = parse_hex(&descriptor.color).unwrap_or(FALLBACK_COLOR);
            let style = series_style(config.chart_type, descriptor.opacity);
            let domain = model
                .layout
                .domain_for_metric(&descriptor.metric)
                .unwrap_or(NORMALIZED_DOMAIN);
            let stroke = color
                .mix(style.stroke_opacity)
                .stroke_width(style.stroke_width.round().max(1.0) as u32);

            let points: Vec<(i32, i32)> = model
                .rows
                .iter()
                .filter_map(|row| {
                    row.value(&descriptor.key)
                        .map(|v| (frame.x(row.index, rows), frame.y(v, domain)))
                })
                .collect();
            if points.is_empty() {
                continue;
            }

            match config.chart_type {
                ChartType::Line => {
                    root.draw(&PathElement::new(points, stroke)).map_err(render_err)?;
                }
                ChartType::Area => {
                    let baseline = frame.y(domain.0, domain).min(frame.bottom);
                    let mut outline = points.clone();
                    if let (Some(first), Some(last)) = (points.first(), points.last()) {
                        outline.push((last.0, baseline));
                        outline.push((first.0, baseline));
                    }
                    root.draw(&Polygon::new(outline, color.mix(style.fill_opacity).filled()))
                        .map_err(render_err)?;
                    root.draw(&PathElement::new(points, stroke)).map_err(render_err)?;
                }
                ChartType::Bar => {
                    let baseline = frame.y(domain.0, domain).min(frame.bottom);
                    let offset = (series_index as f64 - visible.len() as f64 / 2.0) * bar_width;
                    for (x, y) in points {
                        let x0 = x + offset.round() as i32;
                        let x1 = x0 + bar_width.round().max(1.0) as i32;
                        root.draw(&Rectangle::new(
                            [(x0, y), (x1, baseline)],
                            color.mix(style.fill_opacity).filled(),
                        ))
                        .map_err(render_err)?;
                    }
                }
            }
        }

        if config.show_legend {
            let legend_style = (FONT, base_font).into_font().color(&TEXT_COLOR);
            let mut x = frame.left;
            let y = height as i32 - 12;
            for entry in model.legend.iter().filter(|e| !e.hidden) {
                let color = parse_hex(&entry.color).unwrap_or(FALLBACK_COLOR);
                root.draw(&Rectangle::new([(x, y - 4), (x + 10, y + 4)], color.filled()))
                    .map_err(render_err)?;
                root.draw(&Text::new(entry.label.clone(), (x + 14, y - 6), legend_style.clone()))
                    .map_err(render_err)?;
                x += 24 + (entry.label.chars().count() as f64 * base_font * 0.6) as i32;
            }
        }

        root.present().map_err(render_err)?;
    }

    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_service::ChartService;
    use crate::domain::chart::ChartSession;
    use crate::domain::metric::{Locale, MetricCode};
    use crate::domain::telemetry::{DataPoint, RawSeries};
    use chrono::{Duration, TimeZone, Utc};

    fn service(chart_type: ChartType) -> ChartService {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let points = |values: &[f64]| {
            values
                .iter()
                .enumerate()
                .map(|(i, v)| DataPoint::new(t0 + Duration::minutes(15 * i as i64), *v))
                .collect::<Vec<_>>()
        };
        let mut svc = ChartService::new("Floor 3", ChartSession::default(), Locale::En);
        svc.set_data(vec![
            RawSeries::new("env", MetricCode::Temperature, points(&[21.0, 22.5, 23.0])),
            RawSeries::new("meter", MetricCode::Power, points(&[40.0, 55.0, 61.0])),
        ]);
        svc.set_chart_type(chart_type);
        svc
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#ef4444"), Some(RGBColor(0xef, 0x44, 0x44)));
        assert_eq!(parse_hex("transparent"), None);
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#1é234"), None);
        assert_eq!(parse_hex("#12345é"), None);
    }

    #[test]
    fn test_non_ascii_series_color_falls_back() {
        let mut session = ChartSession::default();
        session
            .config
            .custom_colors
            .insert("env_temperature".to_string(), "#1é234".to_string());
        let mut svc = ChartService::new("Stored", session, Locale::En);
        svc.set_data(service(ChartType::Line).series().to_vec());

        let svg = render_svg(&svc.recompute(), 1024).unwrap();
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn test_line_chart_svg() {
        let model = service(ChartType::Line).recompute();
        let svg = render_svg(&model, 1024).unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Floor 3"));
        assert!(svg.contains("08:15"));
        assert!(svg.contains("<polyline"));
        assert_eq!(svg, render_svg(&model, 1024).unwrap());
    }

    #[test]
    fn test_bar_and_area_shapes() {
        let bars = render_svg(&service(ChartType::Bar).recompute(), 1024).unwrap();
        assert!(bars.matches("<rect").count() >= 6);

        let area = render_svg(&service(ChartType::Area).recompute(), 1024).unwrap();
        assert!(area.contains("<polygon"));
    }

    #[test]
    fn test_hidden_series_not_drawn() {
        let mut svc = service(ChartType::Line);
        let all = render_svg(&svc.recompute(), 1024).unwrap();
        svc.toggle_visibility("meter_power").unwrap();
        let one = render_svg(&svc.recompute(), 1024).unwrap();
        assert!(one.matches("<polyline").count() < all.matches("<polyline").count());
    }

    #[test]
    fn test_empty_and_cramped_models_fail() {
        let mut empty = ChartService::new("Empty", ChartSession::default(), Locale::En);
        assert!(matches!(render_svg(&empty.recompute(), 1024), Err(ExportError::NoData)));

        let model = service(ChartType::Line).recompute();
        assert!(matches!(render_svg(&model, 200), Err(ExportError::Render(_))));
    }
}
