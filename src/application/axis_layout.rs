// Axis layout engine - Slot assignment, domains, ticks and responsive geometry
use crate::domain::chart::{
    AxisGeometry, AxisLayout, AxisOverride, AxisPosition, AxisSlot, Margins, OverflowBinding,
    SeriesDescriptor, ViewportClass, XAxisOverride, XTickInterval, MAX_TICK_COUNT, MIN_TICK_COUNT,
};
use crate::domain::metric::{describe, Locale, MetricCode};
use std::collections::BTreeMap;

pub const NORMALIZED_DOMAIN: (f64, f64) = (0.0, 100.0);
const NEUTRAL_AXIS_COLOR: &str = "#6b7280";
const PLACEHOLDER_COLOR: &str = "transparent";
const INNER_LABEL_OFFSET: u32 = 8;
const OUTER_LABEL_OFFSET: u32 = 25;
const OUTER_TICK_DX: i32 = 8;
/// Rows at or below this count get every X label.
const X_SHOW_ALL_ROWS: usize = 20;
/// Upper bound on automatically spaced X labels.
const X_AUTO_MAX_LABELS: usize = 10;

/// Everything the engine needs for one layout pass.
#[derive(Debug, Clone, Copy)]
pub struct LayoutInput<'a> {
    pub descriptors: &'a [SeriesDescriptor],
    pub metric_priority: &'a [MetricCode],
    pub overrides: &'a BTreeMap<MetricCode, AxisOverride>,
    pub tick_count: usize,
    pub viewport_width: u32,
    pub normalize: bool,
    pub row_count: usize,
    pub x_axis: XAxisOverride,
    pub locale: Locale,
}

/// Pixel widths reserved for inner and outer axes.
pub fn axis_widths(viewport: ViewportClass) -> (u32, u32) {
    match viewport {
        ViewportClass::Mobile => (25, 28),
        ViewportClass::Tablet => (30, 33),
        ViewportClass::Desktop => (35, 38),
    }
}

pub fn font_size(viewport: ViewportClass) -> u32 {
    match viewport {
        ViewportClass::Mobile => 8,
        ViewportClass::Tablet => 9,
        ViewportClass::Desktop => 10,
    }
}

/// Chart margins always reserve room for two axes per side, so adding or
/// removing a metric never reflows the plot area.
pub fn margins(viewport: ViewportClass) -> Margins {
    let side = match viewport {
        ViewportClass::Mobile => 50,
        ViewportClass::Tablet => 60,
        ViewportClass::Desktop => 70,
    };
    Margins {
        top: 5,
        right: side,
        bottom: if viewport == ViewportClass::Mobile { 30 } else { 40 },
        left: side,
    }
}

pub fn geometry(position: AxisPosition, viewport: ViewportClass) -> AxisGeometry {
    let (inner, outer) = axis_widths(viewport);
    let font_size = font_size(viewport);
    match position {
        AxisPosition::InnerLeft | AxisPosition::InnerRight => AxisGeometry {
            width: inner,
            label_offset: INNER_LABEL_OFFSET,
            tick_dx: 0,
            font_size,
        },
        AxisPosition::OuterLeft => AxisGeometry {
            width: outer,
            label_offset: OUTER_LABEL_OFFSET,
            tick_dx: -OUTER_TICK_DX,
            font_size,
        },
        AxisPosition::OuterRight => AxisGeometry {
            width: outer,
            label_offset: OUTER_LABEL_OFFSET,
            tick_dx: OUTER_TICK_DX,
            font_size,
        },
    }
}

pub fn clamp_tick_count(count: usize) -> usize {
    count.clamp(MIN_TICK_COUNT, MAX_TICK_COUNT)
}

/// Evenly spaced ticks including both endpoints. A zero-width domain yields
/// `count` copies of the same value rather than NaN.
pub fn generate_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    let count = count.max(MIN_TICK_COUNT);
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return vec![min; count];
    }

    let steps = (count - 1) as f64;
    let mut ticks: Vec<f64> = (0..count)
        .map(|i| min + (max - min) * (i as f64 / steps))
        .collect();
    ticks[count - 1] = max;
    ticks
}

/// Domain for a metric: user override per bound, else the catalog range.
/// Normalized charts always use 0-100.
pub fn domain_for(metric: &MetricCode, axis_override: Option<&AxisOverride>, normalize: bool) -> (f64, f64) {
    if normalize {
        return NORMALIZED_DOMAIN;
    }
    let (default_min, default_max) = describe(metric).range;
    let min = axis_override.and_then(|o| o.min).unwrap_or(default_min);
    let max = axis_override.and_then(|o| o.max).unwrap_or(default_max);
    if min > max { (max, min) } else { (min, max) }
}

/// X label spacing. An explicit target asks for roughly that many labels;
/// automatic spacing shows every label for short tables and otherwise
/// spaces them so the skip count never shrinks as rows are added.
pub fn x_tick_interval(row_count: usize, target: Option<usize>) -> XTickInterval {
    if let Some(target) = target {
        return XTickInterval::Every((row_count / target.saturating_add(1)).saturating_sub(1));
    }
    if row_count <= X_SHOW_ALL_ROWS {
        return XTickInterval::PreserveStartEnd;
    }
    XTickInterval::Every(row_count.div_ceil(X_AUTO_MAX_LABELS) - 1)
}

/// Row indices that receive an X label under the given interval.
pub fn x_label_indices(row_count: usize, interval: XTickInterval) -> Vec<usize> {
    match interval {
        XTickInterval::PreserveStartEnd => (0..row_count).collect(),
        XTickInterval::Every(skip) => (0..row_count).step_by(skip + 1).collect(),
    }
}

fn axis_label(metric: &MetricCode, viewport: ViewportClass, normalize: bool, locale: Locale) -> String {
    if normalize {
        return match locale {
            Locale::En => "Normalized (%)".to_string(),
            Locale::Ja => "正規化値 (%)".to_string(),
        };
    }

    let unit = describe(metric).unit;
    let label = metric.label(locale);
    let text = match viewport {
        ViewportClass::Mobile => return unit.to_string(),
        ViewportClass::Tablet => label.chars().take(4).collect::<String>(),
        ViewportClass::Desktop => label,
    };
    if unit.is_empty() {
        text
    } else {
        format!("{} ({})", text, unit)
    }
}

fn placeholder(position: AxisPosition, viewport: ViewportClass) -> AxisSlot {
    AxisSlot {
        position,
        metric: None,
        domain: None,
        ticks: Vec::new(),
        geometry: geometry(position, viewport),
        color: PLACEHOLDER_COLOR.to_string(),
        label: String::new(),
    }
}

/// Visible metrics in slot priority: the persisted first-seen order, then any
/// visible metric the order does not know about yet, in encounter order.
pub fn ordered_visible_metrics(descriptors: &[SeriesDescriptor], priority: &[MetricCode]) -> Vec<MetricCode> {
    let mut visible: Vec<&MetricCode> = Vec::new();
    for d in descriptors.iter().filter(|d| !d.hidden) {
        if !visible.contains(&&d.metric) {
            visible.push(&d.metric);
        }
    }

    let mut ordered: Vec<MetricCode> = priority
        .iter()
        .filter(|m| visible.contains(m))
        .cloned()
        .collect();
    for metric in visible {
        if !ordered.contains(metric) {
            ordered.push(metric.clone());
        }
    }
    ordered
}

/// Lay out the four Y axis slots and the X label spacing.
///
/// The n-th visible metric (n < 4) takes inner-left, outer-left, inner-right,
/// outer-right in that order. Metrics past the fourth become overflow
/// bindings: they keep their own domain and borrow the axis of a slot with
/// the same unit, or inner-left when none matches.
pub fn layout(input: &LayoutInput<'_>) -> AxisLayout {
    let viewport = ViewportClass::from_width(input.viewport_width);
    let common_ticks = clamp_tick_count(input.tick_count);
    let metrics = ordered_visible_metrics(input.descriptors, input.metric_priority);

    let slots: [AxisSlot; 4] = AxisPosition::ALL.map(|position| {
        let index = AxisPosition::ALL
            .iter()
            .position(|p| *p == position)
            .unwrap_or(0);
        let Some(metric) = metrics.get(index) else {
            return placeholder(position, viewport);
        };

        let axis_override = input.overrides.get(metric);
        let domain = domain_for(metric, axis_override, input.normalize);
        let tick_count = axis_override
            .and_then(|o| o.ticks)
            .map(clamp_tick_count)
            .unwrap_or(common_ticks);
        let color = input
            .descriptors
            .iter()
            .find(|d| !d.hidden && &d.metric == metric)
            .map(|d| d.color.clone())
            .unwrap_or_else(|| NEUTRAL_AXIS_COLOR.to_string());

        AxisSlot {
            position,
            metric: Some(metric.clone()),
            domain: Some(domain),
            ticks: generate_ticks(domain.0, domain.1, tick_count),
            geometry: geometry(position, viewport),
            color,
            label: axis_label(metric, viewport, input.normalize, input.locale),
        }
    });

    let overflow: Vec<OverflowBinding> = metrics
        .iter()
        .skip(AxisPosition::ALL.len())
        .map(|metric| {
            let unit = describe(metric).unit;
            let host = slots
                .iter()
                .find(|s| {
                    !unit.is_empty()
                        && s.metric.as_ref().is_some_and(|m| describe(m).unit == unit)
                })
                .map(|s| s.position)
                .unwrap_or(AxisPosition::InnerLeft);
            OverflowBinding {
                metric: metric.clone(),
                host,
                domain: domain_for(metric, input.overrides.get(metric), input.normalize),
            }
        })
        .collect();

    if !overflow.is_empty() {
        tracing::warn!(
            "{} visible metrics exceed the four axis slots; {} share an existing axis",
            metrics.len(),
            overflow.len()
        );
    }

    let grid_reference = slots
        .iter()
        .find(|s| !s.is_placeholder())
        .map(|s| s.ticks.clone());

    AxisLayout {
        slots,
        overflow,
        grid_reference,
        x_interval: x_tick_interval(input.row_count, input.x_axis.ticks),
        margins: margins(viewport),
        viewport,
    }
}

/// Horizontal pixels reserved for axes and margins. Constant for a given
/// viewport no matter how many slots are populated.
pub fn reserved_width(layout: &AxisLayout) -> u32 {
    layout.margins.left
        + layout.margins.right
        + layout.slots.iter().map(|s| s.geometry.width).sum::<u32>()
}
