//! Plot painting for provider-backed panels.
//!
//! Line plots show time series (x in milliseconds), bar plots show one
//! horizontal bar per named point. The painter only reads the chart model;
//! pointer positions are handed back in data coordinates so the panel view
//! can feed them into the synchronization bus.

use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke};
use rzpl::chart::ChartModel;
use rzpl::panels::{PanelData, PlotKind};
use rzpl::sync::linking::{emphasis, Emphasis};
use rzpl::theme::{series_color, with_alpha};
use rzpl::ThemeColors;

use crate::rendering::text_utils::fit_label;
use crate::utils::{format_duration_ms, format_value};

const AXIS_MARGIN_LEFT: f32 = 56.0;
const AXIS_MARGIN_BOTTOM: f32 = 18.0;
const LEGEND_HEIGHT: f32 = 16.0;
const BAR_FILL: f32 = 0.7;

/// Pointer activity over a plot, in data coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PlotResponse {
    /// Pointer position while it hovers the plot area
    pub pointer: Option<(f64, f64)>,
    /// Position of a primary click in this frame
    pub clicked: Option<(f64, f64)>,
}

/// Maps between data space and the screen rectangle of the plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotFrame {
    rect: Rect,
    x: (f64, f64),
    y: (f64, f64),
    /// Bars grow downwards from the first index; line plots grow upwards
    y_down: bool,
}

impl PlotFrame {
    pub fn new(rect: Rect, x: (f64, f64), y: (f64, f64), y_down: bool) -> Self {
        Self { rect, x, y, y_down }
    }

    fn fraction(value: f64, (lo, hi): (f64, f64)) -> f32 {
        let span = hi - lo;
        if span.abs() < f64::EPSILON {
            0.5
        } else {
            ((value - lo) / span) as f32
        }
    }

    pub fn to_screen(&self, x: f64, y: f64) -> Pos2 {
        let fx = Self::fraction(x, self.x);
        let fy = Self::fraction(y, self.y);
        let sy = if self.y_down {
            self.rect.top() + fy * self.rect.height()
        } else {
            self.rect.bottom() - fy * self.rect.height()
        };
        Pos2::new(self.rect.left() + fx * self.rect.width(), sy)
    }

    pub fn to_data(&self, pos: Pos2) -> (f64, f64) {
        let fx = ((pos.x - self.rect.left()) / self.rect.width().max(1.0)) as f64;
        let fy = if self.y_down {
            (pos.y - self.rect.top()) / self.rect.height().max(1.0)
        } else {
            (self.rect.bottom() - pos.y) / self.rect.height().max(1.0)
        } as f64;
        (
            self.x.0 + fx * (self.x.1 - self.x.0),
            self.y.0 + fy * (self.y.1 - self.y.0),
        )
    }

    /// Screen height of one unit on the y axis.
    pub fn y_unit(&self) -> f32 {
        let span = (self.y.1 - self.y.0).abs();
        if span < f64::EPSILON {
            self.rect.height()
        } else {
            self.rect.height() / span as f32
        }
    }
}

/// Paints `chart` and reports pointer activity.
pub fn render_plot(
    ui: &mut egui::Ui,
    chart: &ChartModel,
    data: &PanelData,
    selected: Option<&str>,
    colors: &ThemeColors,
) -> PlotResponse {
    let size = ui.available_size().max(egui::vec2(80.0, 60.0));
    let (rect, response) = ui.allocate_exact_size(size, Sense::click());
    let painter = ui.painter_at(rect);

    let plot_rect = Rect::from_min_max(
        Pos2::new(rect.left() + AXIS_MARGIN_LEFT, rect.top() + LEGEND_HEIGHT),
        Pos2::new(rect.right() - 8.0, rect.bottom() - AXIS_MARGIN_BOTTOM),
    );
    if plot_rect.width() <= 1.0 || plot_rect.height() <= 1.0 {
        return PlotResponse::default();
    }
    painter.rect_stroke(plot_rect, 0.0, Stroke::new(1.0, colors.grid), egui::StrokeKind::Inside);

    let frame = match data.kind {
        PlotKind::Lines => PlotFrame::new(plot_rect, chart.x_domain(), chart.y_domain(), false),
        PlotKind::Bars => {
            let (x0, x1) = chart.x_domain();
            let (y0, y1) = chart.y_domain();
            PlotFrame::new(plot_rect, (x0.min(0.0), x1), (y0 - 0.5, y1 + 0.5), true)
        }
    };

    match data.kind {
        PlotKind::Lines => paint_lines(&painter, chart, &frame, colors),
        PlotKind::Bars => paint_bars(&painter, chart, &frame, selected, colors),
    }
    paint_axes(&painter, chart, data, &frame, plot_rect, colors);
    paint_legend(&painter, chart, rect, colors);

    let to_data = |pos: Pos2| plot_rect.contains(pos).then(|| frame.to_data(pos));
    PlotResponse {
        pointer: response.hover_pos().and_then(to_data),
        clicked: response
            .clicked()
            .then(|| response.interact_pointer_pos())
            .flatten()
            .and_then(to_data),
    }
}

fn paint_lines(painter: &egui::Painter, chart: &ChartModel, frame: &PlotFrame, colors: &ThemeColors) {
    let total = chart.plot_data().len();
    for (i, series) in chart.plot_data().iter().enumerate() {
        let points: Vec<Pos2> = series.iter().map(|p| frame.to_screen(p.x, p.y)).collect();
        if points.len() > 1 {
            painter.line(points, Stroke::new(1.5, series_color(i, total)));
        }
    }

    for point in chart.annotations() {
        let pos = frame.to_screen(point.x, point.y);
        painter.line_segment(
            [Pos2::new(pos.x, frame.rect.top()), Pos2::new(pos.x, frame.rect.bottom())],
            Stroke::new(1.0, with_alpha(colors.hovered_point, 120)),
        );
        painter.circle_filled(pos, 4.0, colors.hovered_point);
    }
}

fn paint_bars(
    painter: &egui::Painter,
    chart: &ChartModel,
    frame: &PlotFrame,
    selected: Option<&str>,
    colors: &ThemeColors,
) {
    let hovered = chart.annotations().last().and_then(|p| p.name.as_deref());
    let bar_height = (frame.y_unit() * BAR_FILL).max(1.0);
    let font = FontId::proportional(11.0);

    for point in chart.plot_data().iter().flatten() {
        let start = frame.to_screen(0.0, point.y);
        let end = frame.to_screen(point.x, point.y);
        let bar = Rect::from_min_max(
            Pos2::new(start.x.min(end.x), start.y - bar_height / 2.0),
            Pos2::new(start.x.max(end.x).max(start.x + 1.0), start.y + bar_height / 2.0),
        );
        let fill = match emphasis(point, hovered, selected) {
            Emphasis::None => series_color(0, 1),
            Emphasis::Hovered => colors.hovered_point,
            Emphasis::Selected | Emphasis::HoveredAndSelected => colors.selected_point,
        };
        painter.rect_filled(bar, 1.0, fill);
        if matches!(emphasis(point, hovered, selected), Emphasis::HoveredAndSelected) {
            painter.rect_stroke(bar, 1.0, Stroke::new(2.0, colors.hovered_point), egui::StrokeKind::Outside);
        }

        if let Some(name) = point.name.as_deref() {
            if let Some(label) = fit_label(name, frame.rect.width() - 8.0, &font, painter) {
                painter.text(
                    Pos2::new(frame.rect.left() + 4.0, start.y),
                    Align2::LEFT_CENTER,
                    label,
                    font.clone(),
                    colors.text,
                );
            }
        }
    }
}

fn paint_axes(
    painter: &egui::Painter,
    chart: &ChartModel,
    data: &PanelData,
    frame: &PlotFrame,
    plot_rect: Rect,
    colors: &ThemeColors,
) {
    let font = FontId::monospace(10.0);
    let (x0, x1) = chart.x_domain();
    match data.kind {
        PlotKind::Lines => {
            let (y0, y1) = chart.y_domain();
            painter.text(plot_rect.left_top(), Align2::RIGHT_TOP, format_value(y1, data.unit), font.clone(), colors.text_dim);
            painter.text(plot_rect.left_bottom(), Align2::RIGHT_BOTTOM, format_value(y0, data.unit), font.clone(), colors.text_dim);
            painter.text(plot_rect.left_bottom(), Align2::LEFT_TOP, format_duration_ms(x0), font.clone(), colors.text_dim);
            painter.text(plot_rect.right_bottom(), Align2::RIGHT_TOP, format_duration_ms(x1), font.clone(), colors.text_dim);
        }
        PlotKind::Bars => {
            let right = frame.to_screen(x1, 0.0);
            painter.text(
                Pos2::new(right.x, plot_rect.bottom()),
                Align2::RIGHT_TOP,
                format_value(x1, data.unit),
                font.clone(),
                colors.text_dim,
            );
        }
    }

    if let Some(point) = chart.annotations().last() {
        let value = match data.kind {
            PlotKind::Lines => format!("{} @ {}", format_value(point.y, data.unit), format_duration_ms(point.x)),
            PlotKind::Bars => format!(
                "{}: {}",
                point.name.as_deref().unwrap_or("?"),
                format_value(point.x, data.unit)
            ),
        };
        painter.text(plot_rect.right_top() + egui::vec2(-4.0, 4.0), Align2::RIGHT_TOP, value, font, colors.text);
    }
}

fn paint_legend(painter: &egui::Painter, chart: &ChartModel, rect: Rect, colors: &ThemeColors) {
    let labels = chart.labels();
    if labels.len() < 2 {
        return;
    }
    let font = FontId::proportional(10.0);
    let mut x = rect.left() + AXIS_MARGIN_LEFT;
    for (i, label) in labels.iter().enumerate() {
        let swatch = Rect::from_min_size(Pos2::new(x, rect.top() + 4.0), egui::vec2(8.0, 8.0));
        painter.rect_filled(swatch, 1.0, series_color(i, labels.len()));
        let text_rect = painter.text(
            Pos2::new(swatch.right() + 3.0, swatch.center().y),
            Align2::LEFT_CENTER,
            label,
            font.clone(),
            colors.text_dim,
        );
        x = text_rect.right() + 10.0;
        if x > rect.right() - 40.0 {
            break;
        }
    }
}

/// Placeholder shown while a panel has no data for its selection.
pub fn render_empty(ui: &mut egui::Ui, message: &str, color: Color32) {
    ui.centered_and_justified(|ui| {
        ui.colored_label(color, message);
    });
}
