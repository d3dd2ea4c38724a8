//! Chart model shared by every plot panel.
//!
//! Holds the plotted series, the data domains, the currently displayed
//! annotations and a redraw flag. Painting lives in the viewer; this type only
//! answers "which point is closest" and records what should be highlighted.

/// A single plotted value. `name` identifies the point across panels.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
    pub name: Option<String>,
}

impl DataPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, name: None }
    }

    pub fn named(x: f64, y: f64, name: impl Into<String>) -> Self {
        Self {
            x,
            y,
            name: Some(name.into()),
        }
    }
}

/// How "closest point" is measured in a chart's own coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointMetric {
    /// Distance along x only; suits time series.
    Horizontal,
    /// Distance along y only; suits horizontal bar charts indexed on y.
    Vertical,
    /// Euclidean distance after scaling both axes to their domains.
    Normalized,
}

#[derive(Debug, Clone)]
pub struct ChartModel {
    plot_data: Vec<Vec<DataPoint>>,
    labels: Vec<String>,
    x_domain: (f64, f64),
    y_domain: (f64, f64),
    metric: PointMetric,
    annotations: Vec<DataPoint>,
    redraw_requested: bool,
}

impl ChartModel {
    /// Builds a chart over `plot_data`. Domains are derived from the data
    /// unless `y_domain` is fixed by the caller.
    pub fn new(
        plot_data: Vec<Vec<DataPoint>>,
        labels: Vec<String>,
        metric: PointMetric,
        y_domain: Option<(f64, f64)>,
    ) -> Self {
        let x_domain = domain_of(plot_data.iter().flatten().map(|p| p.x)).unwrap_or((0.0, 1.0));
        let y_domain = y_domain.unwrap_or_else(|| {
            domain_of(plot_data.iter().flatten().map(|p| p.y))
                .map(|(lo, hi)| (lo.min(0.0), hi))
                .unwrap_or((0.0, 1.0))
        });
        Self {
            plot_data,
            labels,
            x_domain: widen(x_domain),
            y_domain: widen(y_domain),
            metric,
            annotations: Vec::new(),
            redraw_requested: true,
        }
    }

    pub fn plot_data(&self) -> &[Vec<DataPoint>] {
        &self.plot_data
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn x_domain(&self) -> (f64, f64) {
        self.x_domain
    }

    pub fn y_domain(&self) -> (f64, f64) {
        self.y_domain
    }

    pub fn metric(&self) -> PointMetric {
        self.metric
    }

    /// Closest point to `(x, y)` using the chart's metric.
    pub fn find_closest_point(&self, x: f64, y: f64) -> Option<&DataPoint> {
        let (x0, x1) = self.x_domain;
        let (y0, y1) = self.y_domain;
        match self.metric {
            PointMetric::Horizontal => self.find_closest_point_by(x, y, |p, x, _| (p.x - x).abs()),
            PointMetric::Vertical => self.find_closest_point_by(x, y, |p, _, y| (p.y - y).abs()),
            PointMetric::Normalized => self.find_closest_point_by(x, y, |p, x, y| {
                let dx = (p.x - x) / (x1 - x0);
                let dy = (p.y - y) / (y1 - y0);
                dx * dx + dy * dy
            }),
        }
    }

    /// Closest point to `(x, y)` under a caller-supplied distance.
    pub fn find_closest_point_by(
        &self,
        x: f64,
        y: f64,
        distance: impl Fn(&DataPoint, f64, f64) -> f64,
    ) -> Option<&DataPoint> {
        self.plot_data
            .iter()
            .flatten()
            .map(|p| (distance(p, x, y), p))
            .filter(|(d, _)| d.is_finite())
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p)
    }

    /// First point whose name equals `name`.
    pub fn find_named(&self, name: &str) -> Option<&DataPoint> {
        self.plot_data
            .iter()
            .flatten()
            .find(|p| p.name.as_deref() == Some(name))
    }

    pub fn annotations(&self) -> &[DataPoint] {
        &self.annotations
    }

    /// Shows an annotation at `point`, or just redraws if there is none.
    pub fn add_annotation(&mut self, point: Option<DataPoint>) {
        match point {
            Some(point) => self.annotations.push(point),
            None => log::debug!("Cannot find the closest point"),
        }
        self.redraw();
    }

    pub fn pop_annotation(&mut self) -> Option<DataPoint> {
        self.annotations.pop()
    }

    pub fn redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Returns and clears the pending redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }
}

fn domain_of(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi - lo > f64::EPSILON {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}
