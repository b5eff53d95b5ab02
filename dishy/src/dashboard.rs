//! Dashboard controller: owns every chart binding and its lanes, applies one
//! fan-out per tick and redraws each chart exactly once.

use std::collections::HashMap;

use ratatui::style::Color;
use ratatui::widgets::GraphType;
use tracing::warn;

use crate::decoder::{decode_frame, fan_out, FanOut};
use crate::error::DashError;
use crate::history::{Lane, LaneId, WINDOW_CAPACITY};
use crate::ui::theme;

/// Legend entry for one sub-series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetSpec {
    pub name: &'static str,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetFrame {
    pub name: &'static str,
    pub color: Color,
    pub points: Vec<(f64, f64)>,
}

/// What the renderer draws. Rebuilt from lane contents on every redraw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartFrame {
    pub labels: Vec<String>,
    pub datasets: Vec<DatasetFrame>,
    pub x_max: f64,
    pub y_max: f64,
}

pub struct Chart {
    title: &'static str,
    graph_type: GraphType,
    show_x_axis: bool,
    lanes: Vec<Lane>,
    // One entry per sub-series, lanes in order
    datasets: Vec<DatasetSpec>,
    frame: ChartFrame,
    redraws: u64,
}

impl Chart {
    pub fn new(title: &'static str, graph_type: GraphType, show_x_axis: bool) -> Self {
        Self {
            title,
            graph_type,
            show_x_axis,
            lanes: Vec::new(),
            datasets: Vec::new(),
            frame: ChartFrame::default(),
            redraws: 0,
        }
    }

    /// Host a lane; `datasets` names its sub-series in order.
    pub fn with_lane(mut self, lane: Lane, datasets: &[DatasetSpec]) -> Self {
        for k in 0..lane.sub_series() {
            self.datasets.push(datasets.get(k).copied().unwrap_or(DatasetSpec {
                name: lane.id().name(),
                color: Color::Gray,
            }));
        }
        self.lanes.push(lane);
        self
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn graph_type(&self) -> GraphType {
        self.graph_type
    }

    pub fn show_x_axis(&self) -> bool {
        self.show_x_axis
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn frame(&self) -> &ChartFrame {
        &self.frame
    }

    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Rebuild the frame from the current lane contents. Shorter lanes are
    /// right-aligned so every lane's newest point shares the last x.
    pub fn redraw(&mut self) {
        let longest = self.lanes.iter().map(Lane::len).max().unwrap_or(0);
        let labels = self
            .lanes
            .iter()
            .find(|l| l.len() == longest)
            .map(|l| l.labels().iter().cloned().collect())
            .unwrap_or_default();

        let mut datasets = Vec::with_capacity(self.datasets.len());
        let mut y_max: f64 = 0.0;
        let mut specs = self.datasets.iter();
        for lane in &self.lanes {
            let shift = (longest - lane.len()) as f64;
            for k in 0..lane.sub_series() {
                let Some(spec) = specs.next() else { break };
                let points: Vec<(f64, f64)> = lane
                    .series(k)
                    .map(|s| {
                        s.iter()
                            .enumerate()
                            .map(|(i, &v)| (i as f64 + shift, v))
                            .collect()
                    })
                    .unwrap_or_default();
                y_max = points.iter().fold(y_max, |m, &(_, v)| m.max(v));
                datasets.push(DatasetFrame {
                    name: spec.name,
                    color: spec.color,
                    points,
                });
            }
        }

        self.frame = ChartFrame {
            labels,
            datasets,
            x_max: longest.saturating_sub(1).max(1) as f64,
            // y axis begins at zero; leave headroom above the peak
            y_max: if y_max > 0.0 { y_max * 1.1 } else { 1.0 },
        };
        self.redraws += 1;
    }
}

/// Which charts the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Latency, throughput, power and obstruction.
    #[default]
    Full,
    /// Latency and throughput only.
    Legacy,
}

impl Layout {
    pub fn charts(self) -> Vec<Chart> {
        let latency = Chart::new("Latency", GraphType::Line, false).with_lane(
            Lane::new(LaneId::Latency, WINDOW_CAPACITY, 1),
            &[DatasetSpec { name: "Latency - ms", color: theme::LATENCY }],
        );
        let throughput = Chart::new("Throughput", GraphType::Line, false)
            .with_lane(
                Lane::new(LaneId::Throughput, WINDOW_CAPACITY, 2),
                &[
                    DatasetSpec { name: "Download - Mbps", color: theme::DOWNLOAD },
                    DatasetSpec { name: "Upload - Mbps", color: theme::UPLOAD },
                ],
            );
        match self {
            Layout::Legacy => vec![latency, throughput],
            Layout::Full => vec![
                latency,
                throughput,
                Chart::new("Power", GraphType::Line, true).with_lane(
                    Lane::new(LaneId::Power, WINDOW_CAPACITY, 1),
                    &[DatasetSpec { name: "Power - W", color: theme::POWER }],
                ),
                Chart::new("Obstruction", GraphType::Line, true).with_lane(
                    Lane::new(LaneId::Obstruction, WINDOW_CAPACITY, 1),
                    &[DatasetSpec { name: "Obstructed - %", color: theme::OBSTRUCTION }],
                ),
            ],
        }
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub appended: usize,
    pub failed: usize,
    pub redrawn: usize,
}

pub struct Dashboard {
    charts: Vec<Chart>,
    // lane -> (chart, slot within chart)
    index: HashMap<LaneId, (usize, usize)>,
    lane_ids: Vec<LaneId>,

    state: Option<String>,
    alerts: Vec<String>,
    software_version: Option<String>,
    uptime: Option<u64>,
    last_label: Option<String>,

    ticks: u64,
    dropped: u64,
}

impl Dashboard {
    pub fn new(charts: Vec<Chart>) -> Result<Self, DashError> {
        let mut index = HashMap::new();
        let mut lane_ids = Vec::new();
        for (ci, chart) in charts.iter().enumerate() {
            for (li, lane) in chart.lanes().iter().enumerate() {
                if index.insert(lane.id(), (ci, li)).is_some() {
                    return Err(DashError::DuplicateLane(lane.id()));
                }
                lane_ids.push(lane.id());
            }
        }
        Ok(Self {
            charts,
            index,
            lane_ids,
            state: None,
            alerts: Vec::new(),
            software_version: None,
            uptime: None,
            last_label: None,
            ticks: 0,
            dropped: 0,
        })
    }

    pub fn for_layout(layout: Layout) -> Result<Self, DashError> {
        Self::new(layout.charts())
    }

    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    pub fn lane_ids(&self) -> &[LaneId] {
        &self.lane_ids
    }

    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        let &(ci, li) = self.index.get(&id)?;
        self.charts.get(ci)?.lanes.get(li)
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn software_version(&self) -> Option<&str> {
        self.software_version.as_deref()
    }

    pub fn uptime(&self) -> Option<u64> {
        self.uptime
    }

    pub fn last_label(&self) -> Option<&str> {
        self.last_label.as_deref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Append one point to a lane without redrawing. Returns the hosting chart.
    pub fn append(&mut self, id: LaneId, label: &str, values: &[f64]) -> Result<usize, DashError> {
        let &(ci, li) = self.index.get(&id).ok_or(DashError::UnknownLane(id))?;
        self.charts[ci].lanes[li].append(label, values)?;
        Ok(ci)
    }

    /// Apply a whole fan-out: every append first, then one redraw per
    /// distinct chart.
    pub fn apply(&mut self, fan: FanOut) -> TickReport {
        let mut report = TickReport::default();
        for point in &fan.points {
            match self.append(point.lane, &fan.label, &point.values) {
                Ok(_) => report.appended += 1,
                Err(e) => {
                    warn!("append failed: {e}");
                    report.failed += 1;
                }
            }
        }
        for chart in &mut self.charts {
            chart.redraw();
            report.redrawn += 1;
        }

        // Not incremental: this tick's set replaces the last one
        self.alerts = fan.alerts;
        self.state = fan.state;
        self.software_version = fan.software_version;
        self.uptime = fan.uptime;
        self.last_label = Some(fan.label);
        self.ticks += 1;
        report
    }

    /// Decode a text frame and apply it. A malformed frame is counted and
    /// returned as an error with every lane left as it was; frames for
    /// other events yield `Ok(None)`.
    pub fn handle_frame(&mut self, frame: &str, label: String) -> Result<Option<TickReport>, DashError> {
        let snap = match decode_frame(frame) {
            Ok(Some(snap)) => snap,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.dropped += 1;
                return Err(e);
            }
        };
        let fan = fan_out(&snap, label, &self.lane_ids);
        Ok(Some(self.apply(fan)))
    }
}
