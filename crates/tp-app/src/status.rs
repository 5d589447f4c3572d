//! Status reporting.

use std::fmt;

use serde::Serialize;
use tp_controls::Snapshot;
use tracing::info;

/// One status line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    pub e1: f64,
    pub d_t: f64,
    pub sum_d_t: f64,
    pub up_acc: f64,
    pub down_acc: f64,
    pub up: bool,
    pub down: bool,
    /// Seconds since the loop started.
    pub elapsed: f64,
}

impl StatusReport {
    pub fn from_snapshot(snapshot: &Snapshot, elapsed: f64) -> Self {
        Self {
            e1: snapshot.e1,
            d_t: snapshot.d_t,
            sum_d_t: snapshot.sum_d_t,
            up_acc: snapshot.travel_up,
            down_acc: snapshot.travel_down,
            up: snapshot.up,
            down: snapshot.down,
            elapsed,
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "E_1: {:.2}, D_T: {:.2}, SUM_D_T: {:.2}, TIMER_PID_UP: {:.2}, TIMER_PID_DOWN: {:.2}, UP: {}, DOWN: {}, Elapsed Time: {:.2} sec",
            self.e1,
            self.d_t,
            self.sum_d_t,
            self.up_acc,
            self.down_acc,
            self.up,
            self.down,
            self.elapsed
        )
    }
}

/// Destination for status reports.
pub trait StatusSink {
    fn report(&mut self, report: &StatusReport);
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    fn report(&mut self, report: &StatusReport) {
        (**self).report(report)
    }
}

/// Emits each report as an `info` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatus;

impl StatusSink for TracingStatus {
    fn report(&mut self, report: &StatusReport) {
        info!(
            e1 = report.e1,
            d_t = report.d_t,
            sum_d_t = report.sum_d_t,
            up_acc = report.up_acc,
            down_acc = report.down_acc,
            up = report.up,
            down = report.down,
            "{report}"
        );
    }
}

/// Keeps every report in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStatus {
    reports: Vec<StatusReport>,
}

impl MemoryStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[StatusReport] {
        &self.reports
    }

    pub fn last(&self) -> Option<&StatusReport> {
        self.reports.last()
    }
}

impl StatusSink for MemoryStatus {
    fn report(&mut self, report: &StatusReport) {
        self.reports.push(*report);
    }
}
