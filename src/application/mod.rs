pub mod monitor;

pub use monitor::{
    GraduateMonitor, MonitorStatus, TickReport, SearchReport, EvaluationReport, STARTUP_MESSAGE,
};
