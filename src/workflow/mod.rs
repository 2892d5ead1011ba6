pub mod export_flow;
pub mod export_state;

pub use export_flow::{ExportFlow, ExportReport};
pub use export_state::{
    ExportSession, ExportState, RecordingStatusSink, StatusSink, TracingStatusSink,
};
