mod report_processor;

pub use report_processor::{
    report_events, ReportCreated, ReportEventPublisher, ReportProcessor,
};
