use chrono::NaiveDate;
use domain::{
    Averaging, DateRange, LogKind, LogReading, Logger, Metric, ReportFormat, ReportRequest,
    ReportSelection, UserContext,
};
use hydro_backend::InMemoryBackend;
use hydro_report::{ReportError, ReportService};
use hydro_store::{RecordingToastSink, ToastKind};
use serde_json::{Value, json};
use std::sync::Arc;

fn flow_logger() -> Logger {
    serde_json::from_value(json!({
        "LoggerId": 5,
        "Name": "Flow_Brgy Lawa",
        "Enabled": true,
        "Capabilities": "flow,voltage"
    }))
    .expect("logger")
}

fn reading(time: &str, flow: f64, positive: f64) -> LogReading {
    serde_json::from_value(json!({
        "LoggerId": 5,
        "LogTime": time,
        "CurrentFlow": flow,
        "AverageVoltage": 3.6,
        "TotalFlowPositive": positive
    }))
    .expect("reading")
}

fn range(start: u32, end: u32) -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 5, start).unwrap(),
        NaiveDate::from_ymd_opt(2024, 5, end).unwrap(),
    )
    .unwrap()
}

fn request(selection: ReportSelection, format: ReportFormat) -> ReportRequest {
    ReportRequest {
        logger: flow_logger(),
        selection,
        range: range(1, 2),
        format,
        user: UserContext::new("u-1", "operator"),
    }
}

fn setup() -> (Arc<InMemoryBackend>, Arc<RecordingToastSink>, ReportService) {
    let backend = Arc::new(InMemoryBackend::new());
    backend.set_series(
        LogKind::Flow,
        5,
        vec![
            reading("2024-05-02 09:10:00", 14.0, 1200.0),
            reading("2024-05-01 10:05:00", 10.0, 1000.0),
            reading("2024-05-01 10:45:00", 12.0, 1010.0),
            // 区间之外，后端多返回的行会被裁剪。
            reading("2024-05-03 00:00:00", 99.0, 9999.0),
        ],
    );
    let toasts = Arc::new(RecordingToastSink::new());
    let service = ReportService::new(backend.clone(), toasts.clone());
    (backend, toasts, service)
}

fn parse(bytes: &[u8]) -> Vec<Value> {
    serde_json::from_slice(bytes).expect("json report")
}

#[tokio::test]
async fn json_report_matches_rows_in_range() {
    let (_, _, service) = setup();
    let mut selection = ReportSelection::new(Metric::Flow);
    selection.totalizer_positive = true;
    let outcome = service
        .generate(request(selection, ReportFormat::Json))
        .await
        .expect("report");

    assert_eq!(outcome.rows, 3);
    assert_eq!(outcome.file_name, "Flow_Brgy_Lawa_flow_2024-05-01_2024-05-02.json");
    let file = outcome.file.expect("file");
    assert_eq!(file.content_type, "application/json");
    let rows = parse(&file.bytes);
    assert_eq!(
        rows,
        vec![
            json!({"timestamp": "2024-05-01 10:05:00", "flow": 10.0, "totalFlowPositive": 1000.0}),
            json!({"timestamp": "2024-05-01 10:45:00", "flow": 12.0, "totalFlowPositive": 1010.0}),
            json!({"timestamp": "2024-05-02 09:10:00", "flow": 14.0, "totalFlowPositive": 1200.0}),
        ]
    );
}

#[tokio::test]
async fn hourly_average_replaces_bucket_rows() {
    let (_, _, service) = setup();
    let mut selection = ReportSelection::new(Metric::Flow);
    selection.averaging = Averaging::Hourly;
    let outcome = service
        .generate(request(selection, ReportFormat::Json))
        .await
        .expect("report");
    let rows = parse(&outcome.file.expect("file").bytes);
    assert_eq!(
        rows,
        vec![
            json!({"timestamp": "2024-05-01 10:00:00", "flow": 11.0}),
            json!({"timestamp": "2024-05-02 09:00:00", "flow": 14.0}),
        ]
    );
}

#[tokio::test]
async fn csv_report_has_metadata_line_then_rows() {
    let (_, _, service) = setup();
    let outcome = service
        .generate(request(ReportSelection::new(Metric::Voltage), ReportFormat::Csv))
        .await
        .expect("report");
    let text = String::from_utf8(outcome.file.expect("file").bytes).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Logger ID: 5,Name: Flow_Brgy Lawa,Type: Flow,Location: Brgy Lawa"
    );
    assert_eq!(lines[1], "2024-05-01 10:05:00,3.6");
    assert_eq!(lines.len(), 4);
}

#[tokio::test]
async fn xlsx_waits_for_download_and_regeneration_invalidates() {
    let (_, _, service) = setup();
    let outcome = service
        .generate(request(ReportSelection::new(Metric::Flow), ReportFormat::Xlsx))
        .await
        .expect("report");
    assert!(outcome.pending_download());
    assert!(service.has_pending());

    service
        .generate(request(ReportSelection::new(Metric::Flow), ReportFormat::Json))
        .await
        .expect("json");
    assert!(!service.has_pending());
    assert!(matches!(service.download(), Err(ReportError::NothingPending)));

    service
        .generate(request(ReportSelection::new(Metric::Flow), ReportFormat::Xlsx))
        .await
        .expect("report");
    let file = service.download().expect("workbook");
    assert!(file.file_name.ends_with(".xlsx"));
    assert!(file.bytes.starts_with(b"PK"));
    assert!(!service.has_pending());
}

#[tokio::test]
async fn failure_clears_pending_and_shows_error_toast() {
    let (backend, toasts, service) = setup();
    service
        .generate(request(ReportSelection::new(Metric::Flow), ReportFormat::Xlsx))
        .await
        .expect("report");
    assert!(service.has_pending());

    backend.set_failing(true);
    let result = service
        .generate(request(ReportSelection::new(Metric::Flow), ReportFormat::Csv))
        .await;
    assert!(matches!(result, Err(ReportError::Backend(_))));
    assert!(!service.has_pending());

    let shown = toasts.toasts();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].kind, ToastKind::Error);
}

#[tokio::test]
async fn dates_and_history_follow_source() {
    let (backend, _, service) = setup();
    let may = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
    backend.set_dates(LogKind::Flow, 5, vec![may(1), may(2)]);
    backend.set_totalizer_dates(5, vec![may(2)]);
    let logger = flow_logger();

    let dates = service
        .available_dates(&logger, Metric::Voltage, false)
        .await
        .expect("dates");
    assert_eq!(dates, vec![may(1), may(2)]);
    let dates = service
        .available_dates(&logger, Metric::Flow, true)
        .await
        .expect("totalizer dates");
    assert_eq!(dates, vec![may(2)]);
    let pressure = service
        .available_dates(&logger, Metric::Pressure, false)
        .await
        .expect("pressure dates");
    assert!(pressure.is_empty());

    let history = service
        .history(&logger, LogKind::Flow, &range(1, 1))
        .await
        .expect("history");
    let flows: Vec<Option<f64>> = history.iter().map(|row| row.current_flow).collect();
    assert_eq!(flows, vec![Some(10.0), Some(12.0)]);
}
