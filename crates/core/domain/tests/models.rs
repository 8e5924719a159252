use domain::{Logger, LogReading, Metric, UserContext};

#[test]
fn user_context_builds() {
    let user = UserContext::new("42", "operator");
    assert_eq!(user.user_id, "42");
    assert_eq!(user.username, "operator");
    assert_eq!(UserContext::system().username, "system");
}

#[test]
fn backend_logger_list_parses() {
    let body = r#"[
        {"LoggerId": 1, "Name": "Pressure_Brgy Lawa", "Enabled": true,
         "Capabilities": "voltage,pressure", "VoltageLimit": "2.0,4.5",
         "PressureLimit": "10,60", "Visibility": "map,table", "Coordinates": "14.6,121.0"},
        {"LoggerId": "2", "Name": "Flow_Main Line", "Enabled": "0",
         "Capabilities": null, "Visibility": null}
    ]"#;
    let loggers: Vec<Logger> = serde_json::from_str(body).expect("loggers");
    assert_eq!(loggers.len(), 2);
    assert!(loggers[0].enabled);
    assert!(!loggers[1].enabled);
    assert!(!loggers[1].visible_on_table());
    assert!(loggers[0].limits_for(Metric::Pressure).is_some());
}

#[test]
fn latest_log_list_parses() {
    let body = r#"[
        {"LogId": 10, "LoggerId": 1, "LogTime": "2024-05-01T08:00:00Z",
         "AverageVoltage": 3.5, "CurrentPressure": "22.1"},
        {"LoggerId": 2, "LogTime": "2024-05-01 08:05:00", "CurrentFlow": 4,
         "TotalFlowPositive": 1200.5, "TotalFlowNegative": 0}
    ]"#;
    let readings: Vec<LogReading> = serde_json::from_str(body).expect("readings");
    assert_eq!(readings[0].value(Metric::Pressure), Some(22.1));
    assert_eq!(readings[1].value(Metric::Flow), Some(4.0));
    assert_eq!(readings[1].total_flow_positive, Some(1200.5));
    assert!(readings[0].log_time < readings[1].log_time);
}

#[test]
fn unparseable_cell_keeps_rest_of_list() {
    let body = r#"[
        {"LoggerId": 1, "LogTime": "2024-05-01 08:00:00", "CurrentPressure": 22.1},
        {"LoggerId": 2, "LogTime": "2024-05-01 08:05:00", "CurrentPressure": "N/A",
         "AverageVoltage": 3.7, "CurrentFlow": "--"}
    ]"#;
    let readings: Vec<LogReading> = serde_json::from_str(body).expect("readings");
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0].value(Metric::Pressure), Some(22.1));
    assert_eq!(readings[1].value(Metric::Pressure), None);
    assert_eq!(readings[1].value(Metric::Flow), None);
    assert_eq!(readings[1].value(Metric::Voltage), Some(3.7));
}
