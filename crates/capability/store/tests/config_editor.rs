use api_contract::{LoggerConfigFields, LoggerLimitsFields};
use domain::{DomainError, Logger, UserContext};
use hydro_backend::InMemoryBackend;
use hydro_store::{ConfigEditor, LogDataStore, StoreError};
use serde_json::json;
use std::sync::Arc;

fn setup() -> (Arc<InMemoryBackend>, Arc<LogDataStore>, ConfigEditor) {
    let backend = Arc::new(InMemoryBackend::new());
    let logger: Logger = serde_json::from_value(json!({
        "LoggerId": 11,
        "Name": "Pressure_Old Site",
        "Enabled": true,
        "Capabilities": "pressure,voltage",
        "VoltageLimit": "2.0,4.5",
        "PressureLimit": "10,60",
        "Visibility": "map,table",
        "Coordinates": "14.5,121.0",
        "SimNumber": "09171234567"
    }))
    .expect("logger");
    backend.set_loggers(vec![logger]);
    let log_data = Arc::new(LogDataStore::new(backend.clone()));
    let editor = ConfigEditor::new(backend.clone(), log_data.clone());
    (backend, log_data, editor)
}

fn config(coordinates: &str, sim: &str) -> LoggerConfigFields {
    LoggerConfigFields {
        name: "Pressure_New Site".to_string(),
        enabled: false,
        capabilities: Some("pressure".to_string()),
        visibility: Some("table".to_string()),
        coordinates: Some(coordinates.to_string()),
        sim_number: Some(sim.to_string()),
    }
}

#[tokio::test]
async fn config_change_is_audited_and_refreshes() {
    let (backend, log_data, editor) = setup();
    let user = UserContext::new("u-7", "admin");
    editor
        .update_config(11, config("14.6, 121.1", "+639171234567"), user.clone())
        .await
        .expect("update");

    let patches = backend.config_patches();
    assert_eq!(patches.len(), 1);
    let (logger_id, patch) = &patches[0];
    assert_eq!(*logger_id, 11);
    assert_eq!(patch.previous.name, "Pressure_Old Site");
    assert_eq!(patch.current.name, "Pressure_New Site");
    assert_eq!(patch.current.coordinates.as_deref(), Some("14.6,121.1"));
    assert_eq!(patch.user, user);

    assert_eq!(backend.calls("list_loggers"), 1);
    let refreshed = log_data.logger(11).expect("refreshed");
    assert!(!refreshed.enabled);
}

#[tokio::test]
async fn invalid_input_sends_no_request() {
    let (backend, _, editor) = setup();
    let user = UserContext::system();

    let err = editor
        .update_config(11, config("95,121", "09171234567"), user.clone())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(DomainError::InvalidCoordinates(_))
    ));

    let err = editor
        .update_config(11, config("14.6,121.1", "0917123"), user.clone())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(DomainError::InvalidSimNumber(_))
    ));

    let limits = LoggerLimitsFields {
        voltage_limit: Some("4.5,2.0".to_string()),
        pressure_limit: None,
        flow_limit: None,
    };
    let err = editor.update_limits(11, limits, user).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(DomainError::InvalidLimits(_))
    ));

    assert_eq!(backend.calls("update_logger_config"), 0);
    assert_eq!(backend.calls("update_logger_limits"), 0);
    assert_eq!(backend.calls("get_logger"), 0);
}

#[tokio::test]
async fn limits_change_carries_previous_values() {
    let (backend, _, editor) = setup();
    let limits = LoggerLimitsFields {
        voltage_limit: Some(" 2.5 , 4.5 ".to_string()),
        pressure_limit: Some("".to_string()),
        flow_limit: None,
    };
    editor
        .update_limits(11, limits, UserContext::new("u-1", "operator"))
        .await
        .expect("limits");

    let (_, patch) = backend.limits_patches().remove(0);
    assert_eq!(patch.previous.voltage_limit.as_deref(), Some("2.0,4.5"));
    assert_eq!(patch.previous.pressure_limit.as_deref(), Some("10,60"));
    assert_eq!(patch.current.voltage_limit.as_deref(), Some("2.5,4.5"));
    assert_eq!(patch.current.pressure_limit, None);
}

#[tokio::test]
async fn unknown_logger_is_not_found() {
    let (_, _, editor) = setup();
    let err = editor
        .update_config(404, config("14.6,121.1", "09171234567"), UserContext::system())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn history_passes_entries_through() {
    let (backend, _, editor) = setup();
    backend.set_config_log(11, vec![json!({"Field": "Name", "User": "admin"})]);
    let history = editor.config_history(11).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["User"], "admin");
}
