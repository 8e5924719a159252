//! 基于 reqwest 的后端实现。
//!
//! 除认证代理外，所有资源都挂在配置的 API 基址下；无重试，超时可选。

use crate::error::BackendError;
use crate::traits::Backend;
use api_contract::{
    AuditedPatch, CheckUserRequest, ConfigLogEntry, CreateUserRequest, LoggerConfigFields,
    LoggerLimitsFields, LoginRequest, MarkReadRequest, NotificationQuery, ValidateTokenRequest,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use domain::{DateRange, LogKind, LogReading, Logger, LoggerId, Notification};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// 后端 REST 客户端。
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(BackendError::Config("api base url required".to_string()));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| BackendError::Config(err.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        self.send_json(self.client.get(self.url(path)), path).await
    }

    async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json(self.client.get(self.url(path)).query(query), path)
            .await
    }

    async fn send_json<T>(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        debug!(target: "hydro.backend", path = %path, "GET");
        let response = ensure_success(request.send().await?, path)?;
        Ok(response.json::<T>().await?)
    }

    async fn patch_json<B>(&self, path: &str, body: &B) -> Result<(), BackendError>
    where
        B: Serialize + ?Sized,
    {
        debug!(target: "hydro.backend", path = %path, "PATCH");
        let response = self.client.patch(self.url(path)).json(body).send().await?;
        ensure_success(response, path)?;
        Ok(())
    }

    async fn post_json<B>(&self, path: &str, body: &B) -> Result<Value, BackendError>
    where
        B: Serialize + ?Sized,
    {
        debug!(target: "hydro.backend", path = %path, "POST");
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let response = ensure_success(response, path)?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `POST /auth/login/`
    pub async fn login(&self, request: &LoginRequest) -> Result<Value, BackendError> {
        self.post_json("/auth/login/", request).await
    }

    /// `POST /auth/check-user`
    pub async fn check_user(&self, request: &CheckUserRequest) -> Result<Value, BackendError> {
        self.post_json("/auth/check-user", request).await
    }

    /// `POST /auth/create-user`
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<Value, BackendError> {
        self.post_json("/auth/create-user", request).await
    }

    /// `POST /auth/validate-token/`
    pub async fn validate_token(
        &self,
        request: &ValidateTokenRequest,
    ) -> Result<Value, BackendError> {
        self.post_json("/auth/validate-token/", request).await
    }

    /// `POST /auth/login-crms`（水质采样系统的代理认证）
    pub async fn login_crms(&self, request: &LoginRequest) -> Result<Value, BackendError> {
        self.post_json("/auth/login-crms", request).await
    }
}

fn ensure_success(
    response: reqwest::Response,
    path: &str,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::Status {
            status: status.as_u16(),
            path: path.to_string(),
        });
    }
    Ok(response)
}

/// 单条资源接口可能返回数组包裹或裸对象，取第一个元素。
fn first_or_object<T: DeserializeOwned>(value: Value) -> Result<Option<T>, BackendError> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => match items.into_iter().next() {
            Some(item) => Ok(Some(serde_json::from_value(item)?)),
            None => Ok(None),
        },
        other => Ok(Some(serde_json::from_value(other)?)),
    }
}

/// 可用日期列表：元素可以是日期字符串，也可以是带日期字段的对象。
pub(crate) fn parse_date_list(values: Vec<Value>) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = values
        .iter()
        .filter_map(|value| match value {
            Value::String(text) => Some(text.as_str()),
            Value::Object(map) => ["date", "Date", "LogDate", "log_date"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str)),
            _ => None,
        })
        .filter_map(|text| text.get(..10))
        .filter_map(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_loggers(&self) -> Result<Vec<Logger>, BackendError> {
        self.get_json("/api/logger").await
    }

    async fn get_logger(&self, logger_id: LoggerId) -> Result<Option<Logger>, BackendError> {
        let value: Value = self.get_json(&format!("/api/logger/{logger_id}")).await?;
        first_or_object(value)
    }

    async fn latest_logs(&self) -> Result<Vec<LogReading>, BackendError> {
        self.get_json("/api/latest_log").await
    }

    async fn log_series(
        &self,
        kind: LogKind,
        logger_id: LoggerId,
        range: &DateRange,
    ) -> Result<Vec<LogReading>, BackendError> {
        let path = format!("/api/{}_log/{logger_id}", kind.segment());
        let query = [
            ("start", range.start.to_string()),
            ("end", range.end.to_string()),
        ];
        self.get_json_with_query(&path, &query).await
    }

    async fn log_dates(
        &self,
        kind: LogKind,
        logger_id: LoggerId,
    ) -> Result<Vec<NaiveDate>, BackendError> {
        let path = format!("/api/{}_log_dates/{logger_id}", kind.segment());
        let values: Vec<Value> = self.get_json(&path).await?;
        Ok(parse_date_list(values))
    }

    async fn totalizer_log_dates(
        &self,
        logger_id: LoggerId,
    ) -> Result<Vec<NaiveDate>, BackendError> {
        let path = format!("/api/totalizer_log_dates/{logger_id}");
        let values: Vec<Value> = self.get_json(&path).await?;
        Ok(parse_date_list(values))
    }

    async fn update_logger_config(
        &self,
        logger_id: LoggerId,
        patch: &AuditedPatch<LoggerConfigFields>,
    ) -> Result<(), BackendError> {
        self.patch_json(&format!("/api/logger_config/{logger_id}"), patch)
            .await
    }

    async fn update_logger_limits(
        &self,
        logger_id: LoggerId,
        patch: &AuditedPatch<LoggerLimitsFields>,
    ) -> Result<(), BackendError> {
        self.patch_json(&format!("/api/logger_limits/{logger_id}"), patch)
            .await
    }

    async fn config_log(&self, logger_id: LoggerId) -> Result<Vec<ConfigLogEntry>, BackendError> {
        self.get_json_with_query("/auth/config-log", &[("loggerId", logger_id)])
            .await
    }

    async fn list_notifications(
        &self,
        include_read: bool,
    ) -> Result<Vec<Notification>, BackendError> {
        let query = NotificationQuery {
            notification_id: None,
            include_read: Some(include_read),
        };
        self.get_json_with_query("/api/notifications", &query).await
    }

    async fn get_notification(&self, id: i64) -> Result<Option<Notification>, BackendError> {
        let query = NotificationQuery {
            notification_id: Some(id),
            include_read: None,
        };
        let value: Value = self.get_json_with_query("/api/notifications", &query).await?;
        first_or_object(value)
    }

    async fn mark_notification_read(&self, id: i64) -> Result<(), BackendError> {
        self.patch_json(&format!("/api/notification/{id}/read"), &serde_json::json!({}))
            .await
    }

    async fn mark_notifications_read(&self, ids: &[i64]) -> Result<(), BackendError> {
        let body = MarkReadRequest {
            notification_ids: ids.to_vec(),
        };
        self.patch_json("/api/notifications/mark-read", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn date_list_accepts_strings_and_objects() {
        let dates = parse_date_list(vec![
            json!("2024-05-02T00:00:00.000Z"),
            json!({"LogDate": "2024-05-01"}),
            json!("2024-05-02"),
            json!(17),
        ]);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            ]
        );
    }

    #[test]
    fn single_resource_unwraps_array() {
        let logger: Option<Logger> =
            first_or_object(json!([{"LoggerId": 4, "Name": "Pressure_Site"}])).unwrap();
        assert_eq!(logger.map(|item| item.logger_id), Some(4));
        let empty: Option<Logger> = first_or_object(json!([])).unwrap();
        assert!(empty.is_none());
    }

    #[test]
    fn empty_base_url_rejected() {
        assert!(matches!(
            HttpBackend::new("", None),
            Err(BackendError::Config(_))
        ));
    }
}
