//! 客户端输入校验
//!
//! 配置表单提交前执行，校验失败时请求不会发出：
//! - validate_coordinates：`"lat,lon"` 格式与取值范围
//! - validate_sim_number：SIM 卡号格式
//! - 告警阈值校验见 [`crate::Limits::parse`]

use crate::logger::Coordinates;

/// 领域校验错误。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("invalid limits: {0}")]
    InvalidLimits(String),
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
    #[error("invalid sim number: {0}")]
    InvalidSimNumber(String),
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),
}

/// 校验 `"lat,lon"` 坐标字符串。
pub fn validate_coordinates(text: &str) -> Result<Coordinates, DomainError> {
    let invalid = || DomainError::InvalidCoordinates(text.to_string());
    let (lat, lon) = text.split_once(',').ok_or_else(invalid)?;
    let lat = lat.trim().parse::<f64>().map_err(|_| invalid())?;
    let lon = lon.trim().parse::<f64>().map_err(|_| invalid())?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(invalid());
    }
    Ok(Coordinates { lat, lon })
}

/// 校验 SIM 卡号：`09` 开头的 11 位数字，或 `+639` 开头后接 9 位数字。
pub fn validate_sim_number(text: &str) -> Result<String, DomainError> {
    let trimmed = text.trim();
    let digits_only = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    let valid = if let Some(rest) = trimmed.strip_prefix("+639") {
        rest.len() == 9 && digits_only(rest)
    } else {
        trimmed.len() == 11 && trimmed.starts_with("09") && digits_only(trimmed)
    };
    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(DomainError::InvalidSimNumber(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_in_range() {
        let coords = validate_coordinates("14.5995, 120.9842").unwrap();
        assert_eq!(coords.lat, 14.5995);
        assert_eq!(coords.lon, 120.9842);
    }

    #[test]
    fn coordinates_rejected() {
        assert!(validate_coordinates("91,10").is_err());
        assert!(validate_coordinates("10").is_err());
        assert!(validate_coordinates("a,b").is_err());
    }

    #[test]
    fn sim_number_formats() {
        assert!(validate_sim_number("09171234567").is_ok());
        assert!(validate_sim_number("+639171234567").is_ok());
        assert!(validate_sim_number("0917123456").is_err());
        assert!(validate_sim_number("+63917123456a").is_err());
        assert!(validate_sim_number("19171234567").is_err());
    }
}
