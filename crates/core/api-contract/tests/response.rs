use api_contract::{ApiResponse, UnreadCountDto};

#[test]
fn api_response_success() {
    let response = ApiResponse::success(UnreadCountDto { unread: 3 });
    assert!(response.success);
    assert_eq!(response.data.as_ref().map(|dto| dto.unread), Some(3));
    assert!(response.error.is_none());
}

#[test]
fn api_response_error_shape() {
    let response = ApiResponse::<()>::error("UPSTREAM.ERROR", "backend unavailable");
    let value = serde_json::to_value(&response).expect("serialize");
    assert_eq!(value["success"], false);
    assert!(value["data"].is_null());
    assert_eq!(value["error"]["code"], "UPSTREAM.ERROR");
    assert_eq!(value["error"]["message"], "backend unavailable");
}
