use axum::http::StatusCode;
use axum::response::IntoResponse;
use storefront_core::error_builder::{
    bad_request, conflict, internal_server_error, not_found, unauthorized, ErrorBuilder,
};

fn body_str<'a>(error: &'a storefront_core::problemdetails::Problem, key: &str) -> &'a str {
    error.body.get(key).unwrap().as_str().unwrap()
}

#[test]
fn test_error_builder_basic() {
    let error = ErrorBuilder::new(StatusCode::BAD_REQUEST)
        .type_("https://example.com/probs/validation-error")
        .title("Validation Error")
        .detail("The request contains invalid data")
        .instance("/orders/123")
        .build();

    assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
    assert_eq!(body_str(&error, "type"), "https://example.com/probs/validation-error");
    assert_eq!(body_str(&error, "title"), "Validation Error");
    assert_eq!(body_str(&error, "detail"), "The request contains invalid data");
    assert_eq!(body_str(&error, "instance"), "/orders/123");
    assert!(error.body.contains_key("timestamp"));
}

#[test]
fn test_error_builder_with_values() {
    let error = ErrorBuilder::new(StatusCode::UNPROCESSABLE_ENTITY)
        .title("Validation Failed")
        .value("field", "quantity")
        .value("code", 422)
        .build();

    assert_eq!(error.status_code, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error.body.get("code").unwrap().as_i64(), Some(422));
    assert_eq!(body_str(&error, "field"), "quantity");
}

#[test]
fn test_empty_members_are_omitted() {
    let error = ErrorBuilder::new(StatusCode::BAD_REQUEST).title("Oops").build();

    assert!(!error.body.contains_key("type"));
    assert!(!error.body.contains_key("detail"));
    assert!(!error.body.contains_key("instance"));
}

#[test]
fn test_internal_server_error_builder() {
    let error = internal_server_error().build();

    assert_eq!(error.status_code, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_str(&error, "type"),
        "https://storefront.dev/probs/internal-server-error"
    );
    assert_eq!(body_str(&error, "title"), "Internal Server Error");
    assert_eq!(body_str(&error, "error_code"), "INTERNAL_SERVER_ERROR");
}

#[test]
fn test_not_found_builder() {
    let error = not_found().detail("Order 42 was not found").build();

    assert_eq!(error.status_code, StatusCode::NOT_FOUND);
    assert_eq!(body_str(&error, "type"), "https://storefront.dev/probs/not-found");
    assert_eq!(body_str(&error, "detail"), "Order 42 was not found");
    assert_eq!(body_str(&error, "instance"), "/error/not-found");
    assert_eq!(body_str(&error, "error_code"), "NOT_FOUND");
}

#[test]
fn test_presets_status_codes() {
    assert_eq!(unauthorized().build().status_code, StatusCode::UNAUTHORIZED);
    assert_eq!(bad_request().build().status_code, StatusCode::BAD_REQUEST);
    assert_eq!(conflict().build().status_code, StatusCode::CONFLICT);
}

#[test]
fn test_conflict_detail_override() {
    let error = conflict()
        .title("Invalid Order Transition")
        .detail("Cannot ship an order that is CANCELLED")
        .build();

    assert_eq!(body_str(&error, "title"), "Invalid Order Transition");
    assert_eq!(body_str(&error, "detail"), "Cannot ship an order that is CANCELLED");
}

#[test]
fn test_problem_response_content_type() {
    let response = not_found().build().into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/problem+json"
    );
}
