//! Tests for REST API components

#![cfg(test)]

use super::extractors::bearer_token;
use super::types::*;
use axum::http::Request;
use robobox_core::auth::{AdminPolicy, Identity, SignedIn};
use robobox_core::reveal::PointerKind;
use robobox_core::EnquiryStatus;

fn parts_with_auth(value: Option<&str>) -> axum::http::request::Parts {
    let mut builder = Request::builder().uri("/v1/auth/me");
    if let Some(value) = value {
        builder = builder.header("authorization", value);
    }
    builder.body(()).unwrap().into_parts().0
}

fn signed_in(email: &str) -> SignedIn {
    SignedIn {
        token: "tok".to_string(),
        identity: Identity {
            uid: "u1".to_string(),
            email: Some(email.to_string()),
            email_verified: false,
            phone: None,
            display_name: None,
            provider: "password".to_string(),
        },
    }
}

#[test]
fn test_bearer_token_parsing() {
    assert_eq!(bearer_token(&parts_with_auth(Some("Bearer abc"))), Some("abc"));
    assert_eq!(bearer_token(&parts_with_auth(Some("bearer  abc "))), Some("abc"));
    assert_eq!(bearer_token(&parts_with_auth(Some("Basic abc"))), None);
    assert_eq!(bearer_token(&parts_with_auth(None)), None);
}

#[test]
fn test_sign_in_response_landing() {
    let policy = AdminPolicy::default();

    let admin = SignInResponse::new(signed_in("admin@example.com"), &policy);
    assert!(admin.is_admin);
    assert_eq!(admin.landing, "/admin");

    let kid = SignInResponse::new(signed_in("kid@example.com"), &policy);
    let json = serde_json::to_value(&kid).unwrap();
    assert_eq!(json["isAdmin"], false);
    assert_eq!(json["landing"], "/");
    assert_eq!(json["identity"]["uid"], "u1");
}

#[test]
fn test_pointer_request_deserialization() {
    let payload: PointerRequest = serde_json::from_str(
        r#"{"events": [{"kind": "down", "x": 1, "y": 2}, {"kind": "up"}]}"#,
    )
    .unwrap();
    assert_eq!(payload.events.len(), 2);
    assert_eq!(payload.events[0].kind, PointerKind::Down);
    assert_eq!(payload.events[1].x, 0.0);

    let empty: PointerRequest = serde_json::from_str("{}").unwrap();
    assert!(empty.events.is_empty());
}

#[test]
fn test_status_update_deserialization() {
    let payload: StatusUpdateRequest = serde_json::from_str(r#"{"status": "Resolved"}"#).unwrap();
    assert_eq!(payload.status, EnquiryStatus::Resolved);
    assert!(serde_json::from_str::<StatusUpdateRequest>(r#"{"status": "Lost"}"#).is_err());
}

#[test]
fn test_enquiry_receipt_serialization() {
    let receipt = EnquiryReceipt {
        success: true,
        id: "e1".to_string(),
        school_name: "Hill School".to_string(),
    };
    let json = serde_json::to_value(&receipt).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["schoolName"], "Hill School");
}
