// Requests and replies are serde types too, so hosts can log or relay them as JSON.

use sagittarius::commands::*;
use sagittarius::packets::*;
use sagittarius::TorqueMode;

#[test]
fn test_request_is_tagged_by_command() {
    let request = ServoRequest::ControlTorque(ControlTorque::new(TorqueMode::Free));
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["Command"], "ControlTorque");
    assert_eq!(json["mode"], "Free");
}

#[test]
fn test_request_json_roundtrip_preserves_payload() {
    let request = ServoRequest::SetPositionsById(SetPositionsById::new(vec![
        ServoPosition { id: 1, tenth_degrees: 258 },
        ServoPosition { id: 7, tenth_degrees: 859 },
    ]));
    let json = serde_json::to_string(&request).unwrap();
    let back: ServoRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, request);
}

#[test]
fn test_response_is_tagged() {
    let json = r#"{"Response": "Position", "id": 4, "tenth_degrees": -120}"#;
    let response: ServoResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.id(), 4);
    assert_eq!(response.command(), CommandCode::ReadPosition);
}
