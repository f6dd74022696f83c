use sagittarius::commands::*;
use sagittarius::packets::*;
use sagittarius::{ExtractInner, ServoTelemetry, TorqueMode};

#[test]
fn test_response_as_inner() {
    let response = ServoResponse::ServoInfo(GetServoInfoResponse {
        id: 2,
        telemetry: ServoTelemetry { speed: 5, load: 40, voltage: 121, current: 300 },
    });

    let extracted: Option<&GetServoInfoResponse> = response.as_inner();
    assert_eq!(extracted.map(|r| r.telemetry.load), Some(40));

    let wrong_type: Option<&ReadPositionResponse> = response.as_inner();
    assert!(wrong_type.is_none());
}

#[test]
fn test_response_into_inner() {
    let response = ServoResponse::Position(ReadPositionResponse { id: 6, tenth_degrees: 903 });

    let extracted: Option<ReadPositionResponse> = response.into_inner();
    let position = extracted.unwrap();
    assert_eq!(position.id, 6);
    assert!((position.radians() - 90.3_f64.to_radians()).abs() < 1e-12);
}

#[test]
fn test_request_into_inner_wrong_variant() {
    let request = ServoRequest::ControlTorque(ControlTorque::new(TorqueMode::Locked));
    let extracted: Option<SetVelocity> = request.into_inner();
    assert!(extracted.is_none());
}
