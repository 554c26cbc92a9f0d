use ebox_protocol::*;
use pretty_assertions::assert_eq;

fn sample_module_data() -> ModuleData {
    ModuleData {
        key: "network".to_string(),
        points: vec![
            DataPoint {
                name: "net.download".to_string(),
                value: "1.5 kB/s".to_string(),
            },
            DataPoint {
                name: "net.upload".to_string(),
                value: "0 B/s".to_string(),
            },
        ],
    }
}

#[test]
fn test_unit_request_is_bare_string() {
    assert_eq!(DaemonRequest::GetStatus.to_json().unwrap(), r#""GetStatus""#);
    assert_eq!(
        DaemonRequest::RecordUnlock.to_json().unwrap(),
        r#""RecordUnlock""#
    );
}

#[test]
fn test_struct_request_wire_shape() {
    let request = DaemonRequest::GetModuleData {
        key: "battery".to_string(),
    };
    let json = request.to_json().unwrap();
    assert_eq!(json, r#"{"GetModuleData":{"key":"battery"}}"#);
    assert_eq!(DaemonRequest::from_json(&json).unwrap(), request);
}

#[test]
fn test_module_data_keeps_point_order() {
    let response = DaemonResponse::ModuleData(Some(sample_module_data()));
    let json = response.to_json().unwrap();

    let download = json.find("net.download").unwrap();
    let upload = json.find("net.upload").unwrap();
    assert!(download < upload);

    match DaemonResponse::from_json(&json).unwrap() {
        DaemonResponse::ModuleData(Some(data)) => {
            assert_eq!(data, sample_module_data());
            assert_eq!(data.get("net.upload"), Some("0 B/s"));
            assert_eq!(data.get("net.missing"), None);
        }
        other => panic!("Unexpected response: {:?}", other),
    }
}

#[test]
fn test_missing_module_data_is_null() {
    let json = DaemonResponse::ModuleData(None).to_json().unwrap();
    assert_eq!(json, r#"{"ModuleData":null}"#);
}

#[test]
fn test_status_from_previous_protocol_without_modules() {
    let json = r#"{"Status":{"running":true,"uptime_secs":42,"version":"0.3.0","cycle_count":7,"last_cycle_time":null,"protocol_version":1,"min_supported_version":1}}"#;

    match DaemonResponse::from_json(json).unwrap() {
        DaemonResponse::Status(status) => {
            assert!(status.running);
            assert_eq!(status.uptime_secs, 42);
            assert_eq!(status.cycle_count, 7);
            assert!(status.modules.is_empty());
            assert_eq!(status.protocol_version, 1);
        }
        other => panic!("Unexpected response: {:?}", other),
    }
}

#[test]
fn test_default_status_carries_current_versions() {
    let status = DaemonStatus::default();
    assert_eq!(status.protocol_version, PROTOCOL_VERSION);
    assert_eq!(status.min_supported_version, MIN_SUPPORTED_VERSION);
    assert!(MIN_SUPPORTED_VERSION <= PROTOCOL_VERSION);
}

#[test]
fn test_unknown_request_is_rejected() {
    assert!(DaemonRequest::from_json(r#""KillProcess""#).is_err());
    assert!(DaemonRequest::from_json("not json").is_err());
}
