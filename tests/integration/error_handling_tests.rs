//! Error handling integration tests
//!
//! Error mapping and the capability errors surfaced by wrapped writers.

#[cfg(test)]
mod tests {
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;
    use httpscope::core::{BufferedResponse, CaptureWriter, ResponseCapture, ResponseWriter};
    use httpscope::utils::error::ObserverError;

    #[test]
    fn test_hijack_on_plain_writer_names_the_type() {
        let mut writer = CaptureWriter::new(BufferedResponse::new(), ResponseCapture::new(true));
        let err = writer.hijack().err().unwrap();

        assert!(err.is_capability_error());
        assert!(err.to_string().ends_with("is not a hijacker"));
        assert_eq!(err.status_code(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn test_push_is_not_supported() {
        let mut writer = CaptureWriter::new(BufferedResponse::new(), ResponseCapture::new(true));
        let err = writer.push("/style.css").unwrap_err();

        assert!(matches!(err, ObserverError::PushNotSupported));
        assert_eq!(err.to_string(), "feature not supported: server push");
    }

    #[test]
    fn test_sink_errors_map_to_bad_gateway() {
        let err = ObserverError::HealthCheck {
            status: 503,
            body: "unavailable".to_string(),
        };
        let response = err.error_response();
        assert_eq!(response.status().as_u16(), 502);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = ObserverError::Config("secret path /etc/x".to_string());
        assert_eq!(err.error_response().status().as_u16(), 500);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_server_error_display() {
        let err = ObserverError::Server("Port 8080 is already in use".to_string());
        assert_eq!(err.to_string(), "Server error: Port 8080 is already in use");
    }
}
