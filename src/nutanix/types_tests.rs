// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::nutanix::types::*;

    #[test]
    fn test_credential_payload_decodes_secret_json() {
        let payload: CredentialPayload = serde_json::from_str(
            r#"{"endpoint": "https://pc:9440", "username": "admin", "password": "s3cret", "insecure": true}"#,
        )
        .unwrap();

        assert_eq!(payload.endpoint, "https://pc:9440");
        assert_eq!(payload.username, "admin");
        assert_eq!(payload.password, "s3cret");
        assert!(payload.insecure);
    }

    #[test]
    fn test_credential_payload_fields_default() {
        let payload: CredentialPayload =
            serde_json::from_str(r#"{"username": "admin"}"#).unwrap();

        assert!(payload.endpoint.is_empty());
        assert!(!payload.insecure);
    }

    #[test]
    fn test_credential_payload_debug_redacts_password() {
        let payload = CredentialPayload {
            endpoint: "https://pc:9440".into(),
            username: "admin".into(),
            password: "s3cret".into(),
            insecure: false,
        };

        let rendered = format!("{payload:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn test_timestamped_entity_accessors() {
        let image = ImageInfo {
            name: "rhel8-latest".into(),
            uuid: "img-uuid-2".into(),
            created_time: 1_720_000_000,
        };

        assert_eq!(TimestampedEntity::name(&image), "rhel8-latest");
        assert_eq!(TimestampedEntity::uuid(&image), "img-uuid-2");
        assert_eq!(TimestampedEntity::created_time(&image), 1_720_000_000);
    }
}
