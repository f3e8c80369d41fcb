// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::crd::*;
    use kube::core::ObjectMeta;
    use kube::Resource;
    use serde_json::json;

    #[test]
    fn test_virtual_machine_api_identity() {
        assert_eq!(VirtualMachine::group(&()), "nutanix.crossplane.io");
        assert_eq!(VirtualMachine::version(&()), "v1alpha1");
        assert_eq!(VirtualMachine::kind(&()), "VirtualMachine");
        assert_eq!(ProviderConfig::version(&()), "v1beta1");
        assert_eq!(ProviderConfig::kind(&()), "ProviderConfig");
    }

    #[test]
    fn test_virtual_machine_spec_deserializes_camel_case() {
        let spec: VirtualMachineSpec = serde_json::from_value(json!({
            "name": "vm-1",
            "numVcpus": 2,
            "memorySizeMib": 4096,
            "datacenter": "dc1",
            "availabilityZone": "aza",
            "lob": "eng",
            "imageName": "rhel8",
            "subnetUuid": "subnet-uuid",
            "additionalDisks": [
                {"deviceIndex": 1, "sizeGb": 50},
                {"deviceIndex": 2, "sizeGb": 20, "imageName": "data"}
            ],
            "externalFacts": {"owner": "platform"}
        }))
        .unwrap();

        assert_eq!(spec.name, "vm-1");
        assert_eq!(spec.num_vcpus, 2);
        assert_eq!(spec.memory_size_mib, 4096);
        assert_eq!(spec.datacenter(), Some("dc1"));
        assert_eq!(spec.availability_zone(), Some("aza"));
        assert_eq!(spec.image_name(), Some("rhel8"));
        assert_eq!(spec.subnet_uuid(), Some("subnet-uuid"));
        assert_eq!(spec.additional_disks.len(), 2);
        assert_eq!(spec.additional_disks[1].image_name(), Some("data"));
        assert_eq!(spec.additional_disks[0].image_name(), None);
        assert_eq!(
            spec.external_facts.unwrap().get("owner").map(String::as_str),
            Some("platform")
        );
    }

    #[test]
    fn test_empty_strings_are_treated_as_unset() {
        let spec = VirtualMachineSpec {
            name: "vm-1".into(),
            datacenter: Some(String::new()),
            lob: Some(String::new()),
            cluster_uuid: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(spec.datacenter(), None);
        assert_eq!(spec.lob(), None);
        assert_eq!(spec.cluster_uuid(), None);
    }

    #[test]
    fn test_vm_id_defaults_to_empty() {
        let vm = VirtualMachine::new("vm-1", VirtualMachineSpec::default());
        assert_eq!(vm.vm_id(), "");
        assert!(!vm.is_being_deleted());
    }

    #[test]
    fn test_vm_id_reads_status() {
        let mut vm = VirtualMachine::new("vm-1", VirtualMachineSpec::default());
        vm.status = Some(VirtualMachineStatus {
            vm_id: Some("abc-123".into()),
            state: Some("Created".into()),
            ..Default::default()
        });
        assert_eq!(vm.vm_id(), "abc-123");
    }

    #[test]
    fn test_is_being_deleted() {
        let mut vm = VirtualMachine::new("vm-1", VirtualMachineSpec::default());
        vm.metadata = ObjectMeta {
            name: Some("vm-1".into()),
            deletion_timestamp: Some(k8s_openapi::apimachinery::pkg::apis::meta::v1::Time(
                k8s_openapi::jiff::Timestamp::now(),
            )),
            ..Default::default()
        };
        assert!(vm.is_being_deleted());
    }

    #[test]
    fn test_status_serializes_vm_id_camel_case() {
        let status = VirtualMachineStatus {
            vm_id: Some("abc".into()),
            state: Some("Created".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["vmId"], "abc");
        assert_eq!(value["state"], "Created");
        assert!(value.get("observedGeneration").is_none());
    }

    #[test]
    fn test_provider_config_spec_deserializes() {
        let spec: ProviderConfigSpec = serde_json::from_value(json!({
            "credentials": {
                "source": "Secret",
                "secretRef": {"namespace": "crossplane-system", "name": "creds", "key": "credentials"}
            },
            "allowedLobs": ["eng", "qa"],
            "isLobMandatory": true,
            "prismCentralEndpoints": {"dc1": "https://pc-dc1:9440"},
            "datacenterCredentials": {
                "dc1": {
                    "source": "Secret",
                    "secretRef": {"namespace": "crossplane-system", "name": "creds-dc1", "key": "credentials"}
                }
            },
            "enableAvailabilityZoneMapping": true,
            "availabilityZoneMappingURL": "https://feed.example.com/zones.csv"
        }))
        .unwrap();

        assert_eq!(spec.credentials.source, CredentialsSource::Secret);
        assert_eq!(spec.allowed_lobs, vec!["eng", "qa"]);
        assert!(spec.is_lob_mandatory);
        assert_eq!(
            spec.prism_central_endpoints.get("dc1").map(String::as_str),
            Some("https://pc-dc1:9440")
        );
        assert_eq!(
            spec.datacenter_credentials["dc1"]
                .secret_ref
                .as_ref()
                .map(|r| r.name.as_str()),
            Some("creds-dc1")
        );
        assert!(spec.enable_availability_zone_mapping);
        assert_eq!(
            spec.availability_zone_mapping_url.as_deref(),
            Some("https://feed.example.com/zones.csv")
        );
    }

    #[test]
    fn test_provider_config_defaults() {
        let spec: ProviderConfigSpec =
            serde_json::from_value(json!({"credentials": {"source": "None"}})).unwrap();

        assert_eq!(spec.credentials.source, CredentialsSource::None);
        assert!(spec.credentials.secret_ref.is_none());
        assert!(spec.allowed_lobs.is_empty());
        assert!(!spec.is_lob_mandatory);
        assert!(spec.prism_central_endpoints.is_empty());
        assert!(!spec.enable_availability_zone_mapping);
        assert!(spec.availability_zone_mapping_url.is_none());
    }

    #[test]
    fn test_credentials_source_rejects_unknown_values() {
        let result: Result<CredentialsSource, _> = serde_json::from_value(json!("Vault"));
        assert!(result.is_err());
    }

    #[test]
    fn test_credentials_source_display() {
        assert_eq!(CredentialsSource::Secret.to_string(), "Secret");
        assert_eq!(
            CredentialsSource::InjectedIdentity.to_string(),
            "InjectedIdentity"
        );
        assert_eq!(CredentialsSource::default(), CredentialsSource::None);
    }

    #[test]
    fn test_condition_serializes_last_transition_time_camel_case() {
        let condition = Condition {
            r#type: "Ready".into(),
            status: "True".into(),
            reason: Some("Available".into()),
            message: None,
            last_transition_time: Some("2025-01-01T00:00:00Z".into()),
        };
        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(value["type"], "Ready");
        assert_eq!(value["lastTransitionTime"], "2025-01-01T00:00:00Z");
        assert!(value.get("message").is_none());
    }
}
