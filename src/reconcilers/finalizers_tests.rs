// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `finalizers.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{VirtualMachine, VirtualMachineSpec};
    use crate::reconcilers::finalizers::{finalizers_with, finalizers_without, has_finalizer};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    const TEST_FINALIZER: &str = "nutanix.crossplane.io/virtualmachine-finalizer";

    /// Helper to create a test `VirtualMachine` with the given finalizers
    fn create_test_vm(finalizers: Option<Vec<String>>) -> VirtualMachine {
        VirtualMachine {
            metadata: ObjectMeta {
                name: Some("vm-1".to_string()),
                namespace: Some("ci".to_string()),
                finalizers,
                ..Default::default()
            },
            spec: VirtualMachineSpec {
                name: "vm-1".to_string(),
                ..Default::default()
            },
            status: None,
        }
    }

    #[test]
    fn test_has_finalizer() {
        assert!(!has_finalizer(&create_test_vm(None), TEST_FINALIZER));
        assert!(!has_finalizer(
            &create_test_vm(Some(vec!["other/finalizer".to_string()])),
            TEST_FINALIZER
        ));
        assert!(has_finalizer(
            &create_test_vm(Some(vec![TEST_FINALIZER.to_string()])),
            TEST_FINALIZER
        ));
    }

    #[test]
    fn test_finalizers_with_appends_once() {
        let vm = create_test_vm(Some(vec!["other/finalizer".to_string()]));
        assert_eq!(
            finalizers_with(&vm, TEST_FINALIZER),
            vec!["other/finalizer".to_string(), TEST_FINALIZER.to_string()]
        );

        let vm = create_test_vm(Some(vec![TEST_FINALIZER.to_string()]));
        assert_eq!(
            finalizers_with(&vm, TEST_FINALIZER),
            vec![TEST_FINALIZER.to_string()]
        );
    }

    #[test]
    fn test_finalizers_without_keeps_others() {
        let vm = create_test_vm(Some(vec![
            TEST_FINALIZER.to_string(),
            "other/finalizer".to_string(),
        ]));
        assert_eq!(
            finalizers_without(&vm, TEST_FINALIZER),
            vec!["other/finalizer".to_string()]
        );
        assert!(finalizers_without(&create_test_vm(None), TEST_FINALIZER).is_empty());
    }
}
