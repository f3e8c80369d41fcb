// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the availability zone feed.

#[cfg(test)]
mod tests {
    use crate::errors::{PolicyError, ReconcileError, ZoneMappingError};
    use crate::zone_mapping::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = "\
Cluster Name,AvailabilityZone,Enabled
ch01-aza-ntnx-01,aza,enabled
ch02-azb-ntnx-01,azb,disabled
ch03-azc-ntnx-01,azc,Enabled
";

    #[test]
    fn test_parse_maps_enabled_zones_only() {
        let mapping = parse_zone_mapping(FEED.as_bytes()).unwrap();

        assert_eq!(
            mapping.zone_to_cluster.get("aza").map(String::as_str),
            Some("ch01-aza-ntnx-01")
        );
        assert!(!mapping.zone_to_cluster.contains_key("azb"));
        // Match on "enabled" is case-sensitive
        assert!(!mapping.zone_to_cluster.contains_key("azc"));

        assert_eq!(mapping.zone_enabled.get("aza"), Some(&true));
        assert_eq!(mapping.zone_enabled.get("azb"), Some(&false));
        assert_eq!(mapping.zone_enabled.get("azc"), Some(&false));
    }

    #[test]
    fn test_parse_column_order_independent_with_extra_columns() {
        let feed = "Owner,Enabled,AvailabilityZone,Region,Cluster Name\n\
                    infra,enabled,aza,east,ch01-aza-ntnx-01\n";
        let mapping = parse_zone_mapping(feed.as_bytes()).unwrap();

        assert_eq!(
            mapping.zone_to_cluster.get("aza").map(String::as_str),
            Some("ch01-aza-ntnx-01")
        );
    }

    #[test]
    fn test_parse_skips_short_and_empty_rows() {
        let feed = "Cluster Name,AvailabilityZone,Enabled\n\
                    ch01,aza\n\
                    ,azb,enabled\n\
                    ch03,,enabled\n\
                    ch04,azd,enabled\n";
        let mapping = parse_zone_mapping(feed.as_bytes()).unwrap();

        assert_eq!(mapping.zone_enabled.len(), 1);
        assert_eq!(
            mapping.zone_to_cluster.get("azd").map(String::as_str),
            Some("ch04")
        );
    }

    #[test]
    fn test_parse_missing_column_is_schema_error() {
        let feed = "Cluster Name,Zone,Enabled\nch01,aza,enabled\n";
        let result = parse_zone_mapping(feed.as_bytes());

        assert!(matches!(result, Err(ZoneMappingError::SchemaError { .. })));
    }

    #[test]
    fn test_parse_header_is_case_sensitive() {
        let feed = "cluster name,availabilityzone,enabled\nch01,aza,enabled\n";
        let result = parse_zone_mapping(feed.as_bytes());

        assert!(matches!(result, Err(ZoneMappingError::SchemaError { .. })));
    }

    #[test]
    fn test_parse_empty_feed_is_schema_error() {
        let result = parse_zone_mapping(b"");
        assert!(matches!(result, Err(ZoneMappingError::SchemaError { .. })));
    }

    #[test]
    fn test_cluster_for_enabled_zone() {
        let mapping = parse_zone_mapping(FEED.as_bytes()).unwrap();
        assert_eq!(mapping.cluster_for_zone("aza").unwrap(), "ch01-aza-ntnx-01");
    }

    #[test]
    fn test_cluster_for_unknown_zone_lists_feed_zones() {
        let mapping = parse_zone_mapping(FEED.as_bytes()).unwrap();

        match mapping.cluster_for_zone("azz") {
            Err(ReconcileError::Policy(PolicyError::UnknownZone { zone, known })) => {
                assert_eq!(zone, "azz");
                assert_eq!(known, vec!["aza", "azb", "azc"]);
            }
            other => panic!("expected UnknownZone, got {other:?}"),
        }
    }

    #[test]
    fn test_cluster_for_disabled_zone() {
        let mapping = parse_zone_mapping(FEED.as_bytes()).unwrap();

        assert!(matches!(
            mapping.cluster_for_zone("azb"),
            Err(ReconcileError::Policy(PolicyError::ZoneDisabled { .. }))
        ));
    }

    #[test]
    fn test_cluster_for_inconsistent_zone() {
        let mut mapping = ZoneMapping::default();
        mapping.zone_enabled.insert("aza".to_string(), true);

        assert!(matches!(
            mapping.cluster_for_zone("aza"),
            Err(ReconcileError::ZoneMapping(
                ZoneMappingError::InternalInconsistency { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_fetch_zone_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .mount(&server)
            .await;

        let url = format!("{}/zones.csv", server.uri());
        let mapping = fetch_zone_mapping(&reqwest::Client::new(), &url)
            .await
            .unwrap();

        assert_eq!(mapping.zone_enabled.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_zone_mapping_http_error_is_feed_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones.csv"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = format!("{}/zones.csv", server.uri());
        let result = fetch_zone_mapping(&reqwest::Client::new(), &url).await;

        assert!(matches!(result, Err(ZoneMappingError::FeedError { .. })));
    }
}
