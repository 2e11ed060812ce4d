use listmap::prelude::*;
use listmap::style::cluster_radius;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn tagged(name: &str, dataset: &str, lat: f64, lon: f64) -> TaggedLocation {
    TaggedLocation {
        record: LocationRecord::new(name, "Seoul").with_coordinates(lat, lon),
        dataset_id: dataset.to_string(),
        dataset_name: dataset.to_string(),
        dataset_color: "#e74c3c".to_string(),
    }
}

fn record(name: &str, lat: f64, lon: f64) -> LocationRecord {
    LocationRecord::new(name, "Seoul").with_coordinates(lat, lon)
}

fn session(zoom: f64) -> MapSession {
    MapSession::new(
        MarkerConfig::default(),
        LatLng::new(37.5, 127.0),
        zoom,
        Point::new(1024.0, 768.0),
    )
}

fn first_feature_pixel(session: &MapSession) -> Point {
    let map = session.map();
    let layers = map.layers().layers();
    let feature = &layers[0].features()[0];
    map.feature_pixel(feature)
}

#[test]
fn test_grouping_partitions_valid_records() {
    init();
    let mut missing = tagged("missing", "d1", 0.0, 0.0);
    missing.record.lat = None;
    let locations = vec![
        tagged("a", "d1", 37.50, 127.04),
        missing,
        tagged("b", "d1", 37.52, 126.92),
        tagged("c", "d2", 37.50, 127.04),
        tagged("zero", "d1", 0.0, 0.0),
        tagged("d", "d1", 37.52, 126.92),
    ];

    let groups = group_locations_by_coordinates(&locations);
    let valid = locations.iter().filter(|l| l.coordinates().is_some()).count();
    assert_eq!(groups.iter().map(|g| g.units.len()).sum::<usize>(), valid);

    let mut keys: Vec<(u64, u64)> = groups
        .iter()
        .map(|g| (g.lat.to_bits(), g.lon.to_bits()))
        .collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), groups.len());

    assert_eq!(groups[0].units[0].name(), "a");
}

#[test]
fn test_three_records_make_two_groups() {
    let locations = vec![
        tagged("a", "d1", 37.50, 127.04),
        tagged("b", "d1", 37.50, 127.04),
        tagged("c", "d1", 37.52, 126.92),
    ];

    let groups = group_locations_by_coordinates(&locations);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].units.len(), 2);
    assert_eq!(groups[1].units.len(), 1);
}

#[test]
fn test_change_detection_is_reflexive_and_length_sound() {
    let empty: Vec<TaggedLocation> = Vec::new();
    let one = vec![tagged("a", "d1", 37.5, 127.0)];
    let two = vec![tagged("a", "d1", 37.5, 127.0), tagged("b", "d1", 37.6, 127.0)];

    assert!(!locations_changed(&empty, &empty));
    assert!(!locations_changed(&two, &two));
    assert!(locations_changed(&one, &two));
    assert!(locations_changed(&empty, &one));
}

#[test]
fn test_cluster_radius_is_monotonic_and_bounded() {
    let radii: Vec<f64> = (1..=20).map(cluster_radius).collect();
    assert!(radii.windows(2).all(|w| w[0] <= w[1]));
    assert!(radii.iter().all(|r| *r <= 50.0));
}

#[test]
fn test_zoom_crossing_switches_from_clusters_to_pins() {
    init();
    let mut session = session(10.0);
    let records: Vec<LocationRecord> = (0..5)
        .map(|i| record(&format!("unit {}", i), 37.45 + i as f64 * 0.03, 127.0 + i as f64 * 0.03))
        .collect();
    let id = session.datasets_mut().add_dataset(records, "north");

    session.flush();
    assert_eq!(session.controller().state(&id), RenderState::Clustered);
    assert!(session.map().layers().contains(&ClusterLayer::layer_id(&id)));

    session.set_zoom(13.0);
    let report = session.flush();
    assert_eq!(report.torn_down, vec![id.clone()]);
    assert_eq!(session.controller().state(&id), RenderState::Flat);
    assert!(!session.map().layers().contains(&ClusterLayer::layer_id(&id)));

    let markers = session
        .map()
        .layers()
        .get_layer_as::<MarkerLayer>("markers")
        .expect("marker layer");
    assert_eq!(markers.feature_count(), 5);
    for feature in markers.features() {
        let marker = feature.as_group().expect("flat features are group markers");
        let pin = marker.styles[0].as_pin().expect("pin style");
        assert_eq!(pin.color.to_hex(), "#9b59b6");
    }
}

#[test]
fn test_second_sync_is_a_noop() {
    let mut session = session(9.0);
    session
        .datasets_mut()
        .add_dataset(vec![record("a", 37.5, 127.0), record("b", 37.7, 127.2)], "a");
    session.flush();

    let revision = session.map().layers().revision();
    let report = session.flush();
    assert!(report.is_noop());
    assert_eq!(session.map().layers().revision(), revision);
}

#[test]
fn test_clicking_multi_group_cluster_fits_its_extent() {
    init();
    let mut session = session(9.0);
    let records = vec![
        record("a", 37.500, 127.000),
        record("b", 37.501, 127.001),
        record("c", 37.502, 127.002),
        record("d", 37.503, 127.003),
    ];
    session.datasets_mut().add_dataset(records, "cluster");
    session.flush();
    assert_eq!(session.map().layers().feature_count(), 1);

    let pixel = first_feature_pixel(&session);
    let interaction = session.click(pixel);

    match interaction {
        Interaction::ZoomToExtent(request) => assert_eq!(request.max_zoom, 14.0),
        other => panic!("expected a zoom to the cluster, got {:?}", other),
    }
    assert!(session.selection().is_none());
    match session.map().last_action() {
        Some(Action::FitExtent { max_zoom, zoom, .. }) => {
            assert_eq!(*max_zoom, 14.0);
            assert!(*zoom <= 14.0);
        }
        other => panic!("expected a fit action, got {:?}", other),
    }
}

#[test]
fn test_clicking_empty_area_clears_selection() {
    let mut session = session(14.0);
    session
        .datasets_mut()
        .add_dataset(vec![record("pin", 37.5, 127.0)], "a");
    session.flush();

    let pin = first_feature_pixel(&session);
    session.click(Point::new(pin.x, pin.y - 10.0));
    assert!(session.selection().is_some());

    assert_eq!(
        session.click(Point::new(3.0, 3.0)),
        Interaction::Select(None)
    );
    assert!(session.selection().is_none());
}

#[test]
fn test_deselecting_everything_leaves_no_features() {
    init();
    let mut session = session(9.0);
    let a = session
        .datasets_mut()
        .add_dataset(vec![record("a", 37.5, 127.0)], "a");
    let b = session
        .datasets_mut()
        .add_dataset(vec![record("b", 37.6, 127.1)], "b");
    session.flush();
    assert_eq!(session.map().layers().len(), 2);

    session.datasets_mut().toggle_all(false);
    session.flush();

    assert_eq!(session.controller().state(&a), RenderState::Absent);
    assert_eq!(session.controller().state(&b), RenderState::Absent);
    assert_eq!(session.map().layers().feature_count(), 0);
    assert!(session.map().layers().is_empty());
}

#[test]
fn test_rapid_mutations_collapse_into_one_rebuild() {
    let mut session = session(14.0);
    let start = Instant::now();
    let id = session
        .datasets_mut()
        .add_dataset(vec![record("a", 37.5, 127.0)], "a");
    session.pump(start);

    session.datasets_mut().toggle_dataset(&id);
    session.pump(start + Duration::from_millis(20));
    session.datasets_mut().toggle_dataset(&id);
    session.pump(start + Duration::from_millis(40));

    assert!(session.pump(start + Duration::from_millis(60)).is_none());
    let report = session
        .pump(start + Duration::from_millis(90))
        .expect("debounced sync");
    assert_eq!(report.built, vec![id.clone()]);
    assert_eq!(session.map().layers().feature_count(), 1);
    assert!(session.pump(start + Duration::from_secs(1)).is_none());
}

#[test]
fn test_datasets_render_independently() {
    let mut session = session(9.0);
    let a = session
        .datasets_mut()
        .add_dataset(vec![record("a", 37.5, 127.0)], "a");
    let b = session
        .datasets_mut()
        .add_dataset(vec![record("b", 37.501, 127.001)], "b");
    session.flush();

    assert!(session.map().layers().contains(&ClusterLayer::layer_id(&a)));
    assert!(session.map().layers().contains(&ClusterLayer::layer_id(&b)));

    session.datasets_mut().toggle_dataset(&a);
    session.flush();
    assert!(!session.map().layers().contains(&ClusterLayer::layer_id(&a)));
    assert!(session.map().layers().contains(&ClusterLayer::layer_id(&b)));
}

#[test]
fn test_adjacent_datasets_never_share_a_cluster() {
    init();
    let mut session = session(9.0);
    // interleaved groups a few metres apart, all inside one cluster radius
    let north: Vec<_> = (0..4)
        .map(|i| record(&format!("n{}", i), 37.5 + i as f64 * 0.0002, 127.0))
        .collect();
    let south: Vec<_> = (0..3)
        .map(|i| record(&format!("s{}", i), 37.5001 + i as f64 * 0.0002, 127.0001))
        .collect();
    let first = session.datasets_mut().add_dataset(north, "north");
    let second = session.datasets_mut().add_dataset(south, "south");
    session.flush();

    for id in [&first, &second] {
        assert_eq!(session.controller().state(id), RenderState::Clustered);
        let layer = session
            .map()
            .layers()
            .get_layer_as::<ClusterLayer>(&ClusterLayer::layer_id(id))
            .expect("cluster layer per dataset");

        let mut members = 0;
        for feature in layer.features() {
            let RenderedFeature::Cluster(cluster) = feature else {
                panic!("cluster layer holds a non-cluster feature");
            };
            assert_eq!(&cluster.dataset_id, id);
            for group in &cluster.members {
                assert_eq!(group.dataset_id(), Some(id.as_str()));
                assert!(group.units.iter().all(|unit| &unit.dataset_id == id));
            }
            members += cluster.members.len();
        }
        assert_eq!(members, session.controller().groups(id).len());
    }
    assert_eq!(session.controller().groups(&first).len(), 4);
    assert_eq!(session.controller().groups(&second).len(), 3);
}
