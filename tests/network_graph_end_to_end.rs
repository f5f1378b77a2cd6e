mod common;

use aisgraph::{
    AisGraphError, EdgeFilter, EncoderParams, GraphParams, NetworkGraph, TransitEdge, VesselBatch,
};
use approx::assert_relative_eq;
use camino::{Utf8Path, Utf8PathBuf};
use common::{hourly_batch, two_zone_domain};

fn loose_params() -> GraphParams {
    GraphParams::builder()
        .encoder(
            EncoderParams::builder()
                .distance_threshold(1e8)
                .speed_threshold(1e6)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

fn read_rows(path: &Utf8Path) -> Vec<TransitEdge> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), TransitEdge::FIELDS);
    reader.deserialize().map(|r| r.unwrap()).collect()
}

fn workspace() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8Path::from_path(dir.path()).unwrap().to_path_buf();
    (dir, path)
}

#[test]
fn test_round_trip_through_open_water() {
    let (_guard, root) = workspace();
    let output = root.join("graph.csv");
    let graph = NetworkGraph::new(two_zone_domain(), loose_params());

    let batch = hourly_batch(316_000_001, &[(-40.5, 60.5), (10.0, 10.0), (-40.5, 60.5)]);
    let report = graph.run(vec![batch], &output, &[]).unwrap();

    assert_eq!(report.vessels_processed, 1);
    assert_eq!(report.tracks, 1);
    assert_eq!(report.edges_written, 2);
    assert_eq!(report.single_position_edges, 1);
    assert!(report.failures.is_empty());
    assert_eq!(report.aggregate.unwrap().rows_written, 2);

    let rows = read_rows(&output);
    let nodes: Vec<&str> = rows.iter().map(|e| e.transit_nodes.as_str()).collect();
    assert_eq!(nodes, vec!["Z1_Z0", "Z0_Z1"]);

    assert_eq!(rows[0].mmsi, 316_000_001);
    assert_eq!(rows[0].label, Some(0));
    assert_eq!(rows[0].first_seen_in_zone, "2020-09-13 12:26 UTC");
    assert_eq!(rows[0].last_seen_in_zone, "2020-09-13 12:26 UTC");
    assert_eq!(rows[0].velocity_knots_avg, None);
    assert_eq!((rows[0].year, rows[0].month, rows[0].day), (2020, 9, 13));

    assert_eq!(rows[1].src_zone, "Z0");
    assert_eq!(rows[1].rcv_zone.as_deref(), Some("Z1"));
    assert_eq!(rows[1].last_seen_in_zone, "2020-09-13 14:26 UTC");
    assert_relative_eq!(rows[1].minutes_spent_in_zone.unwrap(), 60.0);
}

#[test]
fn test_filters_drop_rows_at_aggregation() {
    let (_guard, root) = workspace();
    let output = root.join("graph.csv");
    let graph = NetworkGraph::new(two_zone_domain(), loose_params());

    let batches = vec![
        hourly_batch(2, &[(0.2, 0.2), (0.3, 0.3), (0.4, 0.4)]),
        hourly_batch(1, &[(-40.5, 60.5), (-40.4, 60.5), (0.5, 0.5)]),
    ];
    let filters: Vec<EdgeFilter> = vec![Box::new(|e: &TransitEdge| e.is_open())];
    let report = graph.run(batches, &output, &filters).unwrap();

    let summary = report.aggregate.unwrap();
    assert_eq!(summary.artifacts, 2);
    assert_eq!(summary.rows_filtered, 1);

    let rows = read_rows(&output);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].mmsi, 1);
    assert_eq!(rows[0].transit_nodes, "Z1_Z2");
    // the last range runs to the end of the track
    assert_relative_eq!(rows[0].minutes_spent_in_zone.unwrap(), 120.0);
}

#[test]
fn test_parallel_run_isolates_failures() {
    let (_guard, root) = workspace();
    let scratch = root.join("scratch");
    let output = root.join("graph.csv");
    let params = GraphParams {
        workers: 3,
        scratch_dir: Some(scratch.clone()),
        keep_intermediates: true,
        ..loose_params()
    };
    let graph = NetworkGraph::new(two_zone_domain(), params);

    let mut batches: Vec<VesselBatch> = (10..16)
        .map(|mmsi| hourly_batch(mmsi, &[(0.2, 0.2), (0.3, 0.3)]))
        .collect();
    batches.push(VesselBatch::new(99, vec![]));

    let report = graph.run(batches, &output, &[]).unwrap();
    assert_eq!(report.vessels_processed, 6);
    assert_eq!(report.edges_written, 6);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, 99);
    assert_eq!(report.failures[0].1, AisGraphError::EmptyTrack(99));
    let stats = report.track_lengths.unwrap();
    assert_eq!((stats.min, stats.max), (2, 2));

    // artifacts are aggregated in MMSI order and kept on request
    let mmsi: Vec<u32> = read_rows(&output).iter().map(|e| e.mmsi).collect();
    assert_eq!(mmsi, (10..16).collect::<Vec<_>>());
    assert!(scratch.join("000000010").exists());
    assert!(!scratch.join("000000099").exists());
}

#[test]
fn test_no_edges_writes_header_only() {
    let (_guard, root) = workspace();
    let output = root.join("graph.csv");
    let graph = NetworkGraph::new(two_zone_domain(), GraphParams::default());

    let report = graph
        .run(vec![VesselBatch::new(7, vec![])], &output, &[])
        .unwrap();
    assert_eq!(report.edges_written, 0);
    assert!(report.aggregate.is_none());
    assert!(read_rows(&output).is_empty());
}

#[test]
fn test_interpolated_run() {
    let (_guard, root) = workspace();
    let output = root.join("graph.csv");
    let params = GraphParams {
        interp_step: Some(600),
        ..loose_params()
    };
    let graph = NetworkGraph::new(two_zone_domain(), params);

    let report = graph
        .run(vec![hourly_batch(5, &[(0.2, 0.2), (0.4, 0.4)])], &output, &[])
        .unwrap();
    let stats = report.track_lengths.unwrap();
    assert_eq!(stats.max, 7);
    assert_eq!(read_rows(&output)[0].transit_nodes, "Z2");
}
