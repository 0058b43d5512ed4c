//! Whole-pipeline scenarios: raw table text in, derived network out.

use rail_feed::config::FeedConfig;
use rail_feed::feed::FeedTable;
use rail_feed::geometry::Mode;
use rail_feed::loader::{CancelToken, FeedLoader, LoadError, MemorySource};
use rail_feed::network::Network;

const STOPS: &str = "\
stop_id,stop_code,stop_name,stop_desc,stop_lat,stop_lon,zone_id
A,A,A,,39.0,9.0,Z1
B,B,B,,39.5,9.5,Z1
C,C,C,,39.1,9.1,Z1
D,D,D,,39.3,9.3,Z1
";

const SHAPES: &str = "\
shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence
1-X,39.0,9.0,1
1-X,39.5,9.5,2
";

const TRIPS: &str = "\
route_id,service_id,trip_id,shape_id,direction_id
R1,FER,T1,1-X,0
";

const STOP_TIMES: &str = "\
trip_id,arrival_time,departure_time,stop_id,stop_sequence
T1,08:00:00,08:00:00,A,1
T1,08:40:00,08:40:00,B,2
";

fn routes(route_type: u16) -> String {
    format!("route_id,agency_id,route_short_name,route_long_name,route_type\nR1,ARST,R1,Linea 1,{route_type}\n")
}

fn source(trips: &str, stop_times: &str, routes: &str) -> MemorySource {
    MemorySource::new()
        .with_table(FeedTable::Stops, STOPS)
        .with_table(FeedTable::Shapes, SHAPES)
        .with_table(FeedTable::Trips, trips)
        .with_table(FeedTable::StopTimes, stop_times)
        .with_table(FeedTable::Routes, routes)
}

async fn load(source: MemorySource) -> Result<Network, LoadError> {
    FeedLoader::new(source, FeedConfig::default())
        .load(&CancelToken::new())
        .await
}

#[tokio::test]
async fn single_rail_trip_gives_one_path() {
    let network = load(source(TRIPS, STOP_TIMES, &routes(2))).await.unwrap();

    let paths = network.path_summaries();
    assert_eq!(paths.len(), 1);
    let path = &paths[0];
    assert!(path.name.contains("A → B"), "name was {}", path.name);
    assert_eq!(path.origin.id, "A");
    assert_eq!(path.destination.id, "B");
    assert_eq!(path.geometry.len(), 2);
    assert_eq!(path.mode, Mode::Rail);

    assert_eq!(network.path_features().features.len(), 1);
    assert_eq!(network.station_features().features.len(), 4);
}

#[tokio::test]
async fn road_route_gives_no_paths() {
    let network = load(source(TRIPS, STOP_TIMES, &routes(3))).await.unwrap();

    assert!(network.path_summaries().is_empty());
    assert_eq!(network.diagnostics().derivation.road_shapes, 1);
    // Stations are still published even when no path survives.
    assert_eq!(network.stations().len(), 4);
}

#[tokio::test]
async fn longer_duplicate_shape_survives() {
    let trips = "\
route_id,service_id,trip_id,shape_id
R1,FER,T1,1-X
R1,FER,T2,1-Y
";
    let stop_times = "\
trip_id,arrival_time,departure_time,stop_id,stop_sequence
T1,08:00:00,08:00:00,A,1
T1,08:40:00,08:40:00,B,2
T2,09:00:00,09:00:00,A,1
T2,09:10:00,09:10:00,C,2
T2,09:25:00,09:25:00,D,3
T2,09:40:00,09:40:00,B,4
";

    let network = load(source(trips, stop_times, &routes(2))).await.unwrap();

    let paths = network.path_summaries();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].shape_id, "1-Y");
    assert_eq!(paths[0].stations.len(), 4);
    assert_eq!(network.diagnostics().derivation.duplicates_collapsed, 1);
}

#[tokio::test]
async fn malformed_rows_are_dropped_and_counted() {
    let stop_times = "\
trip_id,arrival_time,departure_time,stop_id,stop_sequence
T1,08:00:00,08:00:00,A,1
T1,08:20:00,08:20:00,GHOST,2
T1,08:30:00,08:30:00,C,three
T1,08:40:00,08:40:00,B,4
";

    let network = load(source(TRIPS, stop_times, &routes(2))).await.unwrap();

    let diagnostics = network.diagnostics();
    let stop_time_report = diagnostics
        .tables
        .iter()
        .find(|r| r.table == FeedTable::StopTimes)
        .unwrap();
    assert_eq!(stop_time_report.rows, 3);
    assert_eq!(stop_time_report.skipped, 1);
    assert_eq!(diagnostics.derivation.unresolved_stop_times, 1);

    let path = &network.path_summaries()[0];
    assert_eq!(path.stations.len(), 2);
}

#[tokio::test]
async fn missing_required_table_fails_the_load() {
    let source = MemorySource::new()
        .with_table(FeedTable::Stops, STOPS)
        .with_table(FeedTable::Shapes, SHAPES)
        .with_table(FeedTable::Trips, TRIPS)
        .with_table(FeedTable::Routes, routes(2));

    match load(source).await {
        Err(LoadError::Source { table, .. }) => assert_eq!(table, FeedTable::StopTimes),
        other => panic!("expected source error, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_load_builds_nothing() {
    let loader = FeedLoader::new(source(TRIPS, STOP_TIMES, &routes(2)), FeedConfig::default());
    let cancel = CancelToken::new();
    cancel.cancel();

    assert!(matches!(loader.load(&cancel).await, Err(LoadError::Cancelled)));
}

#[tokio::test]
async fn optional_tables_enrich_the_network() {
    let source = source(TRIPS, STOP_TIMES, &routes(2))
        .with_table(
            FeedTable::Agency,
            "agency_id,agency_name,agency_url,agency_timezone,agency_lang\n\
             ARST,ARST Trasporti,https://www.arst.sardegna.it,Europe/Rome,it\n",
        )
        .with_table(
            FeedTable::CalendarDates,
            "service_id,date,exception_type\nFER,20240102,1\nFER,20240106,2\n",
        );

    let network = load(source).await.unwrap();
    assert_eq!(network.agencies()[0].name, "ARST Trasporti");
    assert_eq!(network.calendar_dates().len(), 2);
}
