//! Integration tests: discovery + record stream + index + chart planning

use chrono::NaiveDate;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use swim_trends::analyzer::{AggregationIndex, EventBounds};
use swim_trends::cli::RenderConfig;
use swim_trends::model::{EventKey, Stroke, SwimmerKey};
use swim_trends::records::collect_records;
use swim_trends::renderer::{plan_event_charts, plan_swimmer_charts};
use swim_trends::source::{self, JsonMeetParser, ResultFile};
use zip::write::SimpleFileOptions;

fn meet_json(name: &str, date: &str, entries: &str) -> String {
    format!(
        r#"{{"name": "{name}", "start_date": "{date}",
            "events": [{{"number": "1", "distance": 100, "stroke": "Freestyle", "entries": [{entries}]}}]}}"#
    )
}

fn smith(time: f64) -> String {
    format!(r#"{{"swimmers": [{{"last_name": "Smith", "first_name": "Ann"}}], "finals_time": {time}}}"#)
}

fn write_zip(path: &Path, members: &[(&str, String)]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, body) in members {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =================================================================================================
// Discovery
// =================================================================================================

#[test]
fn discovers_loose_and_archived_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("2023/spring")).unwrap();
    fs::write(root.join("2023/spring/b.json"), meet_json("B", "2023-04-01", &smith(60.0))).unwrap();
    fs::write(root.join("2023/notes.txt"), "not a meet").unwrap();
    fs::write(root.join("a.json"), meet_json("A", "2023-01-01", &smith(61.0))).unwrap();
    write_zip(
        &root.join("2023/archive.zip"),
        &[
            ("meets/z.json", meet_json("Z", "2022-01-01", &smith(63.0))),
            ("meets/readme.md", "ignored".to_string()),
            ("meets/c.json", meet_json("C", "2022-06-01", &smith(62.0))),
        ],
    );

    let files = source::discover(root, &JsonMeetParser).unwrap();
    assert_eq!(
        files,
        vec![
            ResultFile::Archived { archive: root.join("2023/archive.zip"), member: "meets/c.json".to_string() },
            ResultFile::Archived { archive: root.join("2023/archive.zip"), member: "meets/z.json".to_string() },
            ResultFile::Loose(root.join("2023/spring/b.json")),
            ResultFile::Loose(root.join("a.json")),
        ]
    );

    let meets: Vec<_> = source::load_meets(&files, &JsonMeetParser)
        .collect::<Result<_, _>>()
        .unwrap();
    let names: Vec<&str> = meets.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["C", "Z", "B", "A"]);
}

#[test]
fn malformed_file_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("good.json"), meet_json("G", "2023-01-01", &smith(60.0))).unwrap();
    fs::write(dir.path().join("bad.json"), "{ not json").unwrap();

    let files = source::discover(dir.path(), &JsonMeetParser).unwrap();
    let result = collect_records(source::load_meets(&files, &JsonMeetParser));
    assert!(result.is_err());
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(source::discover(&dir.path().join("absent"), &JsonMeetParser).is_err());
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.json"), meet_json("A", "2023-01-01", &smith(61.0))).unwrap();
    fs::create_dir(root.join("meets")).unwrap();
    std::os::unix::fs::symlink(root, root.join("meets/loop")).unwrap();

    let files = source::discover(root, &JsonMeetParser).unwrap();
    assert_eq!(files, vec![ResultFile::Loose(root.join("a.json"))]);
}

// =================================================================================================
// End to end
// =================================================================================================

#[test]
fn two_swims_make_one_trend_chart() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("d1.json"), meet_json("First", "2023-01-07", &smith(60.0))).unwrap();
    fs::write(dir.path().join("d2.json"), meet_json("Second", "2023-02-11", &smith(58.0))).unwrap();

    let files = source::discover(dir.path(), &JsonMeetParser).unwrap();
    let records = collect_records(source::load_meets(&files, &JsonMeetParser)).unwrap();
    let index = AggregationIndex::build(&records);

    let event = EventKey::new(100, Stroke::Freestyle);
    assert_eq!(index.bounds(&event), Some(EventBounds { best: 58.0, worst: 60.0 }));
    assert_eq!(index.axis().dates(), &[date(2023, 1, 7), date(2023, 2, 11)]);

    let charts = plan_swimmer_charts(&index, &RenderConfig::default());
    assert_eq!(charts.len(), 1);
    assert_eq!(charts[0].swimmer, SwimmerKey::new("Smith", "Ann"));
    assert_eq!(charts[0].points, vec![(0, 60.0), (1, 58.0)]);
    assert_eq!(charts[0].y_range, (58.0, 60.0));
    assert_eq!(charts[0].file_stem(), "Smith_Ann_100_Freestyle");
}

#[test]
fn relays_never_reach_the_charts() {
    let relay = r#"{"swimmers": [
        {"last_name": "Smith", "first_name": "Ann"},
        {"last_name": "Jones", "first_name": "Bea"}
    ], "finals_time": 240.0}"#;
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("r1.json"), meet_json("R1", "2023-01-07", relay)).unwrap();
    fs::write(dir.path().join("r2.json"), meet_json("R2", "2023-02-07", relay)).unwrap();

    let files = source::discover(dir.path(), &JsonMeetParser).unwrap();
    let records = collect_records(source::load_meets(&files, &JsonMeetParser)).unwrap();
    assert!(records.is_empty());

    let index = AggregationIndex::build(&records);
    assert!(plan_swimmer_charts(&index, &RenderConfig::default()).is_empty());
    assert!(plan_event_charts(&index, &RenderConfig::default()).is_empty());
}

#[test]
fn event_comparison_spans_the_shared_axis() {
    let jones = |t: f64| {
        format!(r#"{{"swimmers": [{{"last_name": "Jones", "first_name": "Bea"}}], "finals_time": {t}}}"#)
    };
    let dir = tempfile::tempdir().unwrap();
    let meets = [
        ("m1.json", "2023-01-01", format!("{},{}", smith(62.0), jones(66.0))),
        ("m2.json", "2023-02-01", smith(61.0)),
        ("m3.json", "2023-03-01", jones(64.0)),
        ("m4.json", "2023-04-01", smith(60.0)),
    ];
    for (file, day, entries) in &meets {
        fs::write(dir.path().join(file), meet_json(file, day, entries)).unwrap();
    }

    let files = source::discover(dir.path(), &JsonMeetParser).unwrap();
    let records = collect_records(source::load_meets(&files, &JsonMeetParser)).unwrap();
    let index = AggregationIndex::build(&records);

    let charts = plan_event_charts(&index, &RenderConfig::default());
    assert_eq!(charts.len(), 1);
    let chart = &charts[0];
    assert_eq!(chart.y_range, (60.0, 66.0));

    let jones = &chart.series[0];
    assert_eq!(jones.swimmer, SwimmerKey::new("Jones", "Bea"));
    assert_eq!(jones.observed, vec![(0, 66.0), (2, 64.0)]);
    assert_eq!(jones.dense, vec![66.0, 65.0, 64.0, 63.0]);

    let smith = &chart.series[1];
    assert_eq!(smith.dense, vec![62.0, 61.0, 60.5, 60.0]);
}
