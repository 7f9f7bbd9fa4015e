//! Enrichment and output pipeline tests

use repo_harvester::enrich::{enrich, TagDictionary};
use repo_harvester::output::{write_csv_report, write_json_report};
use repo_harvester::{RepoRecord, Repository};

fn sample(slug: &str, description: &str, topics: &[&str]) -> Repository {
    Repository {
        name_with_owner: slug.to_string(),
        description: Some(description.to_string()),
        url: format!("https://github.com/{slug}"),
        created_at: "2023-04-01T10:00:00Z".to_string(),
        assignable_users: 1,
        watchers: 2,
        stars: 3,
        forks: 4,
        projects: 0,
        issues: 5,
        pull_requests: 6,
        disk_usage: 100,
        license: Some("Apache-2.0".to_string()),
        languages: vec!["Kotlin".to_string(), "Swift".to_string()],
        primary_language: Some("Kotlin".to_string()),
        environments: vec![],
        submodules: vec![],
        topics: topics.iter().map(|t| t.to_string()).collect(),
    }
}

#[test]
fn collected_records_flow_through_enrichment_into_both_files() {
    let repositories = vec![
        sample("dev/android-weather", "a weather app", &["weather"]),
        sample("dev/server", "an iOS backend", &["ios"]),
    ];
    let mut records: Vec<RepoRecord> = repositories.iter().map(RepoRecord::from).collect();

    let dictionary = TagDictionary::from_tags(["android", "ios", "weather"]);
    enrich(&mut records, &dictionary);

    // First record: "android" from the name, "weather" already a topic
    assert_eq!(records[0].extra.as_deref(), Some("android"));
    // Second record: "ios" matches the description but is already a topic
    assert_eq!(records[1].extra.as_deref(), Some(""));

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("results.json");
    let csv_path = dir.path().join("results.csv");

    write_json_report(&json_path, &records).unwrap();
    write_csv_report(&csv_path, &records).unwrap();

    let json: Vec<RepoRecord> =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json, records);

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().ends_with(",extra"));
    assert_eq!(lines.count(), 2);
}

#[test]
fn without_dictionary_no_extra_column_appears() {
    let repositories = vec![sample("dev/app", "plain", &[])];
    let records: Vec<RepoRecord> = repositories.iter().map(RepoRecord::from).collect();

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("results.json");
    let csv_path = dir.path().join("results.csv");

    write_json_report(&json_path, &records).unwrap();
    write_csv_report(&csv_path, &records).unwrap();

    assert!(!std::fs::read_to_string(&json_path)
        .unwrap()
        .contains("\"extra\""));
    assert!(!std::fs::read_to_string(&csv_path)
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .contains("extra"));
}

#[test]
fn empty_collection_still_produces_both_files() {
    let records: Vec<RepoRecord> = Vec::new();

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("results.json");
    let csv_path = dir.path().join("results.csv");

    write_json_report(&json_path, &records).unwrap();
    write_csv_report(&csv_path, &records).unwrap();

    assert_eq!(
        std::fs::read_to_string(&json_path).unwrap().trim(),
        "[]"
    );
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 1);
}
