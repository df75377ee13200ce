use httpmock::prelude::*;
use serde_json::{json, Value};
use social_scout::core::filter::Thresholds;
use social_scout::domain::model::{DiscoveryMode, ExportFormat, Feed, Platform, SortSpec};
use social_scout::domain::ports::PageLimits;
use social_scout::{
    EtlEngine, HikerClient, InstagramSource, LamatokClient, LocalStorage, ScrapePipeline,
    ScrapeRequest, TikTokSource,
};
use std::io::Read;
use std::time::Duration;
use tempfile::TempDir;

const NOW: i64 = 1_750_000_000;

fn request(
    platform: Platform,
    targets: &[&str],
    thresholds: Thresholds,
    formats: Vec<ExportFormat>,
    output_path: &str,
) -> ScrapeRequest {
    ScrapeRequest {
        platform,
        mode: DiscoveryMode::Hashtag,
        targets: targets.iter().map(|t| t.to_string()).collect(),
        invalid_targets: vec![],
        feed: Feed::default_for(platform, DiscoveryMode::Hashtag),
        limits: PageLimits::default(),
        thresholds,
        sort: SortSpec::default(),
        formats,
        output_path: output_path.to_string(),
    }
}

fn tiktok_item(id: &str, likes: u64) -> Value {
    json!({
        "id": id,
        "createTime": NOW - 86_400,
        "author": {"uniqueId": format!("creator{}", id)},
        "authorStats": {"followerCount": 1200},
        "stats": {"playCount": 5000, "diggCount": likes, "commentCount": 3},
        "poi": {"name": "Lisbon"}
    })
}

fn instagram_media(code: &str, likes: u64) -> Value {
    json!({
        "pk": format!("pk_{}", code),
        "code": code,
        "like_count": likes,
        "comment_count": 2,
        "play_count": 100,
        "taken_at": NOW - 3600,
        "user": {"username": format!("owner_{}", code), "follower_count": 50}
    })
}

#[tokio::test]
async fn test_tiktok_end_to_end_exports_filtered_rows() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    let info_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/hashtag/info")
            .query_param("hashtag", "bitcoin")
            .query_param("access_key", "tt-key");
        then.status(200)
            .json_body(json!({"challengeInfo": {"challenge": {"id": "777"}}}));
    });
    let medias_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/hashtag/medias")
            .query_param("id", "777")
            .query_param("count", "30");
        then.status(200).json_body(json!({
            "itemList": [tiktok_item("1", 500), tiktok_item("2", 3), tiktok_item("3", 80)],
            "hasMore": false,
            "cursor": "30"
        }));
    });

    let client =
        LamatokClient::new(&server.base_url(), "tt-key", Duration::from_secs(5)).unwrap();
    let thresholds = Thresholds {
        min_likes: 10,
        ..Thresholds::default()
    };
    let pipeline = ScrapePipeline::new(
        LocalStorage::new(output_path.clone()),
        TikTokSource::new(client),
        request(
            Platform::TikTok,
            &["bitcoin"],
            thresholds,
            vec![ExportFormat::Csv, ExportFormat::Zip],
            &output_path,
        ),
    )
    .with_now(NOW);

    let report = EtlEngine::new(pipeline).run().await.unwrap();

    info_mock.assert();
    medias_mock.assert();
    assert_eq!(report.rows, 2);
    assert_eq!(report.table.lines().count(), 4);
    assert_eq!(report.meta.total_fetched, 3);
    assert_eq!(report.meta.total_requests, 1);
    assert_eq!(report.outputs.len(), 2);

    let csv_path = temp_dir.path().join("tiktok_bitcoin.csv");
    let csv_content = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv_content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Hashtag,Username,View Count,Like Count"));
    assert!(lines[1].starts_with("#bitcoin,creator1,5000,500,3,"));
    assert!(lines[1].contains("https://www.tiktok.com/@creator1/video/1"));
    assert!(lines[2].starts_with("#bitcoin,creator3,"));

    let zip_data = std::fs::read(temp_dir.path().join("tiktok_bitcoin.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(names, vec!["results.csv", "results.json", "meta.json"]);

    let mut meta_content = String::new();
    archive
        .by_name("meta.json")
        .unwrap()
        .read_to_string(&mut meta_content)
        .unwrap();
    let meta: Value = serde_json::from_str(&meta_content).unwrap();
    assert_eq!(meta["platform"], "tiktok");
    assert_eq!(meta["total_kept"], 2);
}

#[tokio::test]
async fn test_instagram_failing_target_does_not_abort_run() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    let good_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/hashtag/medias/top/chunk")
            .query_param("name", "sunset")
            .header("x-access-key", "ig-token");
        then.status(200).json_body(json!([
            [instagram_media("A1", 40), instagram_media("B2", 400)],
            null
        ]));
    });
    let bad_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/hashtag/medias/top/chunk")
            .query_param("name", "broken");
        then.status(500).json_body(json!({"detail": "upstream exploded"}));
    });

    let client = HikerClient::new(&server.base_url(), "ig-token", Duration::from_secs(5)).unwrap();
    let pipeline = ScrapePipeline::new(
        LocalStorage::new(output_path.clone()),
        InstagramSource::new(client),
        request(
            Platform::Instagram,
            &["broken", "sunset"],
            Thresholds::default(),
            vec![ExportFormat::Json],
            &output_path,
        ),
    )
    .with_now(NOW);

    let report = EtlEngine::new(pipeline).run().await.unwrap();

    good_mock.assert();
    bad_mock.assert();
    assert_eq!(report.rows, 2);
    assert_eq!(report.meta.failures.len(), 1);
    assert_eq!(report.meta.failures[0].target, "broken");
    assert!(report.meta.failures[0].message.contains("upstream exploded"));

    let json_content =
        std::fs::read_to_string(temp_dir.path().join("instagram_broken_sunset.json")).unwrap();
    let rows: Vec<Value> = serde_json::from_str(&json_content).unwrap();
    assert_eq!(rows.len(), 2);
    // engagement descending: B2 has more likes
    assert_eq!(rows[0]["post_url"], "https://www.instagram.com/p/B2/");
    assert_eq!(rows[0]["hashtag"], "#sunset");
    assert_eq!(rows[1]["username"], "owner_A1");
}

#[tokio::test]
async fn test_no_matches_writes_no_files() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("out");
    let output_path = output_path.to_str().unwrap().to_string();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/hashtag/info");
        then.status(200)
            .json_body(json!({"challengeInfo": {"challenge": {"id": 9}}}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/hashtag/medias");
        then.status(200)
            .json_body(json!({"itemList": [tiktok_item("1", 1)], "hasMore": false}));
    });

    let client = LamatokClient::new(&server.base_url(), "tt-key", Duration::from_secs(5)).unwrap();
    let thresholds = Thresholds {
        min_views: 1_000_000,
        ..Thresholds::default()
    };
    let pipeline = ScrapePipeline::new(
        LocalStorage::new(output_path.clone()),
        TikTokSource::new(client),
        request(
            Platform::TikTok,
            &["quiet"],
            thresholds,
            vec![ExportFormat::Csv, ExportFormat::Tsv],
            &output_path,
        ),
    )
    .with_now(NOW);

    let report = EtlEngine::new(pipeline).run().await.unwrap();

    assert!(report.is_empty());
    assert_eq!(report.table, "No results matched your filters.");
    assert!(report.outputs.is_empty());
    assert!(!std::path::Path::new(&output_path).exists());
}

#[tokio::test]
async fn test_unknown_tiktok_hashtag_is_recorded_as_failure() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/hashtag/info");
        then.status(200).json_body(json!({"challengeInfo": {}}));
    });

    let client = LamatokClient::new(&server.base_url(), "tt-key", Duration::from_secs(5)).unwrap();
    let pipeline = ScrapePipeline::new(
        LocalStorage::new(output_path.clone()),
        TikTokSource::new(client),
        request(
            Platform::TikTok,
            &["nosuchtag"],
            Thresholds::default(),
            vec![ExportFormat::Csv],
            &output_path,
        ),
    )
    .with_now(NOW);

    let report = EtlEngine::new(pipeline).run().await.unwrap();

    assert!(report.is_empty());
    assert_eq!(report.meta.failures.len(), 1);
    assert!(report.meta.failures[0].message.contains("nosuchtag"));
}

#[tokio::test]
async fn test_malformed_hashtag_lookup_fails_target() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    let info_mock = server.mock(|when, then| {
        when.method(GET).path("/hashtag/info");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<html>rate limited</html>");
    });
    let medias_mock = server.mock(|when, then| {
        when.method(GET).path("/hashtag/medias");
        then.status(200)
            .json_body(json!({"itemList": [tiktok_item("1", 100)], "hasMore": false}));
    });

    let client = LamatokClient::new(&server.base_url(), "tt-key", Duration::from_secs(5)).unwrap();
    let pipeline = ScrapePipeline::new(
        LocalStorage::new(output_path.clone()),
        TikTokSource::new(client),
        request(
            Platform::TikTok,
            &["bitcoin"],
            Thresholds::default(),
            vec![ExportFormat::Csv],
            &output_path,
        ),
    )
    .with_now(NOW);

    let report = EtlEngine::new(pipeline).run().await.unwrap();

    info_mock.assert();
    medias_mock.assert_hits(0);
    assert!(report.is_empty());
    assert_eq!(report.meta.failures.len(), 1);
    assert_eq!(report.meta.failures[0].target, "bitcoin");
    assert!(report.meta.failures[0]
        .message
        .contains("Malformed payload from /hashtag/info"));
}

#[tokio::test]
async fn test_malformed_user_lookup_fails_target() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    let user_mock = server.mock(|when, then| {
        when.method(GET).path("/v1/user/by/username");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<html>login required</html>");
    });
    let medias_mock = server.mock(|when, then| {
        when.method(GET).path("/v1/user/medias/chunk");
        then.status(200)
            .json_body(json!([[instagram_media("A1", 10)], null]));
    });

    let mut req = request(
        Platform::Instagram,
        &["nasa"],
        Thresholds::default(),
        vec![ExportFormat::Csv],
        &output_path,
    );
    req.mode = DiscoveryMode::Username;
    req.feed = Feed::Posts;

    let client = HikerClient::new(&server.base_url(), "ig-token", Duration::from_secs(5)).unwrap();
    let pipeline = ScrapePipeline::new(
        LocalStorage::new(output_path.clone()),
        InstagramSource::new(client),
        req,
    )
    .with_now(NOW);

    let report = EtlEngine::new(pipeline).run().await.unwrap();

    user_mock.assert();
    medias_mock.assert_hits(0);
    assert!(report.is_empty());
    assert_eq!(report.meta.failures.len(), 1);
    assert_eq!(report.meta.failures[0].target, "nasa");
    assert!(report.meta.failures[0]
        .message
        .contains("Malformed payload from /v1/user/by/username"));
}
