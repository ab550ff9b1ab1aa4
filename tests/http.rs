use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

const FIXTURE: &str = r#"{
    "section1": {
        "top_songs": {"Song A": 1230000, "An Extremely Long Song Title That Keeps Going": 600000},
        "top_artists": {"Artist": 7200000}
    },
    "section2": {
        "daily_hours": {"2024-01-01": 1.23456},
        "hour_minutes": {"9": 30.4}
    },
    "section3": {
        "skip_rate": 0.25,
        "top_streaks": [{"track": "Loop", "streak": 12}],
        "ms_played_histogram": {"(0, 10000]": 3.0}
    },
    "section4": {
        "platform_percent": {"ios": 0.5433, "android": 0.4567},
        "platform_over_time": {
            "2024-01-01": {"ios": 0.5, "android": 1.234},
            "2024-01-02": {"web": 2.0}
        }
    },
    "section5": {"total_sessions": 412.0}
}"#;

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn write_fixture() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("listening_dashboard_http_{}_{}.json", std::process::id(), nanos));
    std::fs::write(&path, FIXTURE).expect("write fixture");
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = write_fixture();
    let child = Command::new(env!("CARGO_BIN_EXE_listening_dashboard"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_json(path: &str) -> Value {
    let server = shared_server().await;
    let response = Client::new()
        .get(format!("{}{path}", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_dashboard_serves_normalized_sections() {
    let dashboard = get_json("/api/dashboard").await;

    let songs = &dashboard["topEntities"]["topSongs"];
    assert_eq!(songs[0]["name"], "Song A");
    assert_eq!(songs[0]["fullName"], "Song A");
    assert_eq!(songs[0]["playtime"], 21);
    assert_eq!(songs[0]["playtimeMs"].to_string(), "1230000");
    assert_eq!(songs[1]["name"], "An Extremely Long Song Title T…");
    assert_eq!(songs[1]["playtime"], 10);
    assert_eq!(dashboard["topEntities"]["topArtists"][0]["playtime"], 120);

    assert_eq!(dashboard["timeSeries"]["dailyHours"][0]["hours"], 1.23);
    assert_eq!(dashboard["timeSeries"]["hourlyMinutes"][0], json!({"hour": 9, "minutes": 30}));

    assert_eq!(dashboard["behavior"]["skipRate"], 25);
    assert_eq!(dashboard["behavior"]["loyaltyMetric"], 0);
    assert_eq!(dashboard["behavior"]["topStreaks"][0]["fullTrack"], "Loop");
    assert_eq!(
        dashboard["behavior"]["trackPlaytimeHistogram"][0],
        json!({"range": "(0, 10000]", "count": 3.0, "mean": 5})
    );

    assert_eq!(dashboard["sessions"]["totalSessions"], 412.0);
    assert_eq!(dashboard["sessions"]["sessionLengthHistogram"], json!([]));
}

#[tokio::test]
async fn http_section_by_number_and_slug() {
    let by_number = get_json("/api/sections/4").await;
    let by_slug = get_json("/api/sections/platform").await;
    assert_eq!(by_number, by_slug);
    assert_eq!(
        by_number["platformPercentages"][0],
        json!({"platform": "ios", "percentage": 54.33})
    );
    assert_eq!(
        by_number["platformUsageOverTime"][0],
        json!({"date": "2024-01-01", "platforms": {"ios": 0.5, "android": 1.23}})
    );
}

#[tokio::test]
async fn http_platform_usage_is_flattened() {
    let usage = get_json("/api/platform-usage").await;
    assert_eq!(usage["platforms"], json!(["ios", "android", "web"]));
    assert_eq!(usage["records"][1], json!({"date": "2024-01-02", "web": 2.0}));
}

#[tokio::test]
async fn http_unknown_section_is_not_found() {
    let server = shared_server().await;
    let response = Client::new()
        .get(format!("{}/api/sections/7", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.text().await.unwrap(), "unknown section '7'");
}
