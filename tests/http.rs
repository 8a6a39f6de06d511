use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::path::PathBuf;
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

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
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

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_dir() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habit_tracker_http_{}_{}", std::process::id(), nanos));
    path
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/storage")).send().await {
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
    let data_dir = unique_data_dir();
    let child = Command::new(env!("CARGO_BIN_EXE_habit_tracker"))
        .env("PORT", port.to_string())
        .env("HABITS_DATA_PATH", data_dir.join("habits.json"))
        .env("HABITS_FALLBACK_DIR", data_dir.join("records"))
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

async fn create_habit(client: &Client, base_url: &str, body: Value) -> Value {
    let response = client
        .post(format!("{base_url}/api/habits"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn get_json(client: &Client, url: String) -> Value {
    let response = client.get(url).send().await.unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[tokio::test]
async fn http_toggle_today_starts_streak() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let habit = create_habit(&client, &server.base_url, json!({ "name": "Stretch" })).await;
    let id = habit["id"].as_str().unwrap().to_string();
    assert_eq!(habit["type"], "yesno");

    let toggled: Value = client
        .post(format!(
            "{}/api/habits/{id}/completions/{}/toggle",
            server.base_url,
            today()
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(toggled["completion"]["value"], true);

    let stats = get_json(&client, format!("{}/api/habits/{id}/stats", server.base_url)).await;
    assert_eq!(stats["currentStreak"], 1);
    assert_eq!(stats["longestStreak"], 1);
    assert_eq!(stats["totalCompletions"], 1);
    assert_eq!(stats["strength"], 0);

    let grid = get_json(&client, format!("{}/api/grid?days=7", server.base_url)).await;
    let row = grid["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["habitId"] == id.as_str())
        .expect("missing grid row");
    assert_eq!(row["cells"].as_array().unwrap().len(), 7);
    assert_eq!(row["cells"][6]["status"], "done");
    assert_eq!(row["cells"][6]["isToday"], true);
}

#[tokio::test]
async fn http_numeric_zero_is_recorded_not_completed() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let habit = create_habit(
        &client,
        &server.base_url,
        json!({ "name": "Read", "type": "numeric", "unit": "pages", "target": 20 }),
    )
    .await;
    let id = habit["id"].as_str().unwrap().to_string();
    let url = format!("{}/api/habits/{id}/completions/{}", server.base_url, today());

    let response = client.put(&url).json(&json!({ "value": 0 })).send().await.unwrap();
    assert!(response.status().is_success());

    let rejected = client.put(&url).json(&json!({ "value": true })).send().await.unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let stats = get_json(&client, format!("{}/api/habits/{id}/stats", server.base_url)).await;
    assert_eq!(stats["currentStreak"], 0);
    assert_eq!(stats["totalCompletions"], 1);
    assert_eq!(stats["validCompletions"], 0);

    let toggle = client
        .post(format!("{url}/toggle"))
        .send()
        .await
        .unwrap();
    assert_eq!(toggle.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_delete_habit_removes_history() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let habit = create_habit(&client, &server.base_url, json!({ "name": "Floss" })).await;
    let id = habit["id"].as_str().unwrap().to_string();
    client
        .post(format!(
            "{}/api/habits/{id}/completions/{}/toggle",
            server.base_url,
            today()
        ))
        .send()
        .await
        .unwrap();

    let response = client
        .delete(format!("{}/api/habits/{id}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let missing = client
        .get(format!("{}/api/habits/{id}/completions", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_export_then_overwrite_import_round_trips() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let habit = create_habit(&client, &server.base_url, json!({ "name": "Walk" })).await;
    let id = habit["id"].as_str().unwrap().to_string();
    client
        .post(format!(
            "{}/api/habits/{id}/completions/{}/toggle",
            server.base_url,
            today()
        ))
        .send()
        .await
        .unwrap();

    let exported = get_json(&client, format!("{}/api/export", server.base_url)).await;
    assert_eq!(exported["version"], 1);

    let summary: Value = client
        .post(format!("{}/api/import?mode=overwrite", server.base_url))
        .json(&exported)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["habits"], exported["habits"].as_array().unwrap().len());
    assert_eq!(
        summary["completions"],
        exported["completions"].as_array().unwrap().len()
    );

    let again = get_json(&client, format!("{}/api/export", server.base_url)).await;
    assert_eq!(again["habits"], exported["habits"]);
    assert_eq!(again["completions"], exported["completions"]);
}

#[tokio::test]
async fn http_invalid_backup_leaves_data_untouched() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    create_habit(&client, &server.base_url, json!({ "name": "Journal" })).await;
    let before = get_json(&client, format!("{}/api/habits", server.base_url)).await;

    let response = client
        .post(format!("{}/api/import", server.base_url))
        .json(&json!({ "habits": [{ "id": "1", "name": "No type" }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = response.text().await.unwrap();
    assert!(message.contains("invalid habit structure"));

    let after = get_json(&client, format!("{}/api/habits", server.base_url)).await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn http_storage_reports_primary_backend() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let info = get_json(&client, format!("{}/api/storage", server.base_url)).await;
    assert_eq!(info["backend"], "document");
    assert_eq!(info["degraded"], false);

    let page = client.get(&server.base_url).send().await.unwrap();
    assert!(page.status().is_success());
    assert!(page.text().await.unwrap().contains(&today()));
}
