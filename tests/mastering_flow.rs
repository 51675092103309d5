// ABOUTME: End-to-end runs of the mastering driver against a mock service
// ABOUTME: Covers download, report-only and remote failure paths

use audiomaster::config::{Config, PollConfig};
use audiomaster::driver::{self, Mode};
use audiomaster::remote::MasteringClient;
use audiomaster::MasterError;
use flate2::write::GzEncoder;
use flate2::Compression;
use mockito::{Matcher, Mock, ServerGuard};
use std::io::Write;
use std::path::PathBuf;

fn gzip(body: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

struct Service {
    server: ServerGuard,
    config: Config,
}

impl Service {
    async fn start() -> Self {
        let server = mockito::Server::new_async().await;
        let mut config = Config::default();
        config.endpoints.registration_url = format!("{}/ajax.php", server.url());
        config.endpoints.upload_url = format!("{}/upload/", server.url());
        config.polling = PollConfig {
            interval_ms: 5,
            max_wait_secs: Some(30),
            transport_retries: 0,
        };
        Self { server, config }
    }

    fn client(&self) -> MasteringClient {
        MasteringClient::new(&self.config).unwrap()
    }

    async fn registration(&mut self) -> Mock {
        let body = format!(
            r#"{{"request":{{"success":true,"msg":""}},
                "statusurl":"{url}/status/42","remasterurl":"{url}/remaster/42",
                "postvars":{{"acl":"private","key":"uploads/42/song.wav","success_action_status":"201",
                             "x-amz-algorithm":"AWS4-HMAC-SHA256","x-amz-credential":"cred",
                             "x-amz-date":"20200501T000000Z","policy":"pol","x-amz-signature":"sig"}}}}"#,
            url = self.server.url()
        );
        self.server
            .mock("POST", "/ajax.php")
            .match_body(Matcher::UrlEncoded("action".into(), "new-master".into()))
            .with_body(gzip(&body))
            .expect(1)
            .create_async()
            .await
    }

    async fn upload(&mut self) -> Mock {
        self.server
            .mock("POST", "/upload/")
            .match_body(Matcher::Regex(
                r#"name="key"\r\n\r\nuploads/42/song\.wav"#.to_string(),
            ))
            .with_status(200)
            .expect(1)
            .create_async()
            .await
    }

    async fn status(&mut self, status: &str) -> Mock {
        let body = format!(
            r#"{{"request":{{"success":true,"msg":""}},"sid":"42","status":{status},
                "actions":{{"wf":"{url}/files/mastered.mp3","of":"{url}/files/song.wav"}}}}"#,
            status = status,
            url = self.server.url()
        );
        self.server
            .mock("GET", "/status/42")
            .with_body(gzip(&body))
            .expect(1)
            .create_async()
            .await
    }
}

fn audio_file(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("song.wav");
    std::fs::write(&path, b"RIFF....WAVEfmt ").unwrap();
    path
}

#[tokio::test]
async fn downloads_mastered_file_after_completion() {
    let dir = tempfile::tempdir().unwrap();
    let input = audio_file(&dir);
    let output = dir.path().join("mastered.mp3");

    let mut service = Service::start().await;
    let registration = service.registration().await;
    let upload = service.upload().await;
    let first = service
        .status(r#"{"mastered":false,"percentComplete":50,"statusMessage":"Mastering","error":false,"errorMessage":""}"#)
        .await;
    let second = service
        .status(r#"{"mastered":true,"percentComplete":100,"statusMessage":"Done","error":false,"errorMessage":""}"#)
        .await;
    let download = service
        .server
        .mock("GET", "/files/mastered.mp3")
        .with_body(b"\xff\xfb\x90\x00mastered-audio")
        .expect(1)
        .create_async()
        .await;

    let seen = std::sync::Mutex::new(Vec::new());
    let outcome = driver::run(
        &service.client(),
        &service.config.polling,
        &input,
        &Mode::Download {
            output: output.clone(),
        },
        |snapshot| seen.lock().unwrap().push(snapshot.percent_complete),
    )
    .await
    .unwrap();

    registration.assert_async().await;
    upload.assert_async().await;
    first.assert_async().await;
    second.assert_async().await;
    download.assert_async().await;

    assert_eq!(*seen.lock().unwrap(), vec![50, 100]);
    assert_eq!(outcome.saved_to, Some(output.clone()));
    assert_eq!(outcome.bytes_written, 18);
    assert_eq!(
        std::fs::read(&output).unwrap(),
        b"\xff\xfb\x90\x00mastered-audio"
    );
}

#[tokio::test]
async fn report_only_skips_download() {
    let dir = tempfile::tempdir().unwrap();
    let input = audio_file(&dir);

    let mut service = Service::start().await;
    let _registration = service.registration().await;
    let _upload = service.upload().await;
    let _status = service
        .status(r#"{"mastered":false,"percentComplete":100,"statusMessage":"","error":false,"errorMessage":""}"#)
        .await;
    let download = service
        .server
        .mock("GET", "/files/mastered.mp3")
        .expect(0)
        .create_async()
        .await;

    let outcome = driver::run(
        &service.client(),
        &service.config.polling,
        &input,
        &Mode::ReportOnly,
        |_| {},
    )
    .await
    .unwrap();

    download.assert_async().await;
    assert_eq!(outcome.saved_to, None);
    let url = service.server.url();
    assert_eq!(
        outcome.last_status.mastered_url,
        Some(format!("{}/files/mastered.mp3", url))
    );
    assert_eq!(
        outcome.last_status.original_url,
        Some(format!("{}/files/song.wav", url))
    );
    assert_eq!(
        outcome.job.remaster_url,
        Some(format!("{}/remaster/42", url))
    );
}

#[tokio::test]
async fn remote_error_aborts_without_download() {
    let dir = tempfile::tempdir().unwrap();
    let input = audio_file(&dir);
    let output = dir.path().join("mastered.mp3");

    let mut service = Service::start().await;
    let _registration = service.registration().await;
    let _upload = service.upload().await;
    let _status = service
        .server
        .mock("GET", "/status/42")
        .with_body(gzip(
            r#"{"status":{"error":true,"errorMessage":"engine overloaded"}}"#,
        ))
        .create_async()
        .await;
    let download = service
        .server
        .mock("GET", "/files/mastered.mp3")
        .expect(0)
        .create_async()
        .await;

    let result = driver::run(
        &service.client(),
        &service.config.polling,
        &input,
        &Mode::Download {
            output: output.clone(),
        },
        |_| {},
    )
    .await;

    download.assert_async().await;
    assert_eq!(
        result.unwrap_err(),
        MasterError::Remote("engine overloaded".to_string())
    );
    assert!(!output.exists());
}

#[tokio::test]
async fn non_success_upload_status_does_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    let input = audio_file(&dir);

    let mut service = Service::start().await;
    let _registration = service.registration().await;
    let _upload = service
        .server
        .mock("POST", "/upload/")
        .with_status(403)
        .create_async()
        .await;
    let _status = service
        .status(r#"{"mastered":true,"percentComplete":100,"statusMessage":"","error":false,"errorMessage":""}"#)
        .await;

    let outcome = driver::run(
        &service.client(),
        &service.config.polling,
        &input,
        &Mode::ReportOnly,
        |_| {},
    )
    .await
    .unwrap();

    assert!(outcome.last_status.mastered);
}
