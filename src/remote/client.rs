// ABOUTME: HTTP client for the mastering service
// ABOUTME: Registers jobs, uploads audio, polls job status and fetches results

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::{sleep, Instant};

use super::codec::decode_gzip_json;
use super::headers;
use super::models::{JobHandle, RegisterResponse, Registration, StatusResponse, StatusSnapshot};
use super::preset::{registration_form, AudioFileName, MasteringPreset};
use crate::config::{Config, PollConfig};
use crate::error::MasterError;

fn transport(action: &str, err: reqwest::Error) -> MasterError {
    MasterError::Transport(format!("{}: {}", action, err))
}

pub struct MasteringClient {
    client: Client,
    registration_url: String,
    upload_url: String,
    request_timeout: Duration,
}

impl MasteringClient {
    pub fn new(config: &Config) -> Result<Self, MasterError> {
        let client = Client::builder()
            .connect_timeout(config.http.connect_timeout())
            .build()
            .map_err(|e| transport("can't create HTTP client", e))?;

        Ok(Self {
            client,
            registration_url: config.endpoints.registration_url.clone(),
            upload_url: config.endpoints.upload_url.clone(),
            request_timeout: config.http.request_timeout(),
        })
    }

    /// Registers a new mastering job for `path` with the standard preset.
    pub async fn register(&self, path: &Path) -> Result<Registration, MasterError> {
        let file = AudioFileName::from_path(path)?;
        tracing::debug!(
            filename = %file.base,
            extension = %file.extension,
            human_filename = %file.human,
            "Derived upload names"
        );

        let preset = MasteringPreset::standard(&file.base, &file.extension);
        let form = registration_form(&file, &preset, chrono::Utc::now().timestamp())?;

        let response = self
            .client
            .post(&self.registration_url)
            .form(&form)
            // after form(), which would otherwise reset the content type
            .headers(headers::registration_headers())
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| transport("can't make registration request", e))?;

        let raw = response
            .bytes()
            .await
            .map_err(|e| transport("can't read registration response", e))?;
        let registered: RegisterResponse = decode_gzip_json(&raw)?;

        if let Some(request) = &registered.request {
            if !request.success {
                return Err(MasterError::Remote(request.msg.clone()));
            }
        }

        let status_url = registered
            .status_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                MasterError::Remote("registration response has no status url".to_string())
            })?;

        tracing::debug!(status_url = %status_url, key = %registered.credentials.key, "Job registered");

        Ok(Registration {
            job: JobHandle {
                status_url,
                remaster_url: registered.remaster_url.filter(|url| !url.is_empty()),
            },
            credentials: registered.credentials,
        })
    }

    /// Posts the audio file to object storage using the pre-signed fields.
    ///
    /// The storage endpoint's HTTP status is returned rather than checked.
    pub async fn upload(
        &self,
        path: &Path,
        registration: &Registration,
    ) -> Result<StatusCode, MasterError> {
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| MasterError::Io(format!("can't read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut form = Form::new();
        for (name, value) in registration.credentials.form_fields() {
            form = form.text(name, value.to_string());
        }
        form = form.part("file", Part::bytes(contents).file_name(file_name));

        let response = self
            .client
            .post(&self.upload_url)
            .headers(headers::upload_headers())
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport("can't make upload request", e))?;

        Ok(response.status())
    }

    /// Fetches one snapshot, failing with `Remote` if the job reports an error.
    pub async fn get_status(&self, job: &JobHandle) -> Result<StatusSnapshot, MasterError> {
        let response = self
            .client
            .get(&job.status_url)
            .headers(headers::status_headers())
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| transport("can't make status request", e))?;

        let raw = response
            .bytes()
            .await
            .map_err(|e| transport("can't read status response", e))?;
        let status: StatusResponse = decode_gzip_json(&raw)?;
        let snapshot = StatusSnapshot::from(status);

        if snapshot.error {
            return Err(MasterError::Remote(snapshot.error_message));
        }

        Ok(snapshot)
    }

    /// Sleeps then polls until the job completes, reporting every snapshot.
    pub async fn poll_until_complete(
        &self,
        job: &JobHandle,
        polling: &PollConfig,
        callback: impl Fn(&StatusSnapshot),
    ) -> Result<StatusSnapshot, MasterError> {
        let started = Instant::now();
        let mut retries_left = polling.transport_retries;

        loop {
            sleep(polling.interval()).await;

            let snapshot = match self.get_status(job).await {
                Ok(snapshot) => snapshot,
                Err(err) if err.is_transport() && retries_left > 0 => {
                    retries_left -= 1;
                    tracing::warn!(error = %err, retries_left, "Status poll failed, retrying");
                    continue;
                }
                Err(err) => return Err(err),
            };
            retries_left = polling.transport_retries;

            callback(&snapshot);

            if snapshot.is_complete() {
                return Ok(snapshot);
            }

            if let Some(max_wait) = polling.max_wait() {
                if started.elapsed() >= max_wait {
                    return Err(MasterError::Timeout(format!(
                        "job still at {}% after {}s",
                        snapshot.percent_complete,
                        max_wait.as_secs()
                    )));
                }
            }
        }
    }

    /// Streams `url` into `destination`, replacing any existing file.
    pub async fn download(&self, url: &str, destination: &Path) -> Result<u64, MasterError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport("can't make download request", e))?;

        if !response.status().is_success() {
            return Err(MasterError::Transport(format!(
                "download failed with status {}",
                response.status()
            )));
        }

        let mut file = tokio::fs::File::create(destination).await.map_err(|e| {
            MasterError::Io(format!("can't create {}: {}", destination.display(), e))
        })?;

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| transport("can't read download body", e))?
        {
            file.write_all(&chunk).await.map_err(|e| {
                MasterError::Io(format!("can't write {}: {}", destination.display(), e))
            })?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| MasterError::Io(format!("can't flush {}: {}", destination.display(), e)))?;

        Ok(written)
    }
}
