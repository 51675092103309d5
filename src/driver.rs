// ABOUTME: Runs one mastering job end to end: register, upload, poll, fetch
// ABOUTME: Any step failure aborts the run; submitted jobs are not rolled back

use std::path::{Path, PathBuf};
use tracing::Instrument;

use crate::config::PollConfig;
use crate::error::MasterError;
use crate::remote::{JobHandle, MasteringClient, StatusSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Save the mastered file to `output`
    Download { output: PathBuf },
    /// Stop after mastering and report the result URLs
    ReportOnly,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub job: JobHandle,
    pub last_status: StatusSnapshot,
    pub saved_to: Option<PathBuf>,
    pub bytes_written: u64,
}

pub async fn run(
    client: &MasteringClient,
    polling: &PollConfig,
    file: &Path,
    mode: &Mode,
    on_progress: impl Fn(&StatusSnapshot),
) -> Result<Outcome, MasterError> {
    let span = tracing::info_span!("mastering", file = %file.display());
    run_steps(client, polling, file, mode, on_progress)
        .instrument(span)
        .await
}

async fn run_steps(
    client: &MasteringClient,
    polling: &PollConfig,
    file: &Path,
    mode: &Mode,
    on_progress: impl Fn(&StatusSnapshot),
) -> Result<Outcome, MasterError> {
    tokio::fs::File::open(file)
        .await
        .map_err(|e| MasterError::InvalidInput(format!("can't open {}: {}", file.display(), e)))?;

    let registration = client.register(file).await?;
    tracing::info!(status_url = %registration.job.status_url, "Mastering job registered");

    let upload_status = client.upload(file, &registration).await?;
    if upload_status.is_success() {
        tracing::info!(status = %upload_status, "Audio uploaded");
    } else {
        tracing::warn!(status = %upload_status, "Upload endpoint returned a non-success status");
    }

    let last_status = client
        .poll_until_complete(&registration.job, polling, |snapshot| {
            tracing::debug!(
                percent = snapshot.percent_complete,
                "progress: {}%",
                snapshot.percent_complete
            );
            on_progress(snapshot);
        })
        .await?;

    let mut outcome = Outcome {
        job: registration.job,
        last_status,
        saved_to: None,
        bytes_written: 0,
    };

    if let Mode::Download { output } = mode {
        let url = outcome.last_status.mastered_url.clone().ok_or_else(|| {
            MasterError::Remote("job finished without a mastered file url".to_string())
        })?;
        outcome.bytes_written = client.download(&url, output).await?;
        tracing::info!(bytes = outcome.bytes_written, "saved to {}", output.display());
        outcome.saved_to = Some(output.clone());
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_missing_file_fails_before_registration() {
        let mut server = mockito::Server::new_async().await;
        let registration = server
            .mock("POST", "/ajax.php")
            .expect(0)
            .create_async()
            .await;

        let mut config = Config::default();
        config.endpoints.registration_url = format!("{}/ajax.php", server.url());
        let client = MasteringClient::new(&config).unwrap();

        let result = run(
            &client,
            &config.polling,
            Path::new("/nonexistent/song.wav"),
            &Mode::ReportOnly,
            |_| {},
        )
        .await;

        registration.assert_async().await;
        assert!(matches!(result, Err(MasterError::InvalidInput(_))));
    }
}
