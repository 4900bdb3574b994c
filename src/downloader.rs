use crate::error::Result;
use futures::StreamExt;
use log::{debug, warn};
use reqwest::{redirect::Policy, Client};
use tokio::{
    runtime::Handle,
    sync::mpsc::{channel, error::TryRecvError, Receiver, Sender},
    task::JoinHandle,
};

#[derive(Debug)]
pub enum DlStatus {
    /// Bytes received so far, and the announced body size if any
    Progress(u64, Option<u64>),
    Error(String),
    Finish(Vec<u8>),
}

#[derive(Debug, PartialEq)]
pub enum ThreadStatus {
    Closed,
    Waiting,
}

/// A spawned task and the channel it reports on
#[derive(Debug)]
pub struct ThreadData<R, T> {
    pub receiver: Receiver<R>,

    /// Task feeding the receiver, kept so the caller owns it
    pub _thread: JoinHandle<T>,
}

impl<R, T> ThreadData<R, T> {
    /// Next message without blocking. `Closed` once the task is gone
    /// and every message was read.
    pub fn message(&mut self) -> std::result::Result<R, ThreadStatus> {
        match self.receiver.try_recv() {
            Ok(response) => Ok(response),
            Err(TryRecvError::Disconnected) => Err(ThreadStatus::Closed),
            Err(TryRecvError::Empty) => Err(ThreadStatus::Waiting),
        }
    }
}

/// Client shared by every request of the launcher. The release host
/// rejects requests without a user agent, and asset links redirect.
pub fn http_client(user_agent: &str) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .redirect(Policy::limited(10))
        .build()?;
    Ok(client)
}

async fn fetch(client: &Client, url: &str, tx: &Sender<DlStatus>) -> Result<Vec<u8>> {
    let response = client.get(url).send().await?.error_for_status()?;
    let size = response.content_length();
    let mut data = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(item) = stream.next().await {
        let chunk = item?;
        data.extend_from_slice(&chunk);

        let _ = tx
            .send(DlStatus::Progress(data.len() as u64, size))
            .await;
    }

    Ok(data)
}

async fn intern_download(client: Client, url: String, tx: Sender<DlStatus>) {
    let status = match fetch(&client, &url, &tx).await {
        Ok(data) => {
            debug!("downloaded {} bytes from {}", data.len(), url);
            DlStatus::Finish(data)
        }
        Err(err) => {
            warn!("download of {} failed: {}", url, err);
            DlStatus::Error(err.to_string())
        }
    };

    let _ = tx.send(status).await;
}

/// Download one url into memory on `handle` and return a ThreadData
/// to poll for progress and the final body
pub fn download_bytes(handle: &Handle, client: Client, url: String) -> ThreadData<DlStatus, ()> {
    let (tx, receiver) = channel(1024);
    let thread = handle.spawn(async move { intern_download(client, url, tx).await });

    ThreadData {
        receiver,
        _thread: thread,
    }
}
