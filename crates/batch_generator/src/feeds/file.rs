//! FileFeed - writes feed messages to one file per partition
//!
//! Frame layout, all lengths big-endian u32:
//! `key_len | key | payload_len | payload`, with `key_len == u32::MAX`
//! marking a message without a key.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use contracts::{ContractError, PartitionId, PartitionKey, PartitionOracle, Publisher};
use tracing::{debug, error, instrument};

use super::{partition_for_key, FeedMessage};

const NO_KEY: u32 = u32::MAX;

struct FileFeedInner {
    name: String,
    dir: PathBuf,
    capacity: usize,
    written: Vec<AtomicUsize>,
    closed: AtomicBool,
    next_unkeyed: AtomicU32,
}

/// Feed backed by `partition-<n>.bin` files in a directory
#[derive(Clone)]
pub struct FileFeed {
    inner: Arc<FileFeedInner>,
}

impl FileFeed {
    /// Create the output directory and truncate any existing partition files
    pub fn create(
        name: impl Into<String>,
        dir: impl Into<PathBuf>,
        partitions: u32,
        capacity: usize,
    ) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let partitions = partitions.max(1);
        for partition in 0..partitions {
            File::create(dir.join(partition_file_name(partition)))?;
        }

        Ok(Self {
            inner: Arc::new(FileFeedInner {
                name: name.into(),
                dir,
                capacity,
                written: (0..partitions).map(|_| AtomicUsize::new(0)).collect(),
                closed: AtomicBool::new(false),
                next_unkeyed: AtomicU32::new(0),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn partition_count(&self) -> u32 {
        self.inner.written.len() as u32
    }

    pub fn partition_path(&self, partition: PartitionId) -> PathBuf {
        self.inner.dir.join(partition_file_name(partition))
    }

    /// Frames written to `partition` since creation
    pub fn written(&self, partition: PartitionId) -> usize {
        self.inner
            .written
            .get(partition as usize)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Write side of the feed
    pub fn producer(&self) -> FileProducer {
        FileProducer {
            feed: self.clone(),
            writers: (0..self.partition_count()).map(|_| None).collect(),
        }
    }

    fn route(&self, key: Option<&PartitionKey>) -> PartitionId {
        match key {
            Some(key) => partition_for_key(key, self.partition_count()),
            None => {
                self.inner.next_unkeyed.fetch_add(1, Ordering::Relaxed) % self.partition_count()
            }
        }
    }
}

impl PartitionOracle for FileFeed {
    fn available_partitions(&self) -> Result<Vec<PartitionId>, ContractError> {
        if self.is_closed() {
            return Ok(Vec::new());
        }
        Ok((0..self.partition_count())
            .filter(|p| self.written(*p) < self.inner.capacity)
            .collect())
    }
}

/// Write side of a [`FileFeed`]
pub struct FileProducer {
    feed: FileFeed,
    writers: Vec<Option<BufWriter<File>>>,
}

impl FileProducer {
    fn writer(&mut self, partition: PartitionId) -> io::Result<&mut BufWriter<File>> {
        let path = self.feed.partition_path(partition);
        let slot = self
            .writers
            .get_mut(partition as usize)
            .ok_or_else(|| io::Error::other(format!("no partition {partition}")))?;

        if slot.is_none() {
            let file = OpenOptions::new().append(true).create(true).open(path)?;
            *slot = Some(BufWriter::new(file));
        }
        slot.as_mut()
            .ok_or_else(|| io::Error::other("writer not initialised"))
    }

    fn write_frame(
        &mut self,
        partition: PartitionId,
        key: Option<&PartitionKey>,
        payload: &[u8],
    ) -> io::Result<()> {
        let writer = self.writer(partition)?;
        match key {
            Some(key) => {
                writer.write_all(&frame_len(key.len())?.to_be_bytes())?;
                writer.write_all(key.as_bytes())?;
            }
            None => writer.write_all(&NO_KEY.to_be_bytes())?,
        }
        writer.write_all(&frame_len(payload.len())?.to_be_bytes())?;
        writer.write_all(payload)
    }

    fn flush_all(&mut self) -> io::Result<()> {
        for writer in self.writers.iter_mut().flatten() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Publisher for FileProducer {
    fn name(&self) -> &str {
        self.feed.name()
    }

    fn send(&mut self, key: Option<PartitionKey>, payload: Bytes) -> Result<(), ContractError> {
        if self.feed.is_closed() {
            return Err(ContractError::ProducerClosed {
                feed: self.feed.name().to_string(),
            });
        }

        let partition = self.feed.route(key.as_ref());
        self.write_frame(partition, key.as_ref(), &payload)
            .map_err(|e| {
                error!(feed = %self.feed.name(), partition, error = %e, "Write failed");
                ContractError::publish(self.feed.name(), e.to_string())
            })?;

        if let Some(counter) = self.feed.inner.written.get(partition as usize) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    #[instrument(name = "file_producer_close", skip(self), fields(feed = %self.feed.name()))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.feed.inner.closed.store(true, Ordering::SeqCst);
        self.flush_all()
            .map_err(|e| ContractError::publish(self.feed.name(), e.to_string()))?;
        self.writers.clear();
        debug!(dir = %self.feed.dir().display(), "FileProducer closed");
        Ok(())
    }
}

impl Drop for FileProducer {
    fn drop(&mut self) {
        if let Err(e) = self.flush_all() {
            error!(feed = %self.feed.name(), error = %e, "Flush on drop failed");
        }
    }
}

/// Read every frame from a partition file
pub fn read_frames(path: impl AsRef<Path>) -> io::Result<Vec<FeedMessage>> {
    let mut data = Vec::new();
    File::open(path)?.read_to_end(&mut data)?;

    let mut messages = Vec::new();
    let mut rest = data.as_slice();
    while !rest.is_empty() {
        let key_len = take_u32(&mut rest)?;
        let key = if key_len == NO_KEY {
            None
        } else {
            Some(PartitionKey::new(take_bytes(&mut rest, key_len as usize)?))
        };
        let payload_len = take_u32(&mut rest)?;
        let payload = take_bytes(&mut rest, payload_len as usize)?;
        messages.push(FeedMessage { key, payload });
    }
    Ok(messages)
}

fn partition_file_name(partition: PartitionId) -> String {
    format!("partition-{partition}.bin")
}

fn frame_len(len: usize) -> io::Result<u32> {
    u32::try_from(len)
        .ok()
        .filter(|l| *l != NO_KEY)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))
}

fn take_u32(rest: &mut &[u8]) -> io::Result<u32> {
    let head = take_bytes(rest, 4)?;
    Ok(u32::from_be_bytes([head[0], head[1], head[2], head[3]]))
}

fn take_bytes(rest: &mut &[u8], len: usize) -> io::Result<Bytes> {
    if rest.len() < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "truncated frame",
        ));
    }
    let (head, tail) = rest.split_at(len);
    *rest = tail;
    Ok(Bytes::copy_from_slice(head))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_frames_survive_a_round_trip() {
        let dir = TempDir::new().unwrap();
        let feed = FileFeed::create("out", dir.path(), 1, 100).unwrap();
        let mut producer = feed.producer();

        producer
            .send(Some(PartitionKey::from("a.example")), Bytes::from_static(b"one"))
            .unwrap();
        producer.send(None, Bytes::from_static(b"two")).unwrap();
        producer.close().await.unwrap();

        let frames = read_frames(feed.partition_path(0)).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].key, Some(PartitionKey::from("a.example")));
        assert_eq!(frames[0].payload, Bytes::from_static(b"one"));
        assert_eq!(frames[1].key, None);
        assert_eq!(feed.written(0), 2);
    }

    #[tokio::test]
    async fn test_create_truncates_and_lays_out_partitions() {
        let dir = TempDir::new().unwrap();
        {
            let feed = FileFeed::create("out", dir.path(), 2, 100).unwrap();
            let mut producer = feed.producer();
            producer.send(None, Bytes::from_static(b"stale")).unwrap();
        }

        let feed = FileFeed::create("out", dir.path(), 2, 100).unwrap();
        assert!(dir.path().join("partition-0.bin").exists());
        assert!(dir.path().join("partition-1.bin").exists());
        assert!(read_frames(feed.partition_path(0)).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capacity_and_close_gate_availability() {
        let dir = TempDir::new().unwrap();
        let feed = FileFeed::create("out", dir.path(), 2, 1).unwrap();
        let mut producer = feed.producer();
        assert_eq!(feed.available_partitions().unwrap(), vec![0, 1]);

        producer.send(None, Bytes::from_static(b"x")).unwrap();
        assert_eq!(feed.available_partitions().unwrap(), vec![1]);

        producer.close().await.unwrap();
        assert!(feed.available_partitions().unwrap().is_empty());
        assert!(matches!(
            producer.send(None, Bytes::new()).unwrap_err(),
            ContractError::ProducerClosed { .. }
        ));
    }

    #[test]
    fn test_truncated_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partition-0.bin");
        fs::write(&path, [0, 0, 0, 9, b'a']).unwrap();
        let err = read_frames(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
