//! In-process implementation of CommGroup.
//!
//! Every rank is a thread holding its own `LocalCommGroup`; messages are
//! serialized with bincode and delivered over unbounded channels, one inbox
//! per rank. As with MPI, a rank that never posts a matching receive (or a
//! peer that never sends) blocks the waiting side forever.
use crate::{check_rank, CommGroup, DataType, Error, Result};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::future;
use futures::lock::Mutex;
use futures::StreamExt;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::thread;

struct Envelope {
    source: u32,
    tag: u32,
    payload: Vec<u8>,
}

struct Inbox {
    rx: UnboundedReceiver<Envelope>,
    /// Messages that arrived before a matching receive was posted.
    pending: VecDeque<Envelope>,
}

impl Inbox {
    async fn take(&mut self, source: u32, tag: u32) -> Result<Vec<u8>> {
        let matching = |env: &Envelope| env.source == source && env.tag == tag;
        if let Some(pos) = self.pending.iter().position(matching) {
            if let Some(env) = self.pending.remove(pos) {
                return Ok(env.payload);
            }
        }
        loop {
            match self.rx.next().await {
                Some(env) if matching(&env) => return Ok(env.payload),
                Some(env) => self.pending.push_back(env),
                None => return Err(Error::Disconnected(source)),
            }
        }
    }
}

pub struct LocalCommGroup {
    rank: u32,
    peers: Vec<UnboundedSender<Envelope>>,
    inbox: Arc<Mutex<Inbox>>,
}

impl LocalCommGroup {
    /// Create a group of `size` ranks, returned in rank order.
    pub fn world(size: u32) -> Result<Vec<LocalCommGroup>> {
        if size == 0 {
            return Err(Error::InvalidWorldSize(size));
        }
        let (peers, inboxes): (Vec<_>, Vec<_>) = (0..size).map(|_| unbounded()).unzip();
        Ok(inboxes
            .into_iter()
            .zip(0..size)
            .map(|(rx, rank)| LocalCommGroup {
                rank,
                peers: peers.clone(),
                inbox: Arc::new(Mutex::new(Inbox {
                    rx,
                    pending: VecDeque::new(),
                })),
            })
            .collect())
    }
}

impl CommGroup for LocalCommGroup {
    fn rank(&self) -> u32 {
        self.rank
    }

    fn size(&self) -> u32 {
        self.peers.len() as u32
    }

    fn processor_name(&self) -> String {
        "localhost".to_string()
    }

    fn send<T: DataType>(
        &self,
        data: &T,
        dest: u32,
        tag: u32,
    ) -> Pin<Box<dyn Future<Output = Result<()>>>> {
        let result = check_rank(dest, self.size())
            .and_then(|_| bincode::serialize(data).map_err(Error::from))
            .and_then(|payload| {
                let env = Envelope {
                    source: self.rank,
                    tag,
                    payload,
                };
                self.peers[dest as usize]
                    .unbounded_send(env)
                    .map_err(|_| Error::Disconnected(dest))
            });
        Box::pin(future::ready(result))
    }

    fn recv<T: DataType>(&self, source: u32, tag: u32) -> Pin<Box<dyn Future<Output = Result<T>>>> {
        let valid = check_rank(source, self.size());
        let inbox = Arc::clone(&self.inbox);
        Box::pin(async move {
            valid?;
            let payload = inbox.lock().await.take(source, tag).await?;
            Ok::<T, Error>(bincode::deserialize(&payload)?)
        })
    }
}

/// Run `f` once per rank of a fresh local group, each on its own thread.
///
/// Results are returned in rank order. A panic on any rank is re-raised
/// here once every rank has finished.
pub fn run<F, R>(size: u32, f: F) -> Result<Vec<R>>
where
    F: Fn(LocalCommGroup) -> R + Sync,
    R: Send,
{
    let groups = LocalCommGroup::world(size)?;
    let f = &f;
    Ok(thread::scope(|s| {
        let handles: Vec<_> = groups
            .into_iter()
            .map(|cg| s.spawn(move || f(cg)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    }))
}
