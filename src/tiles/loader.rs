use super::cache::{TileCache, TileImage};
use super::source::TileSource;
use crate::core::geo::TileCoord;
use crate::prelude::HashSet;
use crate::runtime::{spawn, AsyncSpawner};
use crate::Result;
use crate::prelude::HashMap;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Wait before the first refetch of a failed tile; doubles per failure
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Upper bound for the refetch wait
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// A tile whose last download failed
#[derive(Debug, Clone, Copy)]
struct FailedTile {
    attempts: u32,
    retry_at: Instant,
}

/// Outcome of a single download, reported back to the owning loader
struct TileResult {
    coord: TileCoord,
    tile: Result<TileImage>,
}

/// Fetches and decodes tiles on the async runtime and reports them back over
/// a channel. The owner drains the channel once per frame with [`TileLoader::poll`].
pub struct TileLoader {
    source: Arc<dyn TileSource>,
    spawner: Arc<dyn AsyncSpawner>,
    client: reqwest::Client,
    cache: TileCache,
    tx: Sender<TileResult>,
    rx: Receiver<TileResult>,
    pending: HashSet<TileCoord>,
    failed: HashMap<TileCoord, FailedTile>,
    retry_delay: Duration,
}

impl TileLoader {
    pub fn new(
        source: Arc<dyn TileSource>,
        spawner: Arc<dyn AsyncSpawner>,
        cache: TileCache,
        user_agent: &str,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        let (tx, rx) = crossbeam_channel::unbounded();
        Ok(Self {
            source,
            spawner,
            client,
            cache,
            tx,
            rx,
            pending: HashSet::default(),
            failed: HashMap::default(),
            retry_delay: RETRY_DELAY,
        })
    }

    /// Sets the wait before a failed tile is fetched again
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Returns the cached tile, starting a download if it is neither cached
    /// nor in flight. Failed tiles are fetched again once their backoff ends.
    pub fn request(&mut self, coord: TileCoord) -> Option<Arc<TileImage>> {
        if let Some(tile) = self.cache.get(&coord) {
            return Some(tile);
        }
        if !coord.is_valid() || self.pending.contains(&coord) {
            return None;
        }
        if let Some(failed) = self.failed.get(&coord) {
            if Instant::now() < failed.retry_at {
                return None;
            }
            log::debug!("retrying tile {:?} (attempt {})", coord, failed.attempts + 1);
        }

        self.pending.insert(coord);
        let url = self.source.url(coord);
        let client = self.client.clone();
        let tx = self.tx.clone();
        log::debug!("fetch tile {:?} from {}", coord, url);

        spawn(self.spawner.as_ref(), async move {
            let tile = fetch_tile(&client, &url).await;
            let _ = tx.send(TileResult { coord, tile });
        });
        None
    }

    /// Moves finished downloads into the cache; returns how many arrived.
    pub fn poll(&mut self) -> usize {
        let mut arrived = 0;
        for TileResult { coord, tile } in self.rx.try_iter() {
            self.pending.remove(&coord);
            match tile {
                Ok(tile) => {
                    self.failed.remove(&coord);
                    self.cache.insert(coord, tile);
                    arrived += 1;
                }
                Err(e) => {
                    let attempts = self.failed.get(&coord).map_or(0, |f| f.attempts) + 1;
                    let wait = self
                        .retry_delay
                        .saturating_mul(1 << (attempts - 1).min(6))
                        .min(MAX_RETRY_DELAY);
                    log::warn!("tile {:?} failed ({}), retrying in {:?}", coord, e, wait);
                    self.failed.insert(
                        coord,
                        FailedTile {
                            attempts,
                            retry_at: Instant::now() + wait,
                        },
                    );
                }
            }
        }
        arrived
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Tiles whose last download failed
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }
}

async fn fetch_tile(client: &reqwest::Client, url: &str) -> Result<TileImage> {
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    TileImage::decode(&bytes)
}
