//! In-memory stand-ins for the external collaborator traits, for exercising
//! the public API from outside the crate the way an embedding engine would.

use litecore_log::engine::{DiskService, MemoryFactory, Page, PageCache, WalIndex};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Installs a fmt subscriber for the duration of the test binary. Safe to
/// call from every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

pub struct MemoryDisk {
    slots: Mutex<HashMap<i64, Vec<u8>>>,
    last_position_id: AtomicI64,
}

impl MemoryDisk {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            last_position_id: AtomicI64::new(0),
        }
    }

    pub fn slot_written(&self, position_id: i64) -> bool {
        self.slots.lock().unwrap().contains_key(&position_id)
    }

    pub fn slot_contents(&self, position_id: i64) -> Option<Vec<u8>> {
        self.slots.lock().unwrap().get(&position_id).cloned()
    }
}

impl DiskService for MemoryDisk {
    fn get_last_file_position_id(&self) -> BoxFuture<'_, litecore_log::Result<i64>> {
        Box::pin(async move { Ok(self.last_position_id.load(Ordering::SeqCst)) })
    }

    fn set_length(&self, position_id: i64) -> BoxFuture<'_, litecore_log::Result<()>> {
        Box::pin(async move {
            self.last_position_id.fetch_max(position_id, Ordering::SeqCst);
            Ok(())
        })
    }

    fn read_page_async<'a>(&'a self, page: &'a mut Page, position_id: i64) -> BoxFuture<'a, litecore_log::Result<()>> {
        Box::pin(async move {
            let slots = self.slots.lock().unwrap();
            if let Some(bytes) = slots.get(&position_id) {
                page.buffer_mut().copy_from_slice(bytes);
            }
            page.set_position_id(position_id);
            Ok(())
        })
    }

    fn write_page_async<'a>(&'a self, page: &'a Page) -> BoxFuture<'a, litecore_log::Result<()>> {
        Box::pin(async move {
            self.slots
                .lock()
                .unwrap()
                .insert(page.position_id(), page.buffer().to_vec());
            self.last_position_id
                .fetch_max(page.position_id(), Ordering::SeqCst);
            Ok(())
        })
    }

    fn write_empty_page_async(&self, position_id: i64) -> BoxFuture<'_, litecore_log::Result<()>> {
        Box::pin(async move {
            self.slots.lock().unwrap().remove(&position_id);
            Ok(())
        })
    }

    fn write_empty_pages_async(&self, from: i64, to: i64) -> BoxFuture<'_, litecore_log::Result<()>> {
        Box::pin(async move {
            let mut slots = self.slots.lock().unwrap();
            for position_id in from..=to {
                slots.remove(&position_id);
            }
            Ok(())
        })
    }
}

pub struct MemoryFactoryImpl;

impl MemoryFactoryImpl {
    pub fn new() -> Self {
        Self
    }
}

impl MemoryFactory for MemoryFactoryImpl {
    fn allocate_new_page(&self, page_id: i64) -> Box<Page> {
        Box::new(Page::new(page_id))
    }

    fn deallocate_page(&self, _page: Box<Page>) {}
}

pub struct MemoryCache {
    pages: Mutex<HashMap<i64, Box<Page>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.pages.lock().unwrap().len()
    }

    pub fn max_position(&self) -> Option<i64> {
        self.pages.lock().unwrap().keys().copied().max()
    }
}

impl PageCache for MemoryCache {
    fn try_remove(&self, position_id: i64) -> Option<Box<Page>> {
        self.pages.lock().unwrap().remove(&position_id)
    }

    fn add_page_in_cache(&self, page: Box<Page>) -> Option<Box<Page>> {
        self.pages.lock().unwrap().insert(page.position_id(), page);
        None
    }

    fn clear_log_pages(&self, last_page_id: i64) {
        self.pages
            .lock()
            .unwrap()
            .retain(|&position_id, _| position_id <= last_page_id);
    }
}

pub struct NullWalIndex {
    cleared: AtomicBool,
}

impl NullWalIndex {
    pub fn new() -> Self {
        Self {
            cleared: AtomicBool::new(false),
        }
    }

    pub fn was_cleared(&self) -> bool {
        self.cleared.load(Ordering::SeqCst)
    }
}

impl WalIndex for NullWalIndex {
    fn clear(&self) {
        self.cleared.store(true, Ordering::SeqCst);
    }
}
