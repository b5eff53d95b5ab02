//! Shared agent state: dish handle, hot snapshot cache and push channel.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::{broadcast, Notify, RwLock};

use crate::dish::Dish;
use crate::obstruction::SvgOptions;

pub type SharedDish = Arc<dyn Dish>;

#[derive(Clone)]
pub struct AppState {
    pub dish: SharedDish,
    pub svg: Arc<SvgOptions>,

    // Last encoded `data_update` envelope, sent to sockets as they connect
    pub last_json: Arc<RwLock<String>>,
    pub updates: broadcast::Sender<String>,

    // Adaptive sampling controls
    pub client_count: Arc<AtomicUsize>,
    pub wake_sampler: Arc<Notify>,
}

impl AppState {
    pub fn new(dish: SharedDish, svg: SvgOptions) -> Self {
        let (updates, _) = broadcast::channel(16);
        Self {
            dish,
            svg: Arc::new(svg),
            last_json: Arc::new(RwLock::new(String::new())),
            updates,
            client_count: Arc::new(AtomicUsize::new(0)),
            wake_sampler: Arc::new(Notify::new()),
        }
    }
}
