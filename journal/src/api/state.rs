use std::sync::Arc;

use crate::classifier::ClassifierProvider;
use crate::config::Config;
use crate::db::EntryStore;
use crate::services::{AnalysisService, JournalService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub classifier: ClassifierProvider,
    pub store: Arc<dyn EntryStore>,
    pub analysis: AnalysisService,
    pub journal: JournalService,
}

impl AppState {
    pub fn new(config: Config, classifier: ClassifierProvider, store: Arc<dyn EntryStore>) -> Self {
        let analysis = AnalysisService::new(classifier.clone());
        let journal = JournalService::new(store.clone());

        Self {
            config: Arc::new(config),
            classifier,
            store,
            analysis,
            journal,
        }
    }
}
