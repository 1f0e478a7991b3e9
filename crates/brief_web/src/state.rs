use std::sync::Arc;
use brief_core::Storage;
use brief_inference::BriefSynthesizer;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub synthesizer: Arc<BriefSynthesizer>,
    /// Domain label briefs are produced for
    pub domain: String,
}
