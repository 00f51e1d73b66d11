use std::path::PathBuf;
use std::sync::Arc;

use nn_core::RecordStore;
use nn_ingest::Pipeline;
use nn_speech::SpeechRouter;

pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub pipeline: Arc<Pipeline>,
    pub speech: Arc<SpeechRouter>,
    pub audio_dir: PathBuf,
}
