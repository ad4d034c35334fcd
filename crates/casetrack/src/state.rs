use std::sync::Arc;

use casetrack_core::CaseRepository;
use casetrack_import::ParseOptions;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn CaseRepository>,
    pub parse_options: ParseOptions,
}

impl AppState {
    pub fn new(repository: Arc<dyn CaseRepository>, parse_options: ParseOptions) -> Self {
        Self {
            repository,
            parse_options,
        }
    }
}
