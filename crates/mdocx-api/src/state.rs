//! Shared handler state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mdocx_convert::Converter;
use mdocx_telemetry::Metrics;

use crate::store::ConversionStore;

pub(crate) struct ApiState {
    pub(crate) converter: Arc<dyn Converter>,
    pub(crate) conversions: ConversionStore,
    pub(crate) telemetry: Metrics,
    pub(crate) work_dir: Option<PathBuf>,
}

impl ApiState {
    pub(crate) fn new(
        converter: Arc<dyn Converter>,
        telemetry: Metrics,
        retention: Duration,
        work_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            converter,
            conversions: ConversionStore::new(retention),
            telemetry,
            work_dir,
        }
    }

    pub(crate) fn refresh_active_gauge(&self) {
        self.telemetry.set_active_conversions(self.conversions.len());
    }
}
