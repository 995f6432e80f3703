use dataset::{ExportFormat, FloatId, FloatRecord};
use tracing::{debug, info};

/// Receives the float the user picked (the profile-detail panel).
pub trait ProfileSink {
    fn profile_selected(&mut self, record: FloatRecord);
}

impl ProfileSink for Vec<FloatRecord> {
    fn profile_selected(&mut self, record: FloatRecord) {
        self.push(record);
    }
}

/// Outward actions the dashboard exposes besides selection.
///
/// The default bodies only log; hosts override what they support.
pub trait DashboardActions {
    fn export_requested(&mut self, format: ExportFormat, rows: usize) {
        info!(%format, rows, "export requested");
    }

    fn share_requested(&mut self, id: &FloatId) {
        info!(float = %id, "share requested");
    }
}

/// Logs every action and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingActions;

impl DashboardActions for LoggingActions {}

/// The core's only outbound edge: forwards selected records to a [`ProfileSink`].
///
/// Holds no selection state. Callers guarantee at most one `select` per click
/// (see `FloatLayerManager::handle_click`).
#[derive(Debug, Default)]
pub struct SelectionBroker<S> {
    sink: S,
}

impl<S: ProfileSink> SelectionBroker<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn select(&mut self, record: FloatRecord) {
        debug!(float = %record.id, "float selected");
        self.sink.profile_selected(record);
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::{DashboardActions, SelectionBroker};
    use dataset::{ExportFormat, FloatId, FloatRecord, MockFloatSource, generate};

    fn first_record() -> FloatRecord {
        let dataset = generate(&MockFloatSource::default().config).unwrap();
        dataset.records()[0].clone()
    }

    #[test]
    fn select_forwards_record_by_value() {
        let record = first_record();
        let mut broker = SelectionBroker::new(Vec::new());
        broker.select(record.clone());
        assert_eq!(broker.into_sink(), vec![record]);
    }

    #[derive(Default)]
    struct Recorder {
        exports: Vec<(ExportFormat, usize)>,
        shares: Vec<FloatId>,
    }

    impl DashboardActions for Recorder {
        fn export_requested(&mut self, format: ExportFormat, rows: usize) {
            self.exports.push((format, rows));
        }

        fn share_requested(&mut self, id: &FloatId) {
            self.shares.push(id.clone());
        }
    }

    #[test]
    fn actions_are_named_calls() {
        let mut actions = Recorder::default();
        actions.export_requested(ExportFormat::Csv, 12);
        actions.share_requested(&FloatId::new("argo_4"));
        assert_eq!(actions.exports, vec![(ExportFormat::Csv, 12)]);
        assert_eq!(actions.shares, vec![FloatId::new("argo_4")]);
    }
}
