//! View controller: session state as an immutable value, advanced by a pure
//! reducer, plus a [`Session`] that runs queries against it.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    FailureKind, QueryResult,
    chart::{self, Chart},
    error::QueryError,
    query::QueryPipeline,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Moisture,
    SoilTemperature,
    Air,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Moisture => "moisture",
            Tab::SoilTemperature => "soil-temperature",
            Tab::Air => "air",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Moisture => "Soil Moisture",
            Tab::SoilTemperature => "Soil Temperature",
            Tab::Air => "Air Temperature",
        }
    }

    pub const fn all() -> &'static [Tab] {
        &[Tab::Moisture, Tab::SoilTemperature, Tab::Air]
    }

    /// Chart for this tab at its default canvas size.
    pub fn render(&self, result: &QueryResult) -> Chart {
        match self {
            Tab::Moisture => chart::moisture::render(&result.series, chart::moisture::DIMENSIONS),
            Tab::SoilTemperature => {
                chart::soil_temperature::render(&result.series, chart::soil_temperature::DIMENSIONS)
            }
            Tab::Air => chart::air::render(&result.series, chart::air::DIMENSIONS),
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for Tab {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "moisture" | "soil-moisture" => Ok(Tab::Moisture),
            "soil-temperature" | "temperature" => Ok(Tab::SoilTemperature),
            "air" => Ok(Tab::Air),
            _ => Err(anyhow::anyhow!(
                "Unknown tab '{value}'. Supported tabs: moisture, soil-temperature, air."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Displaying,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Found(Arc<QueryResult>),
    Failed { kind: FailureKind, message: String },
}

impl From<Result<QueryResult, QueryError>> for Outcome {
    fn from(result: Result<QueryResult, QueryError>) -> Self {
        match result {
            Ok(found) => Outcome::Found(Arc::new(found)),
            Err(e) => Outcome::Failed {
                kind: e.kind(),
                message: e.user_message(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Input(String),
    Submit,
    Resolved { request: u64, outcome: Outcome },
    SelectTab(Tab),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub pending_place: String,
    pub phase: Phase,
    pub outcome: Option<Outcome>,
    pub active_tab: Option<Tab>,
    /// Id of the most recent submission; older resolutions are stale.
    pub request: u64,
}

/// One row of the place table.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRow {
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ViewState {
    pub fn result(&self) -> Option<&QueryResult> {
        match &self.outcome {
            Some(Outcome::Found(result)) => Some(result),
            _ => None,
        }
    }

    /// Failure message of the last resolved query, if it failed.
    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Some(Outcome::Failed { message, .. }) => Some(message),
            _ => None,
        }
    }

    pub fn city_table(&self) -> Option<CityRow> {
        self.result().map(|r| CityRow {
            place: r.place.clone(),
            latitude: r.coordinate.latitude,
            longitude: r.coordinate.longitude,
        })
    }

    /// Chart of the active tab against the current result.
    pub fn active_chart(&self) -> Option<Chart> {
        let tab = self.active_tab?;
        self.result().map(|r| tab.render(r))
    }
}

pub fn reduce(state: &ViewState, action: Action) -> ViewState {
    match action {
        Action::Input(text) => ViewState {
            pending_place: text,
            ..state.clone()
        },
        Action::Submit if state.pending_place.trim().is_empty() => state.clone(),
        Action::Submit => ViewState {
            phase: Phase::Submitting,
            request: state.request + 1,
            ..state.clone()
        },
        Action::Resolved { request, .. } if request != state.request => state.clone(),
        Action::Resolved { outcome, .. } => ViewState {
            phase: Phase::Displaying,
            outcome: Some(outcome),
            ..state.clone()
        },
        Action::SelectTab(tab) => ViewState {
            active_tab: Some(tab),
            ..state.clone()
        },
    }
}

/// Owns the view state and at most one in-flight query.
#[derive(Debug)]
pub struct Session {
    pipeline: Arc<QueryPipeline>,
    state: ViewState,
    in_flight: Option<(u64, JoinHandle<Result<QueryResult, QueryError>>)>,
}

impl Session {
    pub fn new(pipeline: QueryPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            state: ViewState::default(),
            in_flight: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Replace the pending place name.
    pub fn input(&mut self, place: impl Into<String>) -> &ViewState {
        self.apply(Action::Input(place.into()))
    }

    pub fn select_tab(&mut self, tab: Tab) -> &ViewState {
        self.apply(Action::SelectTab(tab))
    }

    /// `Submit` and `Resolved` only reach the reducer through `submit` and `settle`,
    /// so every submission has a task behind it.
    fn apply(&mut self, action: Action) -> &ViewState {
        self.state = reduce(&self.state, action);
        &self.state
    }

    /// Start a query for the pending place, cancelling any query still running.
    /// Returns the request id, or `None` when there is nothing to submit.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self) -> Option<u64> {
        let before = self.state.request;
        self.apply(Action::Submit);
        if self.state.request == before {
            return None;
        }

        if let Some((superseded, handle)) = self.in_flight.take() {
            tracing::debug!(request = superseded, "cancelling superseded query");
            handle.abort();
        }

        let request = self.state.request;
        let place = self.state.pending_place.clone();
        let pipeline = Arc::clone(&self.pipeline);
        let handle = tokio::spawn(async move { pipeline.run(&place).await });
        self.in_flight = Some((request, handle));
        Some(request)
    }

    /// Wait for the in-flight query, if any, and apply its outcome.
    pub async fn settle(&mut self) -> &ViewState {
        if let Some((request, handle)) = self.in_flight.take() {
            match handle.await {
                Ok(result) => {
                    self.apply(Action::Resolved {
                        request,
                        outcome: result.into(),
                    });
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => tracing::error!(error = %e, "query task failed"),
            }
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::query::fakes::{FakeGeocoder, FakeWeather};

    fn submitted(place: &str) -> ViewState {
        let state = reduce(&ViewState::default(), Action::Input(place.into()));
        reduce(&state, Action::Submit)
    }

    fn not_found(place: &str) -> Outcome {
        Outcome::from(Err::<QueryResult, _>(QueryError::NotFound {
            place: place.into(),
        }))
    }

    #[test]
    fn tab_as_str_roundtrip() {
        for tab in Tab::all() {
            let parsed = Tab::try_from(tab.as_str()).expect("roundtrip should succeed");
            assert_eq!(*tab, parsed);
        }
        let err = Tab::try_from("radar").unwrap_err();
        assert!(err.to_string().contains("Unknown tab"));
    }

    #[test]
    fn typing_keeps_phase() {
        let state = reduce(&ViewState::default(), Action::Input("Bos".into()));
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.pending_place, "Bos");
    }

    #[test]
    fn blank_submit_is_ignored() {
        let state = reduce(&ViewState::default(), Action::Input("  ".into()));
        let next = reduce(&state, Action::Submit);
        assert_eq!(next, state);
    }

    #[test]
    fn submit_then_failure_displays_message_without_table() {
        let state = submitted("Xyzzyplakqr");
        assert_eq!(state.phase, Phase::Submitting);
        assert_eq!(state.request, 1);

        let state = reduce(
            &state,
            Action::Resolved {
                request: 1,
                outcome: not_found("Xyzzyplakqr"),
            },
        );
        assert_eq!(state.phase, Phase::Displaying);
        assert!(state.city_table().is_none());
        assert!(state.error_message().unwrap().contains("Xyzzyplakqr"));

        for tab in Tab::all() {
            let state = reduce(&state, Action::SelectTab(*tab));
            assert!(state.active_chart().is_none());
        }
    }

    #[test]
    fn stale_resolution_is_dropped() {
        let state = submitted("Slowtown");
        let state = reduce(&state, Action::Input("Boston".into()));
        let state = reduce(&state, Action::Submit);
        assert_eq!(state.request, 2);

        let after = reduce(
            &state,
            Action::Resolved {
                request: 1,
                outcome: not_found("Slowtown"),
            },
        );
        assert_eq!(after, state);
        assert_eq!(after.phase, Phase::Submitting);
    }

    #[test]
    fn tab_before_any_query_renders_nothing() {
        let state = reduce(&ViewState::default(), Action::SelectTab(Tab::Air));
        assert_eq!(state.active_tab, Some(Tab::Air));
        assert!(state.active_chart().is_none());
    }

    #[tokio::test]
    async fn session_displays_boston_on_every_tab() {
        let pipeline = QueryPipeline::new(
            Arc::new(FakeGeocoder::default().with("Boston", -71.06, 42.36, 0)),
            Arc::new(FakeWeather::default()),
        );
        let mut session = Session::new(pipeline);
        session.input("Boston");
        assert_eq!(session.submit(), Some(1));

        let state = session.settle().await;
        assert_eq!(state.phase, Phase::Displaying);
        let row = state.city_table().expect("table should be shown");
        assert_eq!((row.latitude, row.longitude), (42.36, -71.06));

        for (tab, variables) in [(Tab::Moisture, 5), (Tab::SoilTemperature, 4), (Tab::Air, 2)] {
            session.select_tab(tab);
            let chart = session.state().active_chart().expect("chart should render");
            assert_eq!(chart.data_points(), 72 * variables);
        }
    }

    #[tokio::test]
    async fn newer_submission_supersedes_slow_one() {
        let geocoder = Arc::new(
            FakeGeocoder::default()
                .with("Slowtown", 10.0, 1.0, 5_000)
                .with("Boston", -71.06, 42.36, 0),
        );
        let weather = Arc::new(FakeWeather::default());
        let mut session = Session::new(QueryPipeline::new(geocoder, weather.clone()));

        session.input("Slowtown");
        session.submit();
        session.input("Boston");
        session.submit();

        let state = session.settle().await;
        assert_eq!(state.city_table().map(|r| r.place), Some("Boston".to_string()));
        assert_eq!(weather.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_submission_starts_nothing_and_never_sticks() {
        let pipeline = QueryPipeline::new(
            Arc::new(FakeGeocoder::default().with("Boston", -71.06, 42.36, 0)),
            Arc::new(FakeWeather::default()),
        );
        let mut session = Session::new(pipeline);

        session.input("   ");
        assert_eq!(session.submit(), None);
        let state = session.settle().await;
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.request, 0);

        session.input("Boston");
        assert_eq!(session.submit(), Some(1));
        session.input("");
        assert_eq!(session.submit(), None);

        let state = session.settle().await;
        assert_eq!(state.phase, Phase::Displaying);
        assert!(state.city_table().is_some());
    }
}
