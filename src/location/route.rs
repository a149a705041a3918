use super::{LocationError, LocationEvent, LocationSource, SourceOptions};
use crate::geo::Position;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Replays a recorded route (a JSON array of fixes) on a timer, standing in
/// for a live GPS feed. The first fix goes out immediately as the one-shot
/// initial position; the rest follow at the configured interval.
pub struct RouteSource {
    fixes: Vec<Position>,
    interval: Duration,
    options: SourceOptions,
    feeder: Option<JoinHandle<()>>,
}

impl RouteSource {
    pub fn new(fixes: Vec<Position>, interval: Duration, options: SourceOptions) -> Self {
        Self {
            fixes,
            interval,
            options,
            feeder: None,
        }
    }

    pub fn from_file(
        path: &Path,
        interval: Duration,
        options: SourceOptions,
    ) -> Result<Self, LocationError> {
        let content = fs::read_to_string(path)
            .map_err(|e| LocationError::Unavailable(format!("route {}: {}", path.display(), e)))?;
        let fixes: Vec<Position> = serde_json::from_str(&content)
            .map_err(|e| LocationError::Unavailable(format!("route {}: {}", path.display(), e)))?;

        Ok(Self::new(fixes, interval, options))
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}

impl LocationSource for RouteSource {
    fn subscribe(&mut self) -> Result<mpsc::UnboundedReceiver<LocationEvent>, LocationError> {
        if self.fixes.is_empty() {
            return Err(LocationError::Unavailable("route has no fixes".to_string()));
        }

        info!(
            fixes = self.fixes.len(),
            interval = ?self.interval,
            high_accuracy = self.options.high_accuracy,
            max_age_secs = self.options.max_age_secs,
            update_timeout_secs = self.options.update_timeout_secs,
            "starting route replay"
        );

        let (sender, receiver) = mpsc::unbounded_channel();
        let fixes = self.fixes.clone();
        let interval = self.interval;

        self.feeder = Some(tokio::spawn(async move {
            let mut first = true;
            for fix in fixes {
                if !first {
                    tokio::time::sleep(interval).await;
                }
                first = false;

                if sender.send(LocationEvent::Position(fix)).is_err() {
                    // Receiver dropped, stop feeding
                    return;
                }
            }
            debug!("route replay finished");
        }));

        Ok(receiver)
    }

    fn cancel(&mut self) {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
            debug!("route replay canceled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> SourceOptions {
        SourceOptions {
            high_accuracy: true,
            max_age_secs: 0,
            update_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_replays_fixes_in_order_then_closes() {
        let fixes = vec![
            Position::new(38.8431, 29.9594),
            Position::new(38.8432, 29.9594),
            Position::new(38.8433, 29.9594),
        ];
        let mut source = RouteSource::new(fixes.clone(), Duration::from_millis(1), options());

        let mut rx = source.subscribe().unwrap();
        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            match event {
                LocationEvent::Position(p) => received.push(p),
                LocationEvent::Error(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(received, fixes);
    }

    #[tokio::test]
    async fn test_empty_route_is_unavailable() {
        let mut source = RouteSource::new(Vec::new(), Duration::from_millis(1), options());
        assert!(matches!(
            source.subscribe(),
            Err(LocationError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_stops_the_feed() {
        let fixes = vec![Position::new(38.8431, 29.9594); 100];
        let mut source = RouteSource::new(fixes, Duration::from_secs(60), options());

        let mut rx = source.subscribe().unwrap();
        // Initial fix arrives immediately
        assert!(matches!(
            rx.recv().await,
            Some(LocationEvent::Position(_))
        ));

        source.cancel();
        // Feeder aborted: channel drains and closes instead of ticking on
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_from_file_parses_fix_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route.json");
        std::fs::write(
            &path,
            r#"[
                {"latitude": 38.843101, "longitude": 29.959400},
                {"latitude": 38.843176, "longitude": 29.959135, "accuracy_m": 3.5}
            ]"#,
        )
        .unwrap();

        let source = RouteSource::from_file(&path, Duration::from_secs(1), options()).unwrap();
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_missing_route_file_is_unavailable() {
        let result = RouteSource::from_file(
            Path::new("/nonexistent/route.json"),
            Duration::from_secs(1),
            options(),
        );
        assert!(matches!(result, Err(LocationError::Unavailable(_))));
    }
}
