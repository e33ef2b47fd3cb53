use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Read an engine config from JSON. Keys left out keep their defaults; a
/// missing path yields the default config.
pub fn load<C>(path: Option<&Path>) -> Result<C>
where
    C: DeserializeOwned + Default,
{
    let Some(path) = path else {
        return Ok(C::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing config {}", path.display()))
}

pub fn parse<C: DeserializeOwned>(text: &str) -> Result<C> {
    Ok(serde_json::from_str(text)?)
}

/// Where completed outcomes go: always the log, optionally a JSON-lines file.
#[derive(Debug, Clone)]
pub struct ResultSink {
    task: &'static str,
    path: Option<PathBuf>,
}

impl ResultSink {
    pub fn new(task: &'static str, path: Option<PathBuf>) -> Self {
        Self { task, path }
    }

    pub fn record<O: Serialize>(&self, outcome: &O) -> Result<String> {
        let line = serde_json::to_string(&serde_json::json!({
            "task": self.task,
            "result": outcome,
        }))?;
        if let Some(path) = &self.path {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening results {}", path.display()))?;
            writeln!(file, "{line}")?;
        }
        Ok(line)
    }

    /// `record` for use inside completion hooks, which cannot return errors.
    pub fn publish<O: Serialize>(&self, outcome: &O) {
        match self.record(outcome) {
            Ok(line) => info!(task = self.task, result = %line, "session result"),
            Err(e) => error!(task = self.task, "failed to record result: {e:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogkit_tasks::{MazeConfig, MazeOutcome, NBackConfig};

    #[test]
    fn partial_json_keeps_defaults() {
        let c: NBackConfig = parse(r#"{"nValue": 3}"#).unwrap();
        assert_eq!(c.n_value, 3);
        assert_eq!(c.sequence_length, NBackConfig::default().sequence_length);
    }

    #[test]
    fn missing_path_is_default() {
        let c: MazeConfig = load(None).unwrap();
        assert_eq!(c, MazeConfig::default());
    }

    #[test]
    fn unreadable_config_names_the_file() {
        let err = load::<MazeConfig>(Some(Path::new("/nonexistent/cogkit.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("cogkit.json"));
    }

    #[test]
    fn results_append_one_line_per_session() {
        let path = std::env::temp_dir().join(format!("cogkit-results-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let sink = ResultSink::new("maze", Some(path.clone()));
        let outcome = MazeOutcome {
            time_ms: 1200,
            completed: true,
        };
        sink.record(&outcome).unwrap();
        let line = sink.record(&outcome).unwrap();
        assert_eq!(line, r#"{"result":{"completed":true,"time":1200},"task":"maze"}"#);

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
        let _ = std::fs::remove_file(&path);
    }
}
