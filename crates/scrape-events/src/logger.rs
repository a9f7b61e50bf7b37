//! `StructuredLogger` is the only way the engine writes to the event log.
//! Every call fans out to two places: the durable sink (Postgres in
//! production) and `tracing`, so an operator tailing logs sees the same
//! story a later `get_job_logs` query would return.

use std::sync::Arc;
use std::time::Duration;

use scrape_types::{EventData, LogLevel, NewLogEvent, Result};
use sysinfo::System;
use uuid::Uuid;

use crate::sink::EventSink;

#[derive(Clone)]
pub struct StructuredLogger {
    sink: Arc<dyn EventSink>,
}

impl StructuredLogger {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Append one structured log row and mirror it through `tracing`.
    pub async fn log(
        &self,
        job_id: Uuid,
        source_id: Option<Uuid>,
        level: LogLevel,
        message: impl Into<String>,
        data: EventData,
    ) -> Result<()> {
        let message = message.into();
        self.emit_tracing(job_id, source_id, level, &message, &data);

        let event = NewLogEvent {
            job_id,
            source_id,
            log_level: level,
            message,
            additional_data: data,
        };
        self.sink.write(event).await
    }

    fn emit_tracing(
        &self,
        job_id: Uuid,
        source_id: Option<Uuid>,
        level: LogLevel,
        message: &str,
        data: &EventData,
    ) {
        let event_type = serde_json::to_value(data)
            .ok()
            .and_then(|v| v.get("event_type").and_then(|t| t.as_str().map(str::to_string)))
            .unwrap_or_else(|| "unknown".to_string());

        match level {
            LogLevel::Info => tracing::info!(%job_id, ?source_id, event_type, "{}", message),
            LogLevel::Warning => tracing::warn!(%job_id, ?source_id, event_type, "{}", message),
            LogLevel::Error => tracing::error!(%job_id, ?source_id, event_type, "{}", message),
        }
    }

    /// A fresh correlation id for tying together the request/response pair
    /// of a single HTTP fetch inside the event log.
    pub fn new_correlation_id(&self) -> Uuid {
        Uuid::new_v4()
    }

    /// Spawn a task that logs a `performance_snapshot` event every 30
    /// seconds until the returned handle is aborted. Callers abort it when
    /// the job reaches a terminal state.
    pub fn start_performance_snapshots(&self, job_id: Uuid) -> tokio::task::JoinHandle<()> {
        let logger = self.clone();
        tokio::spawn(async move {
            let mut system = System::new();
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            interval.tick().await; // first tick fires immediately; skip it
            loop {
                interval.tick().await;
                let snapshot = sample_system(&mut system);
                let _ = logger
                    .log(
                        job_id,
                        None,
                        LogLevel::Info,
                        "performance snapshot",
                        EventData::Performance(scrape_types::PerformanceEvent::PerformanceSnapshot {
                            mem_mb: snapshot.mem_mb,
                            cpu_pct: snapshot.cpu_pct,
                            active_reqs: 0,
                            queue_size: 0,
                            avg_resp_ms: 0.0,
                        }),
                    )
                    .await;
            }
        })
    }
}

struct SystemSnapshot {
    mem_mb: f64,
    cpu_pct: f64,
}

fn sample_system(system: &mut System) -> SystemSnapshot {
    system.refresh_cpu_all();
    let pid = sysinfo::get_current_pid().ok();
    if let Some(pid) = pid {
        system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[pid]), true);
    }
    let mem_bytes = pid
        .and_then(|pid| system.process(pid))
        .map(|p| p.memory())
        .unwrap_or(0);
    SystemSnapshot {
        mem_mb: mem_bytes as f64 / (1024.0 * 1024.0),
        cpu_pct: system.global_cpu_usage() as f64,
    }
}
