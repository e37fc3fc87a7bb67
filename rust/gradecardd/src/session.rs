use crate::config::DaemonConfig;
use crate::export::{ExportError, ExportJob, ExportOutcome};
use crate::grading::GradeScale;
use crate::logo::Logo;
use crate::report::{self, ReportConfig, ReportModel};
use crate::roster::{AddOutcome, Roster};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum ExportStatus {
    Idle,
    Running {
        #[serde(rename = "jobId")]
        job_id: String,
        #[serde(rename = "fileName")]
        file_name: String,
    },
    Done {
        #[serde(rename = "jobId")]
        job_id: String,
        outcome: ExportOutcome,
    },
    Failed {
        #[serde(rename = "jobId")]
        job_id: String,
        message: String,
    },
}

enum ExportSlot {
    Idle,
    Running(ExportJob),
    Finished(Uuid, Result<ExportOutcome, String>),
}

#[derive(Debug, Clone)]
pub struct StartedExport {
    pub job_id: Uuid,
    pub file_name: String,
}

#[derive(Debug, thiserror::Error)]
#[error("an export is already running (job {0})")]
pub struct ExportBusy(pub Uuid);

/// One grade report session: roster, report configuration, mounted card and
/// the export slot. Everything lives for the lifetime of the process.
pub struct Session {
    defaults: DaemonConfig,
    roster: Roster,
    report: ReportConfig,
    mounted: bool,
    export: ExportSlot,
}

impl Session {
    pub fn new(defaults: DaemonConfig) -> Self {
        let report = Self::fresh_report(&defaults);
        Self {
            defaults,
            roster: Roster::new(),
            report,
            mounted: false,
            export: ExportSlot::Idle,
        }
    }

    fn fresh_report(defaults: &DaemonConfig) -> ReportConfig {
        ReportConfig {
            title: defaults.title.clone(),
            subtitle: defaults.subtitle.clone(),
            scale: defaults.scale,
            ..ReportConfig::default()
        }
    }

    /// Drops roster, logo and mounted card. A running export keeps going.
    pub fn reset(&mut self) {
        self.roster.clear();
        self.report = Self::fresh_report(&self.defaults);
        self.mounted = false;
        if matches!(self.export, ExportSlot::Finished(..)) {
            self.export = ExportSlot::Idle;
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn report(&self) -> &ReportConfig {
        &self.report
    }

    pub fn scale(&self) -> GradeScale {
        self.report.scale
    }

    fn sync_snapshot(&mut self) {
        self.report.students = self.roster.snapshot();
    }

    pub fn add_student(&mut self, name: &str, grade_input: &str) -> Option<AddOutcome> {
        let added = self.roster.add(name, grade_input)?;
        if added.coerced {
            tracing::warn!(
                student = %added.id,
                input = grade_input,
                "unreadable grade input stored as 0"
            );
        }
        tracing::debug!(student = %added.id, count = self.roster.len(), "student added");
        self.sync_snapshot();
        Some(added)
    }

    pub fn remove_student(&mut self, id: Uuid) -> bool {
        let removed = self.roster.remove(id);
        if removed {
            tracing::debug!(student = %id, count = self.roster.len(), "student removed");
        }
        self.sync_snapshot();
        removed
    }

    pub fn set_title(&mut self, title: &str) {
        self.report.title = title.to_string();
    }

    pub fn set_subtitle(&mut self, subtitle: &str) {
        self.report.subtitle = subtitle.to_string();
    }

    pub fn set_scale(&mut self, scale: GradeScale) {
        self.report.scale = scale;
    }

    pub fn set_logo(&mut self, logo: Logo) {
        if logo.oversized() {
            tracing::warn!(bytes = logo.bytes, "logo exceeds the advertised 2MB limit");
        }
        self.report.logo = Some(logo);
    }

    pub fn remove_logo(&mut self) {
        self.report.logo = None;
    }

    pub fn model(&self) -> ReportModel {
        report::build(&self.report)
    }

    /// Builds the card as currently displayed and marks it mounted.
    pub fn preview(&mut self) -> ReportModel {
        self.mounted = true;
        self.model()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Starts a PDF export of the mounted card. `Ok(None)` is the silent
    /// no-op for an empty roster or a card that was never previewed.
    pub fn start_export(
        &mut self,
        out_dir: Option<PathBuf>,
    ) -> Result<Option<StartedExport>, ExportBusy> {
        self.poll_export();
        if let ExportSlot::Running(job) = &self.export {
            return Err(ExportBusy(job.id));
        }
        if self.roster.is_empty() || !self.mounted {
            tracing::debug!(
                students = self.roster.len(),
                mounted = self.mounted,
                "export skipped"
            );
            return Ok(None);
        }

        let out_dir = out_dir.unwrap_or_else(|| self.defaults.export.out_dir.clone());
        let job = ExportJob::spawn(self.model(), self.defaults.export.clone(), out_dir);
        tracing::info!(job = %job.id, file = %job.file_name, "export started");
        let started = StartedExport {
            job_id: job.id,
            file_name: job.file_name.clone(),
        };
        self.export = ExportSlot::Running(job);
        Ok(Some(started))
    }

    fn poll_export(&mut self) {
        let finished = matches!(&self.export, ExportSlot::Running(job) if job.is_finished());
        if finished {
            self.finish_export();
        }
    }

    fn finish_export(&mut self) {
        if let ExportSlot::Running(job) = std::mem::replace(&mut self.export, ExportSlot::Idle) {
            let id = job.id;
            let res = job.wait().map_err(|e: ExportError| e.to_string());
            self.export = ExportSlot::Finished(id, res);
        }
    }

    /// Blocks until the running export (if any) completes.
    pub fn wait_export(&mut self) -> ExportStatus {
        self.finish_export();
        self.export_status()
    }

    pub fn export_status(&mut self) -> ExportStatus {
        self.poll_export();
        match &self.export {
            ExportSlot::Idle => ExportStatus::Idle,
            ExportSlot::Running(job) => ExportStatus::Running {
                job_id: job.id.to_string(),
                file_name: job.file_name.clone(),
            },
            ExportSlot::Finished(id, Ok(outcome)) => ExportStatus::Done {
                job_id: id.to_string(),
                outcome: outcome.clone(),
            },
            ExportSlot::Finished(id, Err(message)) => ExportStatus::Failed {
                job_id: id.to_string(),
                message: message.clone(),
            },
        }
    }
}
