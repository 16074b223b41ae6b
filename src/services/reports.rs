// ABOUTME: Patient report view model assembly and HTML rendering
// ABOUTME: Plans are resolved with the same rehydration used by the recommendations API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Patient reports
//!
//! [`ReportBuilder`] gathers everything a printed report needs into a
//! [`PatientReport`]. [`render_html`] turns it into a self-contained HTML
//! document, the input a PDF renderer would consume. PDF conversion and
//! delivery happen outside this server.

use std::fmt::Write as _;

use crate::catalog::TemplateCatalog;
use crate::constants::limits;
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{Patient, Prediction};
use chrono::{DateTime, NaiveDate, Utc};
use heartcare_intelligence::{rehydrate, DisplayPlan, RiskLevel};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Report HTML skeleton embedded at compile time
const REPORT_TEMPLATE: &str = include_str!("../../templates/patient_report.html");

const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// ============================================================================
// View Model
// ============================================================================

/// Everything printed on a patient report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientReport {
    /// Clinic header
    pub clinic_name: String,
    /// When the report was assembled
    pub generated_at: DateTime<Utc>,
    /// Patient demographics and body measurements
    pub patient: PatientInfo,
    /// Most recent assessment, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_prediction: Option<PredictionView>,
    /// Exercise plan, if one resolves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_plan: Option<DisplayPlan>,
    /// Prediction history, newest first
    pub history: Vec<HistoryEntry>,
}

/// Patient section of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    /// Patient name
    pub name: String,
    /// Date of birth
    pub dob: NaiveDate,
    /// Gender label
    pub gender: String,
    /// Age in years; taken from the latest assessment when available
    pub age_years: i32,
    /// Height in centimetres, one decimal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    /// Weight in kilograms, one decimal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    /// Body mass index, one decimal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
}

/// Latest assessment section of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionView {
    /// Prediction identifier
    pub prediction_id: i64,
    /// Assessment time
    pub created_at: DateTime<Utc>,
    /// Probability as a whole percentage
    pub probability_pct: i64,
    /// Risk level as returned by the scorer
    pub risk_level: String,
    /// Human-readable risk label
    pub label: String,
    /// Main contributing risk factors
    pub risk_factors: Vec<String>,
}

/// One row of the history table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Prediction identifier
    pub prediction_id: i64,
    /// Assessment time
    pub created_at: DateTime<Utc>,
    /// Probability as a whole percentage
    pub probability_pct: i64,
    /// Human-readable risk label
    pub risk_label: String,
}

// ============================================================================
// Builder
// ============================================================================

/// Assembles [`PatientReport`]s from storage
pub struct ReportBuilder {
    database: Database,
    clinic_name: String,
}

impl ReportBuilder {
    /// Create a report builder
    #[must_use]
    pub const fn new(database: Database, clinic_name: String) -> Self {
        Self {
            database,
            clinic_name,
        }
    }

    /// Build the report for a patient the caller is allowed to see
    ///
    /// # Errors
    ///
    /// Returns an error if the patient's predictions cannot be read. A plan
    /// that cannot be resolved is left out of the report instead.
    pub async fn build(&self, patient: &Patient, now: DateTime<Utc>) -> AppResult<PatientReport> {
        let predictions = self.database.predictions();
        let latest = predictions.latest_by_patient(patient.id).await?;
        let history = predictions
            .history(patient.id, limits::REPORT_HISTORY_LIMIT)
            .await?;

        let mut info = patient_info(patient, now.date_naive());
        if let Some(prediction) = &latest {
            merge_measurements(&mut info, prediction);
        }

        let exercise_plan = self.load_plan(patient.id, latest.as_ref()).await;

        debug!(
            patient_id = patient.id,
            history = history.len(),
            has_plan = exercise_plan.is_some(),
            "Patient report assembled"
        );

        Ok(PatientReport {
            clinic_name: self.clinic_name.clone(),
            generated_at: now,
            patient: info,
            latest_prediction: latest.as_ref().map(prediction_view),
            exercise_plan,
            history: history.iter().map(history_entry).collect(),
        })
    }

    /// Plan of the latest prediction
    ///
    /// Plans hang off predictions, so a patient without predictions has none.
    async fn load_plan(&self, patient_id: i64, latest: Option<&Prediction>) -> Option<DisplayPlan> {
        let prediction = latest?;
        let stored = match self
            .database
            .recommendations()
            .get_by_prediction(prediction.id)
            .await
        {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                warn!(patient_id, error = %e, "Could not load stored plan for report");
                return None;
            }
        };

        match TemplateCatalog::list_templates(&self.database.exercise_templates()).await {
            Ok(templates) => rehydrate(&stored.plan, &templates),
            Err(e) => {
                warn!(patient_id, error = %e, "Template catalog unavailable for report");
                None
            }
        }
    }
}

fn patient_info(patient: &Patient, today: NaiveDate) -> PatientInfo {
    PatientInfo {
        name: patient.name.clone(),
        dob: patient.dob,
        gender: patient.gender.label().to_owned(),
        age_years: patient.age_on(today),
        height_cm: None,
        weight_kg: None,
        bmi: None,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[allow(clippy::cast_possible_truncation)]
fn merge_measurements(info: &mut PatientInfo, prediction: &Prediction) {
    let height = prediction.feature_f64("height").filter(|h| *h > 0.0);
    let weight = prediction.feature_f64("weight").filter(|w| *w > 0.0);

    info.height_cm = height.map(round1);
    info.weight_kg = weight.map(round1);
    if let (Some(height), Some(weight)) = (height, weight) {
        let metres = height / 100.0;
        info.bmi = Some(round1(weight / (metres * metres)));
    }

    if let Some(age) = prediction.feature_f64("age_years").filter(|a| *a > 0.0) {
        info.age_years = age.round() as i32;
    }
}

#[allow(clippy::cast_possible_truncation)]
fn probability_pct(probability: f64) -> i64 {
    (probability * 100.0).round() as i64
}

fn display_label(risk_label: &str) -> String {
    RiskLevel::from_label(risk_label)
        .map_or_else(|| risk_label.to_owned(), |level| level.display_label().to_owned())
}

/// Factor messages from the scorer, or threshold checks on the raw features when it sent none
fn risk_factors(prediction: &Prediction) -> Vec<String> {
    let from_scorer: Vec<String> = prediction
        .factors
        .iter()
        .map(|factor| {
            if factor.message.is_empty() {
                factor.field.clone()
            } else {
                factor.message.clone()
            }
        })
        .filter(|message| !message.is_empty())
        .collect();
    if !from_scorer.is_empty() {
        return from_scorer;
    }

    let feature = |key: &str| prediction.feature_f64(key);
    let mut factors = Vec::new();
    if feature("cholesterol").is_some_and(|v| v >= 3.0) {
        factors.push("High cholesterol".to_owned());
    }
    if feature("gluc").is_some_and(|v| v >= 3.0) {
        factors.push("High blood glucose".to_owned());
    }
    if feature("ap_hi").is_some_and(|v| v > 140.0) || feature("ap_lo").is_some_and(|v| v > 90.0)
    {
        factors.push("High blood pressure".to_owned());
    }
    if feature("smoke").is_some_and(|v| v >= 1.0) {
        factors.push("Smoker".to_owned());
    }
    if feature("alco").is_some_and(|v| v >= 1.0) {
        factors.push("Alcohol intake".to_owned());
    }
    if feature("active").is_some_and(|v| v < 1.0) {
        factors.push("Low physical activity".to_owned());
    }
    factors
}

fn prediction_view(prediction: &Prediction) -> PredictionView {
    PredictionView {
        prediction_id: prediction.id,
        created_at: prediction.created_at,
        probability_pct: probability_pct(prediction.probability),
        risk_level: prediction.risk_label.clone(),
        label: display_label(&prediction.risk_label),
        risk_factors: risk_factors(prediction),
    }
}

fn history_entry(prediction: &Prediction) -> HistoryEntry {
    HistoryEntry {
        prediction_id: prediction.id,
        created_at: prediction.created_at,
        probability_pct: probability_pct(prediction.probability),
        risk_label: display_label(&prediction.risk_label),
    }
}

// ============================================================================
// HTML Rendering
// ============================================================================

fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

fn render_patient(info: &PatientInfo) -> String {
    let measurement = |value: Option<f64>, unit: &str| {
        value.map_or_else(|| "-".to_owned(), |v| format!("{v:.1}{unit}"))
    };

    format!(
        "<table>\
         <tr><th>Name</th><td>{}</td><th>Date of birth</th><td>{}</td></tr>\
         <tr><th>Gender</th><td>{}</td><th>Age</th><td>{}</td></tr>\
         <tr><th>Height</th><td>{}</td><th>Weight</th><td>{}</td></tr>\
         <tr><th>BMI</th><td colspan=\"3\">{}</td></tr>\
         </table>",
        escape(&info.name),
        info.dob.format("%Y-%m-%d"),
        escape(&info.gender),
        info.age_years,
        measurement(info.height_cm, " cm"),
        measurement(info.weight_kg, " kg"),
        measurement(info.bmi, ""),
    )
}

fn render_latest(latest: Option<&PredictionView>) -> String {
    let Some(latest) = latest else {
        return r#"<p class="empty">No assessment recorded.</p>"#.to_owned();
    };

    let mut html = format!(
        r#"<p>{}: <span class="risk">{}</span> ({}%)</p>"#,
        latest.created_at.format(DISPLAY_TIME_FORMAT),
        escape(&latest.label),
        latest.probability_pct,
    );
    if !latest.risk_factors.is_empty() {
        html.push_str("<ul>");
        for factor in &latest.risk_factors {
            let _ = write!(html, "<li>{}</li>", escape(factor));
        }
        html.push_str("</ul>");
    }
    html
}

fn render_plan(plan: Option<&DisplayPlan>) -> String {
    let Some(plan) = plan else {
        return r#"<p class="empty">No exercise plan.</p>"#.to_owned();
    };

    let mut html = String::new();
    if !plan.summary.is_empty() {
        let _ = write!(html, "<p>{}</p>", escape(&plan.summary));
    }
    if plan.items.is_empty() {
        html.push_str(r#"<p class="empty">No exercises currently available.</p>"#);
        return html;
    }

    html.push_str(
        "<table><tr><th>Exercise</th><th>Intensity</th><th>Duration</th><th>Frequency</th><th>Notes</th></tr>",
    );
    for item in &plan.items {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{} min</td><td>{} per week</td><td>{}</td></tr>",
            escape(&item.name),
            escape(&item.intensity),
            item.duration_min,
            item.freq_per_week,
            escape(&item.notes),
        );
    }
    html.push_str("</table>");
    html
}

fn render_history(history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return r#"<p class="empty">No history.</p>"#.to_owned();
    }

    let mut html = "<table><tr><th>Time</th><th>Probability</th><th>Risk</th></tr>".to_owned();
    for entry in history {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}%</td><td>{}</td></tr>",
            entry.created_at.format(DISPLAY_TIME_FORMAT),
            entry.probability_pct,
            escape(&entry.risk_label),
        );
    }
    html.push_str("</table>");
    html
}

/// Render a report as a standalone HTML document
#[must_use]
pub fn render_html(report: &PatientReport) -> String {
    REPORT_TEMPLATE
        .replace("{{CLINIC_NAME}}", &escape(&report.clinic_name))
        .replace(
            "{{GENERATED_AT}}",
            &report.generated_at.format(DISPLAY_TIME_FORMAT).to_string(),
        )
        .replace("{{PATIENT}}", &render_patient(&report.patient))
        .replace(
            "{{LATEST_PREDICTION}}",
            &render_latest(report.latest_prediction.as_ref()),
        )
        .replace("{{EXERCISE_PLAN}}", &render_plan(report.exercise_plan.as_ref()))
        .replace("{{HISTORY}}", &render_history(&report.history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, RiskFactor};
    use heartcare_intelligence::PlanItem;
    use serde_json::json;
    use uuid::Uuid;

    fn prediction(raw_features: serde_json::Value, factors: Vec<RiskFactor>) -> Prediction {
        Prediction {
            id: 7,
            patient_id: 1,
            probability: 0.726,
            risk_label: "High".to_owned(),
            raw_features,
            factors,
            created_at: Utc::now(),
        }
    }

    fn patient() -> Patient {
        Patient {
            id: 1,
            user_id: Uuid::new_v4(),
            name: "Ana <Lopez>".to_owned(),
            gender: Gender::Female,
            dob: NaiveDate::from_ymd_opt(1970, 6, 1).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_measurements_override_age_and_compute_bmi() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut info = patient_info(&patient(), today);
        assert_eq!(info.age_years, 54);

        merge_measurements(
            &mut info,
            &prediction(json!({"age_years": 56.6, "height": 165.0, "weight": 72.34}), vec![]),
        );
        assert_eq!(info.age_years, 57);
        assert_eq!(info.height_cm, Some(165.0));
        assert_eq!(info.weight_kg, Some(72.3));
        assert_eq!(info.bmi, Some(26.6));
    }

    #[test]
    fn test_risk_factors_prefer_scorer_messages() {
        let scored = prediction(
            json!({"cholesterol": 3}),
            vec![RiskFactor {
                field: "ap_hi".to_owned(),
                status: "high".to_owned(),
                message: "Elevated systolic pressure".to_owned(),
                contribution: Some(0.2),
            }],
        );
        assert_eq!(risk_factors(&scored), vec!["Elevated systolic pressure"]);

        let derived = prediction(
            json!({"cholesterol": 3, "gluc": 1, "ap_hi": 150, "ap_lo": 80, "smoke": 1, "alco": 0, "active": 0}),
            vec![],
        );
        assert_eq!(
            risk_factors(&derived),
            vec![
                "High cholesterol",
                "High blood pressure",
                "Smoker",
                "Low physical activity"
            ]
        );
    }

    #[test]
    fn test_prediction_view_labels() {
        let view = prediction_view(&prediction(json!({}), vec![]));
        assert_eq!(view.probability_pct, 73);
        assert_eq!(view.risk_level, "High");
        assert_eq!(view.label, "High risk");
        assert_eq!(display_label("elevated"), "elevated");
    }

    #[test]
    fn test_render_html_escapes_text() {
        let report = PatientReport {
            clinic_name: "Heart & Co".to_owned(),
            generated_at: Utc::now(),
            patient: patient_info(&patient(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            latest_prediction: None,
            exercise_plan: Some(DisplayPlan {
                summary: "Keep <moving>".to_owned(),
                items: vec![PlanItem {
                    template_id: 1,
                    name: "Walk".to_owned(),
                    intensity: "low".to_owned(),
                    duration_min: 30,
                    freq_per_week: 5,
                    notes: String::new(),
                }],
            }),
            history: vec![],
        };

        let html = render_html(&report);
        assert!(html.contains("Heart &amp; Co"));
        assert!(html.contains("Ana &lt;Lopez&gt;"));
        assert!(html.contains("Keep &lt;moving&gt;"));
        assert!(html.contains("<td>Walk</td>"));
        assert!(html.contains("No assessment recorded."));
        assert!(!html.contains("{{"));
    }
}
