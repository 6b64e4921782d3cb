//! Renders the combined MOT + VES report sent back to the user.
//!
//! The output uses Telegram's legacy Markdown: bold labels and inline-code
//! values. Rendering is total; malformed input degrades to raw text.

use std::fmt;

use chrono::NaiveDate;

use crate::models::{Defect, MotTest, MotVehicle, VesVehicle};

/// Date format used by both upstream APIs (a time part may follow)
const SOURCE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format shown to users
const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Shown for fields the upstream left empty
const MISSING_VALUE: &str = "N/A";

/// Inline-code delimiter in Telegram's legacy Markdown
const CODE_DELIMITER: char = '`';

/// Rendered report for one registration lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedReport(String);

impl CombinedReport {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CombinedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visual marker for a test result or defect category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Pass,
    Fail,
    Dangerous,
    Advisory,
    UserEntered,
    Info,
}

impl Indicator {
    pub fn emoji(self) -> &'static str {
        match self {
            Indicator::Pass => "✅",
            Indicator::Fail => "❌",
            Indicator::Dangerous => "🚨",
            Indicator::Advisory => "⚠️",
            Indicator::UserEntered => "📝",
            Indicator::Info => "ℹ️",
        }
    }

    /// Any result other than FAILED counts as a pass
    pub fn for_test_result(result: &str) -> Self {
        if result.trim().eq_ignore_ascii_case("FAILED") {
            Indicator::Fail
        } else {
            Indicator::Pass
        }
    }

    pub fn for_defect(defect: &Defect) -> Self {
        if defect.dangerous {
            return Indicator::Dangerous;
        }

        match defect.defect_type.trim().to_ascii_uppercase().as_str() {
            "FAIL" | "MAJOR" | "PRS" => Indicator::Fail,
            "DANGEROUS" => Indicator::Dangerous,
            "ADVISORY" | "MINOR" => Indicator::Advisory,
            "USER ENTERED" => Indicator::UserEntered,
            _ => Indicator::Info,
        }
    }
}

/// Reformats a `YYYY-MM-DD[...]` date as `DD.MM.YYYY`.
/// Anything that does not parse is returned unchanged.
pub fn format_date(raw: &str) -> String {
    raw.get(..10)
        .and_then(|date| NaiveDate::parse_from_str(date, SOURCE_DATE_FORMAT).ok())
        .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Combines both upstream records into one report
pub fn render_report(mot: &MotVehicle, ves: &VesVehicle) -> CombinedReport {
    let mut out = String::new();

    // Identity and basic attributes
    heading(&mut out, "🚗", "Vehicle Information");
    let registration = if mot.registration.is_empty() {
        &ves.registration_number
    } else {
        &mot.registration
    };
    field(&mut out, "📝", "Registration", registration);
    field(&mut out, "🏭", "Make", &mot.make);
    field(&mut out, "🚘", "Model", &mot.model);
    field(&mut out, "📅", "First Registered", &format_date(&mot.first_used_date));
    field(&mut out, "⛽", "Fuel Type", &mot.fuel_type);
    field(&mut out, "🎨", "Colour", &mot.primary_colour);
    field(&mut out, "🔩", "Engine Size", &mot.engine_size);
    field(&mut out, "🛞", "Wheelplan", &ves.wheelplan);
    field(&mut out, "🌍", "Euro Status", &ves.euro_status);
    field(
        &mut out,
        "📄",
        "Last V5C Issued",
        &format_date(ves.date_of_last_v5c_issued.as_deref().unwrap_or_default()),
    );

    // Tax
    out.push('\n');
    heading(&mut out, "💰", "Tax Information");
    field(&mut out, "📊", "Status", &ves.tax_status);
    if let Some(due) = ves.tax_due_date.as_deref().filter(|d| !d.is_empty()) {
        field(&mut out, "📅", "Due Date", &format_date(due));
    }

    // Test history, in the order the API returned it
    if !mot.mot_tests.is_empty() {
        out.push('\n');
        heading(&mut out, "🔧", "MOT History");
        for test in &mot.mot_tests {
            render_test(&mut out, test);
        }
    }

    CombinedReport(out)
}

fn render_test(out: &mut String, test: &MotTest) {
    field(out, "📅", "Test Date", &format_date(&test.completed_date));
    field(
        out,
        Indicator::for_test_result(&test.test_result).emoji(),
        "Result",
        &test.test_result,
    );

    if !test.odometer_value.is_empty() {
        let mileage = format!("{} {}", test.odometer_value, test.odometer_unit);
        field(out, "📏", "Mileage", mileage.trim_end());
    }
    if !test.expiry_date.is_empty() {
        field(out, "⏳", "Expiry Date", &format_date(&test.expiry_date));
    }

    if !test.defects.is_empty() {
        out.push_str("⚠️ *Defects:*\n");
        for defect in &test.defects {
            out.push_str(&format!(
                "  {} {}\n",
                Indicator::for_defect(defect).emoji(),
                code_span(&defect.text)
            ));
        }
    }

    out.push('\n');
}

fn heading(out: &mut String, emoji: &str, title: &str) {
    out.push_str(&format!("{} *{}*\n\n", emoji, title));
}

fn field(out: &mut String, emoji: &str, label: &str, value: &str) {
    let value = if value.trim().is_empty() {
        MISSING_VALUE
    } else {
        value
    };
    out.push_str(&format!("{} *{}:* {}\n", emoji, label, code_span(value)));
}

/// Wraps a value in an inline-code span. A backtick inside the value would
/// close the span early and make the Markdown unparseable, so it becomes `'`.
fn code_span(value: &str) -> String {
    format!("`{}`", value.replace(CODE_DELIMITER, "'"))
}
