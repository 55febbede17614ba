//! CSV export of the lead inbox.

use std::sync::Arc;

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

use crate::application::repos::{LeadsRepo, RepoError};
use crate::domain::entities::LeadRecord;

pub const CSV_HEADER: [&str; 14] = [
    "Date",
    "Type",
    "Name",
    "Email",
    "Mobile",
    "Business",
    "Website/Facebook",
    "Industry",
    "Package",
    "Budget",
    "Preferred Contact",
    "Preferred Contact Details",
    "Status",
    "Message",
];

const ISO_MILLIS: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");
const DAY: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

#[derive(Clone)]
pub struct LeadExportService {
    leads: Arc<dyn LeadsRepo>,
}

impl LeadExportService {
    pub fn new(leads: Arc<dyn LeadsRepo>) -> Self {
        Self { leads }
    }

    pub async fn export(&self, today: OffsetDateTime) -> Result<CsvExport, RepoError> {
        let leads = self.leads.list_all_leads().await?;
        Ok(CsvExport {
            filename: export_filename(today),
            body: leads_to_csv(&leads),
        })
    }
}

/// Quote a value, doubling inner quotes. Absent values become an empty unquoted cell.
pub fn csv_cell(value: Option<&str>) -> String {
    match value {
        Some(value) => format!("\"{}\"", value.replace('"', "\"\"")),
        None => String::new(),
    }
}

pub fn export_filename(today: OffsetDateTime) -> String {
    let day = today
        .to_offset(UtcOffset::UTC)
        .format(DAY)
        .unwrap_or_else(|_| "export".to_string());
    format!("jdigital-leads-{day}.csv")
}

pub fn leads_to_csv(leads: &[LeadRecord]) -> String {
    let mut lines = Vec::with_capacity(leads.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for lead in leads {
        let created = lead
            .created_at
            .to_offset(UtcOffset::UTC)
            .format(ISO_MILLIS)
            .ok();
        let cells = [
            csv_cell(created.as_deref()),
            csv_cell(Some(lead.lead_type.as_str())),
            csv_cell(Some(&lead.full_name)),
            csv_cell(Some(&lead.email)),
            csv_cell(Some(&lead.mobile_number)),
            csv_cell(Some(&lead.business_name)),
            csv_cell(lead.website_or_facebook_link.as_deref()),
            csv_cell(Some(&lead.industry)),
            csv_cell(Some(&lead.package_interest)),
            csv_cell(Some(&lead.budget_range)),
            csv_cell(Some(&lead.preferred_contact_method)),
            csv_cell(lead.preferred_contact_value.as_deref()),
            csv_cell(Some(lead.status.as_str())),
            csv_cell(Some(&lead.message_goals)),
        ];
        lines.push(cells.join(","));
    }
    lines.join("\n")
}
