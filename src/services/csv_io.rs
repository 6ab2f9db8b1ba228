//! CSV bulk import parsing and export writers

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim, Writer};

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Equipment, EquipmentStatus},
        issue::IssueRecord,
        maintenance::MaintenanceRecord,
    },
};

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_LAB: &str = "Main Lab";

const REQUIRED_COLUMNS: [&str; 3] = ["name", "code", "total_qty"];

/// Header lookup with case-insensitive, trimmed column names
struct Columns(HashMap<String, usize>);

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().to_lowercase(), i))
                .collect(),
        )
    }

    fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Trimmed, non-empty cell value
    fn get<'r>(&self, record: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.0
            .get(name)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Parse an equipment upload. Either every row is valid, or the full list of
/// `Line N: ...` messages is returned (line 1 is the header).
pub fn parse_equipment_csv(data: &[u8]) -> Result<Vec<CreateEquipment>, Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| vec![format!("Invalid CSV header: {}", e)])?
        .clone();
    let columns = Columns::new(&headers);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.has(c))
        .map(|c| format!("Missing required column: {}", c))
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                errors.push(format!("Line {}: unreadable row ({})", line, e));
                continue;
            }
        };
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        match parse_row(&columns, &record) {
            Ok(row) => rows.push(row),
            Err(message) => errors.push(format!("Line {}: {}", line, message)),
        }
    }

    if errors.is_empty() {
        Ok(rows)
    } else {
        Err(errors)
    }
}

fn parse_row(columns: &Columns, record: &StringRecord) -> Result<CreateEquipment, String> {
    let name = columns
        .get(record, "name")
        .ok_or_else(|| "name is required".to_string())?;
    let code = columns
        .get(record, "code")
        .ok_or_else(|| "code is required".to_string())?;

    let total_qty = parse_quantity(columns.get(record, "total_qty"), "total_qty")?
        .ok_or_else(|| "total_qty is required".to_string())?;
    let available_qty = parse_quantity(columns.get(record, "available_qty"), "available_qty")?;
    if let Some(available) = available_qty {
        if available > total_qty {
            return Err("available_qty must not exceed total_qty".to_string());
        }
    }

    let status = match columns.get(record, "status") {
        Some(raw) => raw.parse::<EquipmentStatus>()?,
        None => EquipmentStatus::default(),
    };

    Ok(CreateEquipment {
        name: name.to_string(),
        code: code.to_string(),
        category: Some(columns.get(record, "category").unwrap_or(DEFAULT_CATEGORY).to_string()),
        lab: Some(columns.get(record, "lab").unwrap_or(DEFAULT_LAB).to_string()),
        total_qty,
        available_qty,
        status,
    })
}

fn parse_quantity(raw: Option<&str>, column: &str) -> Result<Option<i64>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value: i64 = raw
        .parse()
        .map_err(|_| format!("{} must be a whole number, got '{}'", column, raw))?;
    if value < 0 {
        return Err(format!("{} must not be negative", column));
    }
    Ok(Some(value))
}

fn finish(writer: Writer<Vec<u8>>) -> AppResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV: {}", e)))
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("Failed to write CSV: {}", e))
}

fn date_cell(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

pub fn write_equipment(items: &[Equipment]) -> AppResult<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(["ID", "Name", "Code", "Category", "Lab", "Total", "Available", "Status"])
        .map_err(csv_error)?;
    for item in items {
        writer
            .write_record([
                item.id.to_string(),
                item.name.clone(),
                item.code.clone(),
                item.category.clone().unwrap_or_default(),
                item.lab.clone().unwrap_or_default(),
                item.total_qty.to_string(),
                item.available_qty.to_string(),
                item.status.to_string(),
            ])
            .map_err(csv_error)?;
    }
    finish(writer)
}

pub fn write_issues(records: &[IssueRecord]) -> AppResult<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record([
            "ID",
            "Equipment ID",
            "Issued To",
            "Lab",
            "Quantity",
            "Issue Date",
            "Return Date",
            "Status",
        ])
        .map_err(csv_error)?;
    for record in records {
        writer
            .write_record([
                record.id.to_string(),
                record.equipment_id.to_string(),
                record.issued_to.clone(),
                record.issued_lab.clone(),
                record.quantity.to_string(),
                record.issue_date.to_string(),
                date_cell(record.return_date),
                record.status.as_str().to_string(),
            ])
            .map_err(csv_error)?;
    }
    finish(writer)
}

pub fn write_maintenance(records: &[MaintenanceRecord]) -> AppResult<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record([
            "ID",
            "Equipment ID",
            "Fault Description",
            "Fault Date",
            "Sent For Repair",
            "Returned From Repair",
            "Status",
            "Cost",
            "Remarks",
        ])
        .map_err(csv_error)?;
    for record in records {
        writer
            .write_record([
                record.id.to_string(),
                record.equipment_id.to_string(),
                record.fault_description.clone(),
                record.fault_date.to_string(),
                date_cell(record.sent_for_repair_date),
                date_cell(record.return_from_repair_date),
                record.status.as_str().to_string(),
                format!("{:.2}", record.cost),
                record.remarks.clone().unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }
    finish(writer)
}
