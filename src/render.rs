// oltctl - CLI dashboard for ZTE OLT monitoring via the snmp-zte query API
// Copyright (C) 2025 oltctl contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Polymorphic rendering of query results.
//!
//! Each query identifier can have a bespoke strategy encoding what the
//! payload is expected to look like; everything else goes through the
//! generic fallback. Rendering is total: no query identifier and no
//! payload shape ever produces an error, only a more generic display.

use serde_json::Value;

use crate::format::{self, PLACEHOLDER, PowerGrade, Tone};

/// One display cell: text plus the classification the printer may use
/// for coloring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub tone: Tone,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Cell {
            text: text.into(),
            tone: Tone::Neutral,
        }
    }

    fn value(value: &Value) -> Self {
        Cell::plain(format::coerce(value))
    }

    fn status(raw: &str) -> Self {
        Cell {
            text: if raw.trim().is_empty() {
                PLACEHOLDER.to_string()
            } else {
                raw.to_string()
            },
            tone: format::status_tone(raw),
        }
    }

    fn power(raw: &str) -> Self {
        let reading = format::power(raw);
        let tone = match reading.grade {
            PowerGrade::Good => Tone::Positive,
            PowerGrade::Warning => Tone::Caution,
            PowerGrade::Bad => Tone::Negative,
            PowerGrade::Invalid => Tone::Neutral,
        };
        Cell {
            text: reading.text,
            tone,
        }
    }
}

/// Backend-agnostic description of what to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<Cell>>,
    },
    Fields(Vec<(String, Cell)>),
    Tags(Vec<String>),
    Gauges(Vec<(String, String)>),
    Empty {
        message: String,
    },
    Scalar(Cell),
}

/// Dispatch entry point. Bespoke strategy when one is registered for the
/// identifier, generic fallback otherwise.
pub fn render(query_id: &str, data: &Value) -> Rendered {
    match query_id {
        "system_info" => system_info(data),
        "onu_list" => onu_list(data),
        "board_info" | "all_boards" => board_list(data),
        "fan_info" => fan_list(data),
        "empty_slots" => empty_slots(data),
        "temperature_info" => gauges(data, "system_temp", "cpu_temp", "°C"),
        "voltage_info" => gauges(data, "system_voltage", "cpu_voltage", "V"),
        _ => generic(data),
    }
}

fn field<'a>(obj: &'a Value, key: &str) -> &'a Value {
    obj.get(key).unwrap_or(&Value::Null)
}

fn text_of(obj: &Value, key: &str) -> String {
    format::coerce(field(obj, key))
}

/// Single object with name/description/uptime/contact/location; uptime is
/// a seconds counter encoded as a numeric string.
fn system_info(data: &Value) -> Rendered {
    if !data.is_object() {
        return generic(data);
    }

    let uptime_text = field(data, "uptime")
        .as_str()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(format::uptime)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    Rendered::Fields(vec![
        ("Name".to_string(), Cell::plain(text_of(data, "name"))),
        (
            "Description".to_string(),
            Cell::plain(text_of(data, "description")),
        ),
        ("Uptime".to_string(), Cell::plain(uptime_text)),
        ("Contact".to_string(), Cell::plain(text_of(data, "contact"))),
        (
            "Location".to_string(),
            Cell::plain(text_of(data, "location")),
        ),
    ])
}

fn onu_list(data: &Value) -> Rendered {
    let Some(rows) = data.as_array() else {
        return generic(data);
    };
    if rows.is_empty() {
        return Rendered::Empty {
            message: "No ONUs found on this PON".to_string(),
        };
    }

    let columns = ["ONU ID", "Name", "Type", "Serial Number", "RX Power", "Status"];
    let table = rows
        .iter()
        .map(|onu| {
            vec![
                Cell::value(field(onu, "onu_id")),
                Cell::plain(text_of(onu, "name")),
                Cell::plain(text_of(onu, "type")),
                Cell::plain(text_of(onu, "serial_number")),
                Cell::power(field(onu, "rx_power").as_str().unwrap_or("")),
                Cell::status(field(onu, "status").as_str().unwrap_or("")),
            ]
        })
        .collect();

    Rendered::Table {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: table,
    }
}

fn board_list(data: &Value) -> Rendered {
    let Some(rows) = data.as_array() else {
        return generic(data);
    };
    if rows.is_empty() {
        return Rendered::Empty {
            message: "No boards reported by this OLT".to_string(),
        };
    }

    let columns = ["Board", "Type", "Real Type", "Status", "Ports", "CPU Load", "Mem Usage", "Soft Ver"];
    let table = rows
        .iter()
        .map(|board| {
            vec![
                Cell::value(field(board, "board_id")),
                Cell::plain(text_of(board, "type")),
                Cell::plain(text_of(board, "real_type")),
                Cell::status(field(board, "status").as_str().unwrap_or("")),
                Cell::value(field(board, "port_count")),
                Cell::value(field(board, "cpu_load")),
                Cell::value(field(board, "mem_usage")),
                Cell::plain(text_of(board, "soft_ver")),
            ]
        })
        .collect();

    Rendered::Table {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: table,
    }
}

fn fan_list(data: &Value) -> Rendered {
    let Some(rows) = data.as_array() else {
        return generic(data);
    };
    if rows.is_empty() {
        return Rendered::Empty {
            message: "No fans reported by this OLT".to_string(),
        };
    }

    let columns = ["Fan", "Speed Level", "Speed", "Status", "Present"];
    let table = rows
        .iter()
        .map(|fan| {
            vec![
                Cell::value(field(fan, "index")),
                Cell::value(field(fan, "speed_level")),
                Cell::plain(text_of(fan, "speed")),
                Cell::status(field(fan, "status").as_str().unwrap_or("")),
                Cell::value(field(fan, "present")),
            ]
        })
        .collect();

    Rendered::Table {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: table,
    }
}

fn empty_slots(data: &Value) -> Rendered {
    let Some(rows) = data.as_array() else {
        return generic(data);
    };
    if rows.is_empty() {
        return Rendered::Empty {
            message: "No free ONU slots on this PON".to_string(),
        };
    }

    let columns = ["Board", "PON", "ONU ID"];
    let table = rows
        .iter()
        .map(|slot| {
            vec![
                Cell::value(field(slot, "board")),
                Cell::value(field(slot, "pon")),
                Cell::value(field(slot, "onu_id")),
            ]
        })
        .collect();

    Rendered::Table {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: table,
    }
}

/// Scalar-pair strategy: an object carrying exactly two numeric readings,
/// shown side by side. Anything else degrades to the generic path.
fn gauges(data: &Value, first: &str, second: &str, unit: &str) -> Rendered {
    let (Some(a), Some(b)) = (
        field(data, first).as_f64(),
        field(data, second).as_f64(),
    ) else {
        return generic(data);
    };

    Rendered::Gauges(vec![
        (format::humanize_key(first), format!("{a} {unit}")),
        (format::humanize_key(second), format!("{b} {unit}")),
    ])
}

/// Ordered fallback over shape categories. The precedence is load-bearing:
/// empty array, object array, scalar array, object, then primitive. This
/// is the contract for every query without a bespoke strategy, present or
/// future.
pub fn generic(data: &Value) -> Rendered {
    match data {
        Value::Array(items) if items.is_empty() => Rendered::Empty {
            message: "No results found".to_string(),
        },
        Value::Array(items) if items[0].is_object() => {
            let columns: Vec<String> = items[0]
                .as_object()
                .map(|o| o.keys().cloned().collect())
                .unwrap_or_default();
            let rows = items
                .iter()
                .map(|item| {
                    columns
                        .iter()
                        .map(|key| match item.get(key) {
                            Some(value) => Cell::value(value),
                            None => Cell::plain(PLACEHOLDER),
                        })
                        .collect()
                })
                .collect();
            Rendered::Table {
                columns: columns.iter().map(|k| format::humanize_key(k)).collect(),
                rows,
            }
        }
        Value::Array(items) => Rendered::Tags(items.iter().map(format::coerce).collect()),
        Value::Object(map) => Rendered::Fields(
            map.iter()
                .map(|(key, value)| (format::humanize_key(key), Cell::value(value)))
                .collect(),
        ),
        primitive => Rendered::Scalar(Cell::value(primitive)),
    }
}
