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

use crate::catalog;
use serde::Serialize;
use thiserror::Error;

/// OLT chassis models the backend knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceModel {
    C300,
    C320,
    C600,
}

impl DeviceModel {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceModel::C300 => "C300",
            DeviceModel::C320 => "C320",
            DeviceModel::C600 => "C600",
        }
    }

    pub fn parse(value: &str) -> Option<DeviceModel> {
        match value.to_ascii_uppercase().as_str() {
            "C300" => Some(DeviceModel::C300),
            "C320" => Some(DeviceModel::C320),
            "C600" => Some(DeviceModel::C600),
            _ => None,
        }
    }
}

/// Everything needed to address one OLT through the API for the duration
/// of a session. Held in memory only; credentials leave the process solely
/// as the Basic-auth header of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionContext {
    pub host: String,
    pub port: u16,
    pub community: String,
    pub model: DeviceModel,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("OLT host is required")]
    MissingHost,
    #[error("OLT port must be non-zero")]
    InvalidPort,
    #[error(
        "API credentials are required; pass --username/--password or set OLTCTL_USERNAME/OLTCTL_PASSWORD"
    )]
    MissingCredentials,
}

impl ConnectionContext {
    /// Form-level validation. Runs before any request is built; the
    /// builder itself does not re-check these.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::MissingHost);
        }
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(())
    }
}

/// Caller-supplied query parameters. All optional; defaults are applied
/// by the builder.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pub board: Option<u32>,
    pub pon: Option<u32>,
    pub onu_id: Option<u32>,
    pub name: Option<String>,
}

/// Wire-format body of `POST /api/v1/query`. Field names follow the
/// backend contract (`ip`, not `host`; `onu_id` absent when unset).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub ip: String,
    pub port: u16,
    pub community: String,
    pub model: DeviceModel,
    pub query: String,
    pub board: u32,
    pub pon: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onu_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Composes the request envelope for one query execution.
///
/// `board` and `pon` always default to 1. `onu_id` is carried when the
/// catalog says the query needs one or the caller supplied one anyway;
/// `name` only when non-empty and the query asks for it. Unknown query
/// identifiers get no optional fields.
pub fn build(ctx: &ConnectionContext, id: &str, params: &QueryParams) -> QueryRequest {
    let descriptor = catalog::lookup(id);
    let requires_onu_id = descriptor.map(|d| d.requires_onu_id).unwrap_or(false);
    let requires_name = descriptor.map(|d| d.requires_name).unwrap_or(false);

    let onu_id = if requires_onu_id {
        Some(params.onu_id.unwrap_or(1))
    } else {
        params.onu_id
    };

    let name = if requires_name {
        params.name.as_deref().filter(|n| !n.is_empty()).map(str::to_string)
    } else {
        None
    };

    QueryRequest {
        ip: ctx.host.clone(),
        port: ctx.port,
        community: ctx.community.clone(),
        model: ctx.model,
        query: id.to_string(),
        board: params.board.unwrap_or(1),
        pon: params.pon.unwrap_or(1),
        onu_id,
        name,
    }
}
