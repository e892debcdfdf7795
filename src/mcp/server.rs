//! Fitness Profile MCP Server Implementation
//!
//! Implements the MCP server with the profile tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::estimation::{ActivityLevel, Gender};
use crate::measurement::{HeightUnit, RawNumber, WeightUnit};
use crate::pipeline::{ProfileInput, ProfileUpdate};
use crate::tools::profiles::{self, ProfileError};
use crate::tools::status::StatusTracker;

/// Fitness Profile MCP Service
#[derive(Clone)]
pub struct FitProfileService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<FitProfileService>,
}

impl FitProfileService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Parameter Structs
// ============================================================================

/// A number, or text such as "150 lb"
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl From<NumberOrText> for RawNumber {
    fn from(value: NumberOrText) -> Self {
        match value {
            NumberOrText::Number(n) => RawNumber::Number(n),
            NumberOrText::Text(s) => RawNumber::Text(s),
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetProfileParams {
    /// Owning user ID (one profile per user)
    pub user_id: i64,
    /// Gender: M, F or O
    pub gender: String,
    /// Age in years
    pub age: i64,
    /// sedentary, lightly_active, moderately_active, very_active, extra_active
    pub activity_level: String,
    /// Weight as a number or text like "150 lb"
    pub weight: NumberOrText,
    /// kg (default) or lb
    pub weight_unit: Option<String>,
    /// Height for cm or in units
    pub height: Option<NumberOrText>,
    /// cm (default), in, or ft (use height_feet + height_inches)
    pub height_unit: Option<String>,
    pub height_feet: Option<f64>,
    pub height_inches: Option<f64>,
    /// Body fat percentage 0-100 (omit if giving waist/hip)
    pub body_fat: Option<f64>,
    /// Waist circumference (omit if giving body_fat)
    pub waist_measurement: Option<f64>,
    /// Hip circumference (omit if giving body_fat)
    pub hip_measurement: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProfileParams {
    pub user_id: i64,
    pub gender: Option<String>,
    pub age: Option<i64>,
    pub activity_level: Option<String>,
    pub weight: Option<NumberOrText>,
    /// Only together with weight; defaults to kg
    pub weight_unit: Option<String>,
    pub height: Option<NumberOrText>,
    pub height_unit: Option<String>,
    pub height_feet: Option<f64>,
    pub height_inches: Option<f64>,
    /// Replaces the body fat source
    pub body_fat: Option<f64>,
    pub waist_measurement: Option<f64>,
    pub hip_measurement: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserIdParams {
    pub user_id: i64,
}

fn parse_gender(s: &str) -> Result<Gender, McpError> {
    Gender::from_str(s).ok_or_else(|| {
        McpError::invalid_params(format!("Unknown gender '{}' (expected M, F or O)", s), None)
    })
}

fn parse_activity_level(s: &str) -> Result<ActivityLevel, McpError> {
    ActivityLevel::from_str(s).ok_or_else(|| {
        McpError::invalid_params(
            format!(
                "Unknown activity_level '{}' (expected sedentary, lightly_active, moderately_active, very_active or extra_active)",
                s
            ),
            None,
        )
    })
}

fn parse_weight_unit(s: &str) -> Result<WeightUnit, McpError> {
    WeightUnit::from_str(s).ok_or_else(|| {
        McpError::invalid_params(format!("Unknown weight_unit '{}' (expected kg or lb)", s), None)
    })
}

fn parse_height_unit(s: &str) -> Result<HeightUnit, McpError> {
    HeightUnit::from_str(s).ok_or_else(|| {
        McpError::invalid_params(format!("Unknown height_unit '{}' (expected cm, in or ft)", s), None)
    })
}

impl SetProfileParams {
    fn into_input(self) -> Result<(i64, ProfileInput), McpError> {
        let input = ProfileInput {
            gender: parse_gender(&self.gender)?,
            age: self.age,
            activity_level: parse_activity_level(&self.activity_level)?,
            weight: self.weight.into(),
            weight_unit: self.weight_unit.as_deref().map(parse_weight_unit).transpose()?.unwrap_or_default(),
            height: self.height.map(RawNumber::from),
            height_unit: self.height_unit.as_deref().map(parse_height_unit).transpose()?.unwrap_or_default(),
            height_feet: self.height_feet,
            height_inches: self.height_inches,
            body_fat: self.body_fat,
            waist_measurement: self.waist_measurement,
            hip_measurement: self.hip_measurement,
        };
        Ok((self.user_id, input))
    }
}

impl UpdateProfileParams {
    fn into_update(self) -> Result<(i64, ProfileUpdate), McpError> {
        let update = ProfileUpdate {
            gender: self.gender.as_deref().map(parse_gender).transpose()?,
            age: self.age,
            activity_level: self.activity_level.as_deref().map(parse_activity_level).transpose()?,
            weight: self.weight.map(RawNumber::from),
            weight_unit: self.weight_unit.as_deref().map(parse_weight_unit).transpose()?,
            height: self.height.map(RawNumber::from),
            height_unit: self.height_unit.as_deref().map(parse_height_unit).transpose()?,
            height_feet: self.height_feet,
            height_inches: self.height_inches,
            body_fat: self.body_fat,
            waist_measurement: self.waist_measurement,
            hip_measurement: self.hip_measurement,
        };
        Ok((self.user_id, update))
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Validation and missing-profile errors are the caller's to fix
fn profile_error(err: ProfileError) -> McpError {
    if err.is_client_error() {
        McpError::invalid_params(err.to_string(), None)
    } else {
        McpError::internal_error(err.to_string(), None)
    }
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl FitProfileService {
    #[tool(description = "Get the current status of the fitness profile service including build info and database status")]
    async fn fitprofile_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        json_result(&status)
    }

    #[tool(description = "Get instructions for entering profile measurements. Call this before creating or updating a profile.")]
    fn profile_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::PROFILE_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(PROFILE_INSTRUCTIONS)]))
    }

    #[tool(description = "Create or replace a user's fitness profile. Converts weight/height to kg/cm and computes body fat, BMR and TDEE.")]
    fn set_profile(&self, Parameters(p): Parameters<SetProfileParams>) -> Result<CallToolResult, McpError> {
        let (user_id, input) = p.into_input()?;
        let result = profiles::set_profile(&self.database, user_id, &input).map_err(profile_error)?;
        json_result(&result)
    }

    #[tool(description = "Update some fields of an existing profile. BMR and TDEE are always recomputed.")]
    fn update_profile(&self, Parameters(p): Parameters<UpdateProfileParams>) -> Result<CallToolResult, McpError> {
        let (user_id, update) = p.into_update()?;
        let result = profiles::update_profile(&self.database, user_id, update).map_err(profile_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a user's profile with canonical measurements, body fat, BMR and TDEE")]
    fn get_profile(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = profiles::get_profile(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(profile) => json_result(&profile),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Profile not found", "user_id": {}}}"#,
                p.user_id
            ))])),
        }
    }

    #[tool(description = "Compute canonical measurements, body fat, BMR and TDEE for a profile without saving it")]
    fn preview_profile(&self, Parameters(p): Parameters<SetProfileParams>) -> Result<CallToolResult, McpError> {
        let (_, input) = p.into_input()?;
        let result = profiles::preview_profile(&input).map_err(profile_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete a user's profile")]
    fn delete_profile(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = profiles::delete_profile(&self.database, p.user_id).map_err(profile_error)?;
        json_result(&result)
    }

    #[tool(description = "Recompute body fat, BMR and TDEE for every stored profile")]
    fn recalculate_profiles(&self) -> Result<CallToolResult, McpError> {
        let result = profiles::recalculate_all(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for FitProfileService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "fitprofile".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Fitness Profile Manager".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Fitness Profile Manager - per-user fitness profiles with BMR/TDEE estimates. \
                 IMPORTANT: Call profile_instructions before entering measurements. \
                 Profiles: set_profile/update_profile/get_profile/delete_profile, preview_profile. \
                 Maintenance: recalculate_profiles, fitprofile_status."
                    .into(),
            ),
        }
    }
}
